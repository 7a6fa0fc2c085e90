//! Chain storage: in-memory chain state and Sled persistence

mod chain;
mod db;

pub use chain::{AppendError, ChainStore};
pub use db::{LedgerDb, StoreError};
