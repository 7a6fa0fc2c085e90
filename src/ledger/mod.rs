//! Ledger data model: facts, sealed blocks, and the genesis block

mod block;
mod fact;
mod genesis;

pub use block::Block;
pub use fact::Fact;
pub use genesis::{create_genesis_block, genesis_fact, GENESIS_CREATOR, GENESIS_TIMESTAMP};
