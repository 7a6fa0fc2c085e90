//! Fact ledger core library
//!
//! An append-only chain of cryptographically signed fact blocks, sequenced
//! by proof-of-work, exposed through a rate-limited HTTP API, with optional
//! multimedia attachments bound to sealed blocks.

pub mod api;
pub mod attachments;
pub mod config;
pub mod crypto;
pub mod ledger;
pub mod mining;
pub mod storage;
pub mod validation;
