//! Genesis block generation
//!
//! Seeds an empty chain with a fixed, well-known fact. The genesis fact
//! carries an all-zero signature and public key; it is the one entry that
//! never passes signature verification and is appended before the API
//! accepts external submissions.

use std::collections::BTreeMap;

use crate::crypto::Hash;
use crate::ledger::{Block, Fact};
use crate::mining::{Miner, MiningResult};

/// Fixed genesis timestamp (Unix seconds)
pub const GENESIS_TIMESTAMP: u64 = 1_750_000_000;

/// Genesis creator identifier
pub const GENESIS_CREATOR: &str = "@network";

/// The fixed genesis fact
pub fn genesis_fact() -> Fact {
    let mut metadata = BTreeMap::new();
    metadata.insert("type".to_string(), serde_json::json!("genesis"));

    Fact {
        content: "Fact ledger genesis - mainnet initialized".to_string(),
        domain: "general".to_string(),
        creator: GENESIS_CREATOR.to_string(),
        stake: 0.0,
        metadata,
        signature: vec![0u8; 64],
        public_key: vec![0u8; 32],
    }
}

/// Create and mine the genesis block at the given difficulty.
///
/// Deterministic: the candidate is fixed and the nonce search starts at 0,
/// so the same difficulty always produces the same sealed block.
pub fn create_genesis_block(difficulty: usize) -> Block {
    let candidate = Block::candidate(
        0,
        GENESIS_TIMESTAMP,
        genesis_fact(),
        Hash::zero(),
        GENESIS_CREATOR.to_string(),
    );

    match Miner::new().mine_block(candidate, difficulty) {
        MiningResult::Success(block) => block,
        // A fresh miner's stop signal is never set
        MiningResult::Interrupted => unreachable!("genesis mining has no stop signal"),
    }
}
