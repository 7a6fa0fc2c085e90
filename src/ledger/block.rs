//! Block structure for the fact ledger
//!
//! A block seals exactly one fact. Blocks are frozen at mining time: every
//! field except `hash` feeds the canonical hash input, and nothing mutates
//! a block after it is appended. Attachments live in their own ledger keyed
//! by block index and are joined in at read time.

use serde::{Deserialize, Serialize};

use crate::crypto::{hash_bytes, Hash};
use crate::ledger::Fact;

/// A sealed ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// 0-based position in the chain, gap-free
    pub index: u64,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    /// The fact this block seals
    pub fact: Fact,
    /// Hash of the previous block; all-zero sentinel at index 0
    pub previous_hash: Hash,
    /// Identifier of whoever produced the proof-of-work
    pub miner: String,
    /// Proof-of-work search variable
    pub nonce: u64,
    /// Canonical hash over all other fields
    pub hash: Hash,
}

/// Canonical hashing input: every block field except `hash`, serialized as
/// deterministic JSON (fixed field order, metadata keys sorted by BTreeMap).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalBlock<'a> {
    index: u64,
    timestamp: u64,
    fact: &'a Fact,
    previous_hash: &'a Hash,
    miner: &'a str,
    nonce: u64,
}

impl Block {
    /// Create an unsealed candidate with nonce 0 and a zero hash
    pub fn candidate(
        index: u64,
        timestamp: u64,
        fact: Fact,
        previous_hash: Hash,
        miner: String,
    ) -> Self {
        Self {
            index,
            timestamp,
            fact,
            previous_hash,
            miner,
            nonce: 0,
            hash: Hash::zero(),
        }
    }

    /// Recompute the canonical hash of this block
    pub fn compute_hash(&self) -> Hash {
        let canonical = CanonicalBlock {
            index: self.index,
            timestamp: self.timestamp,
            fact: &self.fact,
            previous_hash: &self.previous_hash,
            miner: &self.miner,
            nonce: self.nonce,
        };
        // Serialization of these fields cannot fail; fall back to hashing
        // nothing is unreachable in practice.
        let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
        hash_bytes(&bytes)
    }

    /// Check if this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == Hash::zero()
    }

    /// Check the proof-of-work predicate against the stored hash
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        self.hash.meets_difficulty(difficulty)
    }
}
