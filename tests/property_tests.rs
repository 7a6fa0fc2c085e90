//! Property-based tests for the fact ledger core
//!
//! These verify the hashing, mining, and chain invariants hold under
//! random inputs.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

use factchain::config::LedgerConfig;
use factchain::crypto::{hash_bytes, Hash};
use factchain::ledger::{Block, Fact};
use factchain::mining::{Miner, MiningResult};
use factchain::storage::ChainStore;

fn fact_with(content: String) -> Fact {
    Fact {
        content,
        domain: "general".to_string(),
        creator: "@prop".to_string(),
        stake: 0.0,
        metadata: BTreeMap::new(),
        signature: vec![0u8; 64],
        public_key: vec![0u8; 32],
    }
}

proptest! {
    /// Hex encoding round-trips for arbitrary 32-byte hashes
    #[test]
    fn prop_hash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::from_bytes(bytes);
        let recovered = Hash::from_hex(&hash.to_hex()).unwrap();
        prop_assert_eq!(hash, recovered);
    }

    /// The difficulty predicate agrees with the hex digest prefix
    #[test]
    fn prop_difficulty_matches_hex_prefix(
        bytes in prop::array::uniform32(any::<u8>()),
        difficulty in 0usize..8
    ) {
        let hash = Hash::from_bytes(bytes);
        let expected = hash.to_hex().starts_with(&"0".repeat(difficulty));
        prop_assert_eq!(hash.meets_difficulty(difficulty), expected);
    }

    /// Canonical block hashing is deterministic
    #[test]
    fn prop_block_hash_deterministic(
        index in 0u64..1_000_000,
        timestamp in 0u64..u32::MAX as u64,
        nonce in 0u64..u64::MAX,
        content in "[a-zA-Z0-9 ]{10,64}"
    ) {
        let mut a = Block::candidate(index, timestamp, fact_with(content.clone()),
            Hash::zero(), "@prop".to_string());
        a.nonce = nonce;
        let mut b = Block::candidate(index, timestamp, fact_with(content),
            Hash::zero(), "@prop".to_string());
        b.nonce = nonce;
        prop_assert_eq!(a.compute_hash(), b.compute_hash());
    }

    /// Adjacent nonces never collide
    #[test]
    fn prop_different_nonce_different_hash(
        nonce in 0u64..u64::MAX / 2,
        content in "[a-z ]{10,40}"
    ) {
        let mut a = Block::candidate(1, 1000, fact_with(content.clone()),
            Hash::zero(), "@prop".to_string());
        a.nonce = nonce;
        let mut b = a.clone();
        b.nonce = nonce.wrapping_add(1);
        prop_assert_ne!(a.compute_hash(), b.compute_hash());
    }

    /// Content hashing depends on content alone
    #[test]
    fn prop_content_hash_tracks_content(content in "[a-z ]{10,40}") {
        let a = fact_with(content.clone());
        let mut b = fact_with(content);
        b.creator = "@other".to_string();
        b.stake = 42.0;
        prop_assert_eq!(a.content_hash(), b.content_hash());
        prop_assert_eq!(a.content_hash(), hash_bytes(a.content.as_bytes()));
    }

    /// Mining always produces a sealed block satisfying the predicate
    #[test]
    fn prop_mined_block_satisfies_difficulty(content in "[a-z ]{10,40}") {
        let candidate = Block::candidate(1, 1000, fact_with(content),
            Hash::zero(), "@prop".to_string());
        match Miner::new().mine_block(candidate, 1) {
            MiningResult::Success(block) => {
                prop_assert!(block.hash.meets_difficulty(1));
                prop_assert_eq!(block.hash, block.compute_hash());
            }
            MiningResult::Interrupted => prop_assert!(false, "unexpected interruption"),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Chains built through mine-and-append always audit clean: linkage,
    /// recomputed hashes, and the PoW predicate hold for every block.
    #[test]
    fn prop_appended_chain_is_valid(contents in prop::collection::vec("[a-z ]{10,40}", 1..4)) {
        let config = Arc::new(LedgerConfig { difficulty: 1, ..LedgerConfig::default() });
        let chain = ChainStore::new(config, None);
        chain.ensure_genesis().unwrap();

        for (i, content) in contents.into_iter().enumerate() {
            // Salt the content so random duplicates cannot occur
            let fact = fact_with(format!("{content} #{i}"));
            let prev = chain.latest().unwrap().hash;
            let candidate = Block::candidate(chain.len(), 1000 + i as u64, fact, prev,
                "@prop".to_string());
            match Miner::new().mine_block(candidate, 1) {
                MiningResult::Success(block) => chain.append(block).unwrap(),
                MiningResult::Interrupted => prop_assert!(false, "unexpected interruption"),
            }
        }

        prop_assert!(chain.is_valid());

        // Explicit linkage re-check, independent of is_valid
        for i in 1..chain.len() {
            let prev = chain.get(i - 1).unwrap();
            let cur = chain.get(i).unwrap();
            prop_assert_eq!(cur.previous_hash, prev.hash);
            prop_assert_eq!(cur.index, i);
        }
    }
}
