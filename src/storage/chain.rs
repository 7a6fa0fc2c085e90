//! Chain store
//!
//! The ordered, hash-linked sequence of sealed blocks. Owns the in-memory
//! list, the content-hash deduplication index, and best-effort persistence.
//! Reads take a shared lock; only `append` takes the write lock, and only
//! for the duration of the append itself.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::LedgerConfig;
use crate::crypto::Hash;
use crate::ledger::{create_genesis_block, Block};
use crate::storage::LedgerDb;

/// Append failures
#[derive(Debug, Error, PartialEq)]
pub enum AppendError {
    /// The block was mined against a tail that is no longer current
    #[error("block was mined against a stale chain tail")]
    StaleAppend,
    /// The block fails its own integrity checks
    #[error("block failed integrity checks: {0}")]
    InvalidBlock(&'static str),
}

struct ChainInner {
    blocks: Vec<Block>,
    content_index: HashSet<Hash>,
}

/// The chain of fact blocks
pub struct ChainStore {
    inner: RwLock<ChainInner>,
    db: Option<LedgerDb>,
    config: Arc<LedgerConfig>,
}

impl ChainStore {
    /// Create a store over an optional backing database.
    ///
    /// `None` runs memory-only: the node stays available but loses history
    /// on restart.
    pub fn new(config: Arc<LedgerConfig>, db: Option<LedgerDb>) -> Self {
        if db.is_none() {
            warn!("no backing store; chain runs memory-only and will not survive restart");
        }
        Self {
            inner: RwLock::new(ChainInner {
                blocks: Vec::new(),
                content_index: HashSet::new(),
            }),
            db,
            config,
        }
    }

    /// Replay persisted blocks into memory, verifying linkage as it goes.
    ///
    /// A broken chain is reported but does not prevent startup; the node
    /// continues in corrupted-but-readable mode.
    pub fn load(&self) {
        let Some(db) = &self.db else { return };

        let blocks = match db.load_blocks() {
            Ok(blocks) => blocks,
            Err(e) => {
                error!(error = %e, "failed to load chain from backing store");
                return;
            }
        };

        let mut inner = self.inner.write().unwrap();
        let mut prev_hash = Hash::zero();
        for (i, block) in blocks.iter().enumerate() {
            if block.index != i as u64 {
                error!(index = block.index, expected = i, "gap in persisted chain");
            }
            if block.previous_hash != prev_hash {
                error!(index = block.index, "hash linkage broken in persisted chain");
            }
            if block.hash != block.compute_hash() {
                error!(index = block.index, "stored hash does not match recomputation");
            }
            prev_hash = block.hash;
            inner.content_index.insert(block.fact.content_hash());
        }
        inner.blocks = blocks;
        info!(blocks = inner.blocks.len(), "chain loaded from backing store");
    }

    /// Mine and append the genesis block if the chain is empty
    pub fn ensure_genesis(&self) -> Result<(), AppendError> {
        if self.len() > 0 {
            return Ok(());
        }
        let genesis = create_genesis_block(self.config.difficulty);
        info!(hash = %genesis.hash, nonce = genesis.nonce, "genesis block mined");
        self.append(genesis)
    }

    /// Append a sealed block.
    ///
    /// Precondition checks run under the write lock: the block's index must
    /// equal the current length and its previous hash must match the tail
    /// (zero sentinel when empty), otherwise `StaleAppend`. The stored hash
    /// must match recomputation and satisfy the difficulty predicate.
    pub fn append(&self, block: Block) -> Result<(), AppendError> {
        let mut inner = self.inner.write().unwrap();

        if block.index != inner.blocks.len() as u64 {
            return Err(AppendError::StaleAppend);
        }
        let expected_prev = inner.blocks.last().map(|b| b.hash).unwrap_or_else(Hash::zero);
        if block.previous_hash != expected_prev {
            return Err(AppendError::StaleAppend);
        }
        if block.hash != block.compute_hash() {
            return Err(AppendError::InvalidBlock("hash mismatch"));
        }
        if !block.meets_difficulty(self.config.difficulty) {
            return Err(AppendError::InvalidBlock("proof of work not satisfied"));
        }

        if let Some(db) = &self.db {
            // Availability over durability: a persistence failure degrades
            // to memory-only instead of failing the append.
            if let Err(e) = db.save_block(&block) {
                warn!(index = block.index, error = %e, "persist failed; continuing in memory");
            }
        }

        inner.content_index.insert(block.fact.content_hash());
        info!(index = block.index, hash = %block.hash, "block appended");
        inner.blocks.push(block);
        Ok(())
    }

    /// O(1) read of the chain tail
    pub fn latest(&self) -> Option<Block> {
        self.inner.read().unwrap().blocks.last().cloned()
    }

    /// Read a block by index
    pub fn get(&self, index: u64) -> Option<Block> {
        // try_from keeps an out-of-range u64 from truncating into a valid
        // slot on 32-bit targets
        let index = usize::try_from(index).ok()?;
        self.inner.read().unwrap().blocks.get(index).cloned()
    }

    /// Most recent `limit` blocks, in ascending order
    pub fn tail(&self, limit: usize) -> Vec<Block> {
        let inner = self.inner.read().unwrap();
        let skip = inner.blocks.len().saturating_sub(limit);
        inner.blocks[skip..].to_vec()
    }

    /// Current chain length
    pub fn len(&self) -> u64 {
        self.inner.read().unwrap().blocks.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a fact with this content hash is already sealed
    pub fn contains_content(&self, content_hash: &Hash) -> bool {
        self.inner.read().unwrap().content_index.contains(content_hash)
    }

    /// Whether the backing store is attached
    pub fn is_persistent(&self) -> bool {
        self.db.is_some()
    }

    /// Full integrity audit: recompute every hash, re-check linkage, and
    /// re-check the proof-of-work predicate. O(n) under a read lock.
    pub fn is_valid(&self) -> bool {
        let inner = self.inner.read().unwrap();
        let mut prev_hash = Hash::zero();
        for (i, block) in inner.blocks.iter().enumerate() {
            if block.index != i as u64 {
                return false;
            }
            if block.previous_hash != prev_hash {
                return false;
            }
            if block.hash != block.compute_hash() {
                return false;
            }
            if !block.meets_difficulty(self.config.difficulty) {
                return false;
            }
            prev_hash = block.hash;
        }
        true
    }
}
