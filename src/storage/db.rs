//! Database persistence layer using Sled
//!
//! One document per block, keyed by big-endian index so iteration yields
//! ascending order. The attachment ledger lives in its own tree, also keyed
//! by block index.

use std::path::Path;

use sled::{Db, Tree};
use thiserror::Error;

use crate::attachments::AttachmentRef;
use crate::ledger::Block;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Database wrapper
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
    blocks_tree: Tree,
    attachments_tree: Tree,
}

impl LedgerDb {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let blocks_tree = db.open_tree("blocks")?;
        let attachments_tree = db.open_tree("attachments")?;

        Ok(Self {
            db,
            blocks_tree,
            attachments_tree,
        })
    }

    /// Save a block, keyed by index
    pub fn save_block(&self, block: &Block) -> Result<(), StoreError> {
        let value = serde_json::to_vec(block)?;
        self.blocks_tree.insert(block.index.to_be_bytes(), value)?;
        self.db.flush()?;
        Ok(())
    }

    /// Load all blocks in ascending index order
    pub fn load_blocks(&self) -> Result<Vec<Block>, StoreError> {
        let mut blocks = Vec::new();
        for item in self.blocks_tree.iter() {
            let (_, value) = item?;
            let block: Block = serde_json::from_slice(&value)?;
            blocks.push(block);
        }
        Ok(blocks)
    }

    /// Save the attachment list for a block
    pub fn save_attachments(&self, index: u64, refs: &[AttachmentRef]) -> Result<(), StoreError> {
        let value = serde_json::to_vec(refs)?;
        self.attachments_tree.insert(index.to_be_bytes(), value)?;
        self.db.flush()?;
        Ok(())
    }

    /// Load all attachment lists
    pub fn load_attachments(&self) -> Result<Vec<(u64, Vec<AttachmentRef>)>, StoreError> {
        let mut out = Vec::new();
        for item in self.attachments_tree.iter() {
            let (key, value) = item?;
            if key.len() != 8 {
                continue;
            }
            let mut idx_bytes = [0u8; 8];
            idx_bytes.copy_from_slice(&key);
            let refs: Vec<AttachmentRef> = serde_json::from_slice(&value)?;
            out.push((u64::from_be_bytes(idx_bytes), refs));
        }
        Ok(out)
    }
}
