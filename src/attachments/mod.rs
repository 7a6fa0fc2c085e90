//! Multimedia attachment store
//!
//! Binds binary attachments to sealed blocks by index. Blocks themselves
//! stay frozen: attachment references live in their own append-only ledger
//! (sled tree plus in-memory map) and are joined into block views at read
//! time. File bytes are stored content-addressed on disk.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{epoch_seconds, LedgerConfig};
use crate::crypto::{hash_bytes, Hash};
use crate::storage::{ChainStore, LedgerDb};

/// Attachment failures
#[derive(Debug, Error, PartialEq)]
pub enum AttachError {
    #[error("file exceeds the maximum attachment size")]
    TooLarge,
    #[error("file extension is not in the accepted set")]
    UnsupportedType,
    #[error("no block exists at that index")]
    BlockNotFound,
    #[error("attachment storage failed")]
    Storage,
}

impl AttachError {
    /// Stable machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            AttachError::TooLarge => "TooLarge",
            AttachError::UnsupportedType => "UnsupportedType",
            AttachError::BlockNotFound => "BlockNotFound",
            AttachError::Storage => "Storage",
        }
    }
}

/// Reference to stored attachment bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    /// SHA-256 of the raw bytes
    pub content_hash: Hash,
    /// File extension, lowercase with leading dot
    #[serde(rename = "type")]
    pub extension: String,
    /// Size in bytes
    pub size: u64,
    /// Upload time, seconds since the Unix epoch
    pub uploaded_at: u64,
}

/// Append-only attachment ledger keyed by block index
pub struct AttachmentStore {
    ledger: Mutex<BTreeMap<u64, Vec<AttachmentRef>>>,
    dir: PathBuf,
    db: Option<LedgerDb>,
    config: Arc<LedgerConfig>,
}

impl AttachmentStore {
    /// Create the store, loading any persisted attachment lists.
    pub fn new(config: Arc<LedgerConfig>, db: Option<LedgerDb>) -> Self {
        let mut map = BTreeMap::new();
        if let Some(db) = &db {
            match db.load_attachments() {
                Ok(entries) => {
                    for (index, refs) in entries {
                        map.insert(index, refs);
                    }
                }
                Err(e) => warn!(error = %e, "failed to load attachment ledger"),
            }
        }
        Self {
            ledger: Mutex::new(map),
            dir: config.attachment_dir.clone(),
            db,
            config,
        }
    }

    /// Attach bytes to an existing block.
    ///
    /// Validates before any write, so a rejected upload leaves no orphaned
    /// bytes on disk. Same-block appends serialize on the ledger lock;
    /// uploads to different blocks and chain reads proceed independently.
    pub fn attach(
        &self,
        chain: &ChainStore,
        block_index: u64,
        bytes: &[u8],
        extension: &str,
    ) -> Result<AttachmentRef, AttachError> {
        if chain.get(block_index).is_none() {
            return Err(AttachError::BlockNotFound);
        }
        if bytes.len() > self.config.max_file_bytes {
            return Err(AttachError::TooLarge);
        }
        let extension = extension.to_ascii_lowercase();
        if !self.config.is_allowed_extension(&extension) {
            return Err(AttachError::UnsupportedType);
        }

        let content_hash = hash_bytes(bytes);

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(error = %e, "attachment directory unavailable");
            return Err(AttachError::Storage);
        }
        let path = self.dir.join(format!("{}{}", content_hash, extension));
        if let Err(e) = std::fs::write(&path, bytes) {
            warn!(error = %e, "attachment write failed");
            return Err(AttachError::Storage);
        }

        let uploaded_at = epoch_seconds();
        let attachment = AttachmentRef {
            content_hash,
            extension,
            size: bytes.len() as u64,
            uploaded_at,
        };

        let mut ledger = self.ledger.lock().unwrap();
        let refs = ledger.entry(block_index).or_default();
        refs.push(attachment.clone());

        if let Some(db) = &self.db {
            if let Err(e) = db.save_attachments(block_index, refs) {
                warn!(block_index, error = %e, "attachment persist failed; continuing in memory");
            }
        }

        info!(block_index, hash = %attachment.content_hash, size = attachment.size,
            "attachment stored");
        Ok(attachment)
    }

    /// Read-time join: attachments bound to a block
    pub fn attachments_for(&self, block_index: u64) -> Vec<AttachmentRef> {
        self.ledger
            .lock()
            .unwrap()
            .get(&block_index)
            .cloned()
            .unwrap_or_default()
    }
}
