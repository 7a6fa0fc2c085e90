//! Ledger configuration
//!
//! One immutable value constructed at process start and injected into every
//! component. Nothing in the core reads ambient global state.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Process-wide ledger configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Proof-of-work difficulty: required leading zero hex characters
    pub difficulty: usize,
    /// Minimum fact content length in bytes
    pub min_content_bytes: usize,
    /// Maximum fact content length in bytes
    pub max_content_bytes: usize,
    /// Maximum serialized metadata size in bytes
    pub max_metadata_bytes: usize,
    /// Maximum attachment file size in bytes
    pub max_file_bytes: usize,
    /// Accepted fact domains
    pub allowed_domains: Vec<String>,
    /// Accepted attachment file extensions (lowercase, with leading dot)
    pub allowed_extensions: Vec<String>,
    /// Submissions allowed per client per minute
    pub submit_per_minute: u32,
    /// Attachment uploads allowed per client per minute
    pub upload_per_minute: u32,
    /// Read requests allowed per client per minute
    pub read_per_minute: u32,
    /// Maximum concurrent proof-of-work jobs
    pub mining_workers: usize,
    /// How long a submission may spend mining before it is cancelled
    pub mining_timeout: Duration,
    /// Sled database path
    pub db_path: PathBuf,
    /// Directory for attachment file storage
    pub attachment_dir: PathBuf,
    /// HTTP listen port
    pub listen_port: u16,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: 4,
            min_content_bytes: 10,
            max_content_bytes: 100_000,
            max_metadata_bytes: 10_000,
            max_file_bytes: 50_000_000,
            allowed_domains: ["medical", "legal", "education", "health", "general"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_extensions: [".jpg", ".jpeg", ".png", ".gif", ".mp4", ".pdf", ".txt", ".json"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            submit_per_minute: 5,
            upload_per_minute: 10,
            read_per_minute: 20,
            mining_workers: 2,
            mining_timeout: Duration::from_secs(30),
            db_path: PathBuf::from("factchain-data"),
            attachment_dir: PathBuf::from("factchain-multimedia"),
            listen_port: 8002,
        }
    }
}

/// Seconds since the Unix epoch, saturating to 0 before the epoch
pub fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl LedgerConfig {
    /// Check domain membership
    pub fn is_allowed_domain(&self, domain: &str) -> bool {
        self.allowed_domains.iter().any(|d| d == domain)
    }

    /// Check extension membership (case-insensitive)
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        let lower = extension.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|e| *e == lower)
    }
}
