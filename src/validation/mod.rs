//! Fact validation
//!
//! Pure predicate over a submitted fact and the current chain. Checks run
//! in a fixed order and short-circuit on the first failure.

use std::sync::Arc;

use thiserror::Error;

use crate::config::LedgerConfig;
use crate::crypto::verify_detached;
use crate::ledger::Fact;
use crate::storage::ChainStore;

/// Validation failures, one per rejected rule
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("content is below the minimum length")]
    ContentTooShort,
    #[error("content exceeds the maximum length")]
    ContentTooLarge,
    #[error("domain is not in the accepted set")]
    InvalidDomain,
    #[error("identical content is already sealed in the chain")]
    DuplicateFact,
    #[error("serialized metadata exceeds the maximum size")]
    MetadataTooLarge,
}

impl ValidationError {
    /// Stable machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidSignature => "InvalidSignature",
            ValidationError::ContentTooShort => "ContentTooShort",
            ValidationError::ContentTooLarge => "ContentTooLarge",
            ValidationError::InvalidDomain => "InvalidDomain",
            ValidationError::DuplicateFact => "DuplicateFact",
            ValidationError::MetadataTooLarge => "MetadataTooLarge",
        }
    }
}

/// Applies content, domain, size, and duplicate rules to submitted facts
#[derive(Clone)]
pub struct FactValidator {
    config: Arc<LedgerConfig>,
}

impl FactValidator {
    pub fn new(config: Arc<LedgerConfig>) -> Self {
        Self { config }
    }

    /// Validate a fact against the current chain.
    ///
    /// Check order: signature, content length, domain, duplicate content,
    /// metadata size. No side effects.
    pub fn validate(&self, fact: &Fact, chain: &ChainStore) -> Result<(), ValidationError> {
        if !verify_detached(fact.content.as_bytes(), &fact.signature, &fact.public_key) {
            return Err(ValidationError::InvalidSignature);
        }

        let content_len = fact.content.len();
        if content_len < self.config.min_content_bytes {
            return Err(ValidationError::ContentTooShort);
        }
        if content_len > self.config.max_content_bytes {
            return Err(ValidationError::ContentTooLarge);
        }

        if !self.config.is_allowed_domain(&fact.domain) {
            return Err(ValidationError::InvalidDomain);
        }

        if chain.contains_content(&fact.content_hash()) {
            return Err(ValidationError::DuplicateFact);
        }

        if fact.metadata_size() > self.config.max_metadata_bytes {
            return Err(ValidationError::MetadataTooLarge);
        }

        Ok(())
    }
}
