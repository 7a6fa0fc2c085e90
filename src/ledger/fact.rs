//! Fact structure
//!
//! A fact is an unsealed, signed content submission. It is immutable once
//! constructed and gains an identity only when sealed into a block.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::crypto::{hash_bytes, Hash};

/// A proposed ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    /// Fact text, bounded length
    pub content: String,
    /// Knowledge domain, member of the configured set
    pub domain: String,
    /// Opaque creator identifier
    pub creator: String,
    /// Informational stake amount; economics live outside this core
    #[serde(default)]
    pub stake: f64,
    /// Bounded key/value metadata. BTreeMap keeps serialization canonical.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Detached Ed25519 signature over the raw content bytes
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
    /// Creator's raw Ed25519 public key
    #[serde(with = "hex_bytes")]
    pub public_key: Vec<u8>,
}

impl Fact {
    /// Content hash used for deduplication
    pub fn content_hash(&self) -> Hash {
        hash_bytes(self.content.as_bytes())
    }

    /// Serialized metadata size in bytes
    pub fn metadata_size(&self) -> usize {
        serde_json::to_vec(&self.metadata).map(|v| v.len()).unwrap_or(0)
    }
}

/// Byte vectors travel as hex strings in JSON
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
