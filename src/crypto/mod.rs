//! Cryptographic primitives: SHA-256 hashing and Ed25519 signatures

mod hash;
mod signature;

pub use hash::{hash_bytes, Hash};
pub use signature::{verify_detached, Keypair, PUBLIC_KEY_LEN, SIGNATURE_LEN};
