//! Ed25519 signature verification
//!
//! Facts carry a detached Ed25519 signature over their raw content bytes.
//! Verification fails closed: any malformed input yields `false`, never an
//! error, so malformed submissions cannot probe the verifier.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

/// Raw Ed25519 public key length
pub const PUBLIC_KEY_LEN: usize = 32;

/// Raw Ed25519 signature length
pub const SIGNATURE_LEN: usize = 64;

/// Verify a detached signature over `content`.
///
/// Returns `false` on wrong-length key or signature, undecodable key, or
/// cryptographic verification failure.
pub fn verify_detached(content: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let key_bytes: [u8; PUBLIC_KEY_LEN] = match public_key.try_into() {
        Ok(b) => b,
        Err(_) => return false,
    };
    let sig_bytes: [u8; SIGNATURE_LEN] = match signature.try_into() {
        Ok(b) => b,
        Err(_) => return false,
    };

    let verifying_key = match VerifyingKey::from_bytes(&key_bytes) {
        Ok(vk) => vk,
        Err(_) => return false,
    };
    let sig = Signature::from_bytes(&sig_bytes);

    verifying_key.verify(content, &sig).is_ok()
}

/// Ed25519 keypair for fact creators.
///
/// The ledger core only verifies; signing lives here for tests and for
/// tooling that produces submissions.
#[derive(Clone)]
pub struct Keypair(SigningKey);

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        Keypair(SigningKey::generate(&mut OsRng))
    }

    /// Restore from a 32-byte seed
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Keypair(SigningKey::from_bytes(bytes))
    }

    /// Sign raw content bytes
    pub fn sign(&self, content: &[u8]) -> Vec<u8> {
        self.0.sign(content).to_bytes().to_vec()
    }

    /// Raw public key bytes
    pub fn public_key(&self) -> Vec<u8> {
        self.0.verifying_key().to_bytes().to_vec()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keypair([REDACTED])")
    }
}
