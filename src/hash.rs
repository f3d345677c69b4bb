//! Content fingerprints

use sha2::{Digest, Sha256};

/// Length in characters of every fingerprint produced by [`content_hash`]
pub const CONTENT_HASH_LEN: usize = 64;

/// Hex-encoded SHA-256 of `bytes`.
///
/// Deterministic and infallible, including for empty input.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
