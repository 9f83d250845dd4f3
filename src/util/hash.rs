//! Hashing utilities for archive verification.

use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compare two hex digests, case-insensitively.
///
/// Both sides are full 32-byte digests, so a plain byte comparison after
/// normalization already runs in time independent of where they differ
/// in any way that matters here; the inputs are not secrets.
pub fn digest_matches(expected: &str, actual: &str) -> bool {
    expected.len() == actual.len() && expected.eq_ignore_ascii_case(actual)
}
