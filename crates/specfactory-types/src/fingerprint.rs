//! Canonical hashing helpers shared by candidates, snippets, and sources.
//!
//! Mirrors the hash-the-canonical-form discipline used throughout the
//! engine: normalize to a deterministic string, then SHA-256 it, so the same
//! logical observation always produces the same stable identifier across
//! runs.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `input`.
#[must_use]
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Deterministic fingerprint for a candidate: `sha(field|normalized-value|method|key_path)`.
///
/// `candidate_id` is defined this way in `spec.md` §3.3: stable across runs
/// for identical observations, independent of source or evidence ordering.
#[must_use]
pub fn candidate_fingerprint(
    field: &str,
    normalized_value: &str,
    method: &str,
    key_path: &str,
) -> String {
    sha256_hex(&format!("{field}|{normalized_value}|{method}|{key_path}"))
}
