// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Evidence pack construction, deterministic-candidate binding, and the
//! content hashes that back source and snippet identity (`spec.md` §3.4,
//! §4.5, §4.9 verification mode).

mod binding;
mod builder;
mod diff;

pub use binding::{bind_deterministic_candidates, rebind_dangling_ref, DeterministicCandidate};
pub use builder::EvidencePackBuilder;
pub use diff::{diff_field_values, FieldDelta, VerificationDelta};

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of raw page bytes, used as `Source::content_hash`.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Hex-encoded SHA-256 of extracted plain text, used as `Source::text_hash`
/// and `EvidencePack::text_hash`.
#[must_use]
pub fn text_hash(text: &str) -> String {
    specfactory_types::sha256_hex(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_64_hex_chars() {
        assert_eq!(content_hash(b"hello world").len(), 64);
    }

    #[test]
    fn content_hash_is_deterministic() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
    }

    #[test]
    fn text_hash_matches_shared_sha256_helper() {
        assert_eq!(text_hash("hello"), specfactory_types::sha256_hex("hello"));
    }
}
