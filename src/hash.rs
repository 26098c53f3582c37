//! Order-independent content hashing.
//!
//! Two runs over logically-identical data must produce the same fingerprint
//! even when the underlying files order their records differently.
//! [`UnorderedSha256`] therefore combines per-record SHA-256 digests with a
//! commutative rule: each record is hashed on its own, the 32 digest bytes
//! are added lane-wise into a `[u64; 32]` accumulator, and the final digest
//! is the SHA-256 of the accumulator's little-endian byte encoding.
//!
//! The digest algorithm, the lane-wise addition, and the little-endian
//! finalization are a published reproducibility contract: a fingerprint in a
//! paper lets a third party verify their preprocessing matches the original
//! without redistributing the data. Changing any part of the construction
//! invalidates previously published fingerprints.

use serde::Serialize;
use sha2::{Digest, Sha256};

const DIGEST_LANES: usize = 32;

/// Compute the SHA-256 hash of `data` as 64 lowercase hex characters.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Canonical byte encoding of a record fed to the hash engine.
///
/// Records are serialized as compact JSON, which is deterministic for the
/// record shapes used here (strings, token lists, lists of token lists).
///
/// # Errors
/// Returns an error if the value cannot be represented as JSON.
pub fn dumps<T: Serialize>(record: &T) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(record)
}

/// SHA-256 over an unordered multiset of records.
///
/// Inserting the same records in any order yields the same digest.
#[derive(Debug, Clone)]
pub struct UnorderedSha256 {
    lanes: [u64; DIGEST_LANES],
}

impl UnorderedSha256 {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self { lanes: [0; DIGEST_LANES] }
    }

    /// Add one record to the multiset.
    pub fn update_data(&mut self, record: &[u8]) {
        let digest = Sha256::digest(record);
        for (lane, byte) in self.lanes.iter_mut().zip(digest.iter()) {
            *lane = lane.wrapping_add(u64::from(*byte));
        }
    }

    /// Merge another accumulator's multiset into this one.
    pub fn update_hasher(&mut self, other: &UnorderedSha256) {
        for (lane, other_lane) in self.lanes.iter_mut().zip(other.lanes.iter()) {
            *lane = lane.wrapping_add(*other_lane);
        }
    }

    /// Finalize into 64 lowercase hex characters.
    #[must_use]
    pub fn hexdigest(&self) -> String {
        let mut bytes = Vec::with_capacity(DIGEST_LANES * 8);
        for lane in &self.lanes {
            bytes.extend_from_slice(&lane.to_le_bytes());
        }
        sha256_hex(&bytes)
    }
}

impl Default for UnorderedSha256 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        let hash = sha256_hex(b"hello world");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_unordered_permutation_invariant() {
        let mut forward = UnorderedSha256::new();
        forward.update_data(b"I love NLP.");
        forward.update_data(b"Yes I do");
        forward.update_data(b"I love deep learning");

        let mut backward = UnorderedSha256::new();
        backward.update_data(b"I love deep learning");
        backward.update_data(b"Yes I do");
        backward.update_data(b"I love NLP.");

        assert_eq!(forward.hexdigest(), backward.hexdigest());
    }

    #[test]
    fn test_unordered_content_sensitive() {
        let mut a = UnorderedSha256::new();
        a.update_data(b"one");
        let mut b = UnorderedSha256::new();
        b.update_data(b"two");
        assert_ne!(a.hexdigest(), b.hexdigest());
    }

    #[test]
    fn test_unordered_multiset_counts_duplicates() {
        let mut once = UnorderedSha256::new();
        once.update_data(b"line");
        let mut twice = UnorderedSha256::new();
        twice.update_data(b"line");
        twice.update_data(b"line");
        assert_ne!(once.hexdigest(), twice.hexdigest());
    }

    #[test]
    fn test_update_hasher_merges_multisets() {
        let mut merged = UnorderedSha256::new();
        merged.update_data(b"a");
        merged.update_data(b"b");

        let mut left = UnorderedSha256::new();
        left.update_data(b"a");
        let mut right = UnorderedSha256::new();
        right.update_data(b"b");
        left.update_hasher(&right);

        assert_eq!(merged.hexdigest(), left.hexdigest());
    }

    #[test]
    fn test_hexdigest_is_lowercase_hex() {
        let mut hasher = UnorderedSha256::new();
        hasher.update_data(b"record");
        let digest = hasher.hexdigest();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_dumps_strings_and_token_lists() {
        let sentence = "I love NLP.".to_string();
        let tokens = vec!["I".to_string(), "love".to_string()];
        assert_eq!(dumps(&sentence).unwrap(), b"\"I love NLP.\"");
        assert_eq!(dumps(&tokens).unwrap(), b"[\"I\",\"love\"]");
    }
}
