//! Hashing primitives (C1)
//!
//! `Hash = SHA256(SHA256(x))` everywhere unless noted otherwise, per §3.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte double-SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// Compute `double_sha256(bytes)`.
    pub fn of(bytes: &[u8]) -> Self {
        let first = Sha256::digest(bytes);
        let second = Sha256::digest(first);
        let mut out = [0u8; 32];
        out.copy_from_slice(&second);
        Hash(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_sha256_matches_manual_computation() {
        let input = b"nyzo";
        let once = Sha256::digest(input);
        let twice = Sha256::digest(once);
        let expected = Hash(twice.into());
        assert_eq!(Hash::of(input), expected);
    }

    #[test]
    fn zero_hash_is_zero() {
        assert!(Hash::ZERO.is_zero());
        assert!(!Hash::of(b"anything").is_zero());
    }

    #[test]
    fn display_is_lowercase_hex() {
        let h = Hash([0xabu8; 32]);
        assert_eq!(h.to_string(), "ab".repeat(32));
    }
}
