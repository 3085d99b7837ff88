//! Block (C4) — §3.3
//!
//! Height, parent hash, timestamps, ordered transactions, balance-snapshot
//! hash, signer id and signature. Block identity is the signature itself:
//! `hash = doubleSHA256(signer_signature)`.

use crate::chain::transaction::Transaction;
use crate::constants::{BLOCK_DURATION_MS, GENESIS_PREVIOUS_HASH};
use crate::crypto::{Identifier, Signature};
use crate::hash::Hash;
use serde::{Deserialize, Serialize};

/// A block as defined in §3.3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub version: u16,
    pub height: u64,
    pub previous_block_hash: Hash,
    pub start_timestamp: i64,
    pub verification_timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub balance_list_hash: Hash,
    pub signer_id: Identifier,
    pub signer_signature: Signature,
}

impl Block {
    /// `start_timestamp(h) = genesis_start + h * BLOCK_DURATION`.
    pub fn expected_start_timestamp(genesis_start: i64, height: u64) -> i64 {
        genesis_start + (height as i64) * BLOCK_DURATION_MS
    }

    /// Canonical signing body: all fields except `signer_signature` (§3.3).
    pub fn signing_body(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_be_bytes());
        buf.extend_from_slice(&self.height.to_be_bytes());
        buf.extend_from_slice(&self.previous_block_hash.0);
        buf.extend_from_slice(&self.start_timestamp.to_be_bytes());
        buf.extend_from_slice(&self.verification_timestamp.to_be_bytes());
        buf.extend_from_slice(&(self.transactions.len() as u32).to_be_bytes());
        for tx in &self.transactions {
            buf.extend_from_slice(&tx.to_bytes());
        }
        buf.extend_from_slice(&self.balance_list_hash.0);
        buf.extend_from_slice(&self.signer_id.0);
        buf
    }

    /// Wire-exact bytes including the signature, for transmission (§6.2).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.signing_body();
        buf.extend_from_slice(&self.signer_signature.0);
        buf
    }

    /// `hash = doubleSHA256(signer_signature)` (§3.3): two blocks are
    /// identical iff their signatures are.
    pub fn hash(&self) -> Hash {
        Hash::of(&self.signer_signature.0)
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0 && self.previous_block_hash.0 == GENESIS_PREVIOUS_HASH
    }

    /// Checks the height time window (§3.3): `start_timestamp` must equal
    /// `expected_start_timestamp(height)` and `verification_timestamp` must
    /// fall in `[start_timestamp, start_timestamp + open_edge_slack]`.
    pub fn is_within_time_window(&self, genesis_start: i64, open_edge_slack: i64) -> bool {
        let expected_start = Self::expected_start_timestamp(genesis_start, self.height);
        if self.start_timestamp != expected_start {
            return false;
        }
        self.verification_timestamp >= self.start_timestamp
            && self.verification_timestamp <= self.start_timestamp + open_edge_slack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block {
            version: 0,
            height: 1,
            previous_block_hash: Hash([1u8; 32]),
            start_timestamp: 7_000,
            verification_timestamp: 7_500,
            transactions: Vec::new(),
            balance_list_hash: Hash([2u8; 32]),
            signer_id: Identifier([3u8; 32]),
            signer_signature: Signature([4u8; 64]),
        }
    }

    #[test]
    fn hash_is_double_sha256_of_signature() {
        let block = sample_block();
        assert_eq!(block.hash(), Hash::of(&block.signer_signature.0));
    }

    #[test]
    fn signing_body_excludes_signature() {
        let block = sample_block();
        let mut tampered = block.clone();
        tampered.signer_signature = Signature([9u8; 64]);
        assert_eq!(block.signing_body(), tampered.signing_body());
        assert_ne!(block.hash(), tampered.hash());
    }

    #[test]
    fn expected_start_timestamp_advances_by_block_duration() {
        assert_eq!(Block::expected_start_timestamp(0, 0), 0);
        assert_eq!(Block::expected_start_timestamp(0, 1), BLOCK_DURATION_MS);
        assert_eq!(Block::expected_start_timestamp(1000, 2), 1000 + 2 * BLOCK_DURATION_MS);
    }

    #[test]
    fn time_window_rejects_wrong_start_timestamp() {
        let mut block = sample_block();
        block.start_timestamp = 1;
        assert!(!block.is_within_time_window(0, BLOCK_DURATION_MS));
    }

    #[test]
    fn time_window_rejects_verification_timestamp_outside_slack() {
        let mut block = sample_block();
        block.start_timestamp = 0;
        block.height = 0;
        block.verification_timestamp = BLOCK_DURATION_MS * 10;
        assert!(!block.is_within_time_window(0, BLOCK_DURATION_MS));
    }

    #[test]
    fn genesis_block_is_recognised() {
        let mut block = sample_block();
        block.height = 0;
        block.previous_block_hash = Hash(GENESIS_PREVIOUS_HASH);
        assert!(block.is_genesis());
    }
}
