//! Transaction (C2) — §3.1
//!
//! A value-bearing record with a canonical signing body that excludes
//! the signature itself, exactly as the teacher's v1 transaction type
//! documents its own wire format and domain-separation prefix.
//!
//! ## Canonical Encoding Order
//!
//! 1. `type` (u8)
//! 2. `timestamp` (i64, big-endian)
//! 3. `amount` (i64, big-endian)
//! 4. `receiver_id` (32 bytes)
//! 5. `sender_id` (32 bytes; all-zero when absent)
//! 6. `sender_data` (length-prefixed, u8 length, 0..=32 bytes)
//! 7. `previous_hash_height` (u64, big-endian)
//! 8. `previous_block_hash` (32 bytes)
//! 9. `signature` (64 bytes; all-zero when absent) — transmission only
//!
//! ## Canonical Signing Body
//!
//! ```text
//! type || timestamp || amount || receiver_id || previous_block_hash
//!      || sender_id || sha256(sender_data)
//! ```
//!
//! The signature is never part of the body it signs.

use crate::crypto::{Identifier, Signature};
use crate::hash::Hash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Transaction type discriminant (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    CoinGeneration = 0,
    Seed = 1,
    Standard = 2,
    Cycle = 3,
    CycleSignature = 4,
}

impl TransactionType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::CoinGeneration),
            1 => Some(Self::Seed),
            2 => Some(Self::Standard),
            3 => Some(Self::Cycle),
            4 => Some(Self::CycleSignature),
            _ => None,
        }
    }

    pub fn is_cycle_typed(self) -> bool {
        matches!(self, Self::Cycle | Self::CycleSignature)
    }
}

/// A per-voter signature attached to Cycle/CycleSignature transactions
/// (§3.1: "Cycle-typed transactions carry additional per-voter signature
/// maps; specified under §6").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleVoterSignature {
    pub voter_id: Identifier,
    pub signature: Signature,
}

/// A transaction as defined in §3.1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_type: TransactionType,
    pub timestamp: i64,
    pub amount: i64,
    pub receiver_id: Identifier,
    /// Absent only for `CoinGeneration`.
    pub sender_id: Option<Identifier>,
    /// 0..=32 bytes of opaque memo.
    pub sender_data: Vec<u8>,
    pub previous_hash_height: u64,
    pub previous_block_hash: Hash,
    /// Absent only for `CoinGeneration`.
    pub signature: Option<Signature>,
    /// Voter signatures accumulated for Cycle/CycleSignature transactions.
    #[serde(default)]
    pub cycle_voter_signatures: Vec<CycleVoterSignature>,
}

impl Transaction {
    /// Canonical signing body (§3.1): signature is never included.
    pub fn signing_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 * 3 + 16 + 1);
        buf.push(self.transaction_type as u8);
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(&self.receiver_id.0);
        buf.extend_from_slice(&self.previous_block_hash.0);
        buf.extend_from_slice(&self.sender_id.unwrap_or(Identifier::ZERO).0);
        let sender_data_hash = Sha256::digest(&self.sender_data);
        buf.extend_from_slice(&sender_data_hash);
        buf
    }

    /// `fee = max(1, amount / 400)` for Standard/Seed; 0 for CoinGeneration;
    /// 0 for Cycle/CycleSignature (funded by the synthetic cycle account,
    /// §4.2 step 2 — this crate's resolution of the "type-specific fee
    /// schedule" left open by §3.1/§6, recorded in DESIGN.md).
    pub fn fee(&self) -> i64 {
        match self.transaction_type {
            TransactionType::CoinGeneration => 0,
            TransactionType::Standard | TransactionType::Seed => (self.amount / 400).max(1),
            TransactionType::Cycle | TransactionType::CycleSignature => 0,
        }
    }

    /// Static validity checks independent of chain state (§3.1 "Validity (static)").
    /// Signature and previous-hash binding are checked separately where the
    /// chain state needed to verify them is available (see [`crate::consensus::admission`]).
    pub fn is_statically_valid(&self) -> bool {
        if self.sender_data.len() > 32 {
            return false;
        }
        match self.transaction_type {
            TransactionType::CoinGeneration => self.sender_id.is_none() && self.signature.is_none(),
            _ => self.sender_id.is_some() && self.signature.is_some(),
        }
    }

    /// Wire-exact canonical bytes (§6.2), including the signature field.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(self.transaction_type as u8);
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(&self.receiver_id.0);
        buf.extend_from_slice(&self.sender_id.unwrap_or(Identifier::ZERO).0);
        buf.push(self.sender_data.len() as u8);
        buf.extend_from_slice(&self.sender_data);
        buf.extend_from_slice(&self.previous_hash_height.to_be_bytes());
        buf.extend_from_slice(&self.previous_block_hash.0);
        buf.extend_from_slice(&self.signature.unwrap_or(Signature::ZERO).0);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut cursor = 0usize;
        let read = |cursor: &mut usize, n: usize| -> Option<&[u8]> {
            let slice = bytes.get(*cursor..*cursor + n)?;
            *cursor += n;
            Some(slice)
        };

        let type_byte = *read(&mut cursor, 1)?.first()?;
        let transaction_type = TransactionType::from_u8(type_byte)?;
        let timestamp = i64::from_be_bytes(read(&mut cursor, 8)?.try_into().ok()?);
        let amount = i64::from_be_bytes(read(&mut cursor, 8)?.try_into().ok()?);
        let receiver_id = Identifier(read(&mut cursor, 32)?.try_into().ok()?);
        let sender_id_bytes: [u8; 32] = read(&mut cursor, 32)?.try_into().ok()?;
        let sender_data_len = *read(&mut cursor, 1)?.first()? as usize;
        let sender_data = read(&mut cursor, sender_data_len)?.to_vec();
        let previous_hash_height = u64::from_be_bytes(read(&mut cursor, 8)?.try_into().ok()?);
        let previous_block_hash = Hash(read(&mut cursor, 32)?.try_into().ok()?);
        let signature_bytes: [u8; 64] = read(&mut cursor, 64)?.try_into().ok()?;

        let is_coin_generation = transaction_type == TransactionType::CoinGeneration;
        Some(Self {
            transaction_type,
            timestamp,
            amount,
            receiver_id,
            sender_id: if is_coin_generation || sender_id_bytes == [0u8; 32] {
                None
            } else {
                Some(Identifier(sender_id_bytes))
            },
            sender_data,
            previous_hash_height,
            previous_block_hash,
            signature: if is_coin_generation {
                None
            } else {
                Some(Signature(signature_bytes))
            },
            cycle_voter_signatures: Vec::new(),
        })
    }

    pub fn hash(&self) -> Hash {
        Hash::of(&self.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_standard_tx() -> Transaction {
        Transaction {
            transaction_type: TransactionType::Standard,
            timestamp: 1_700_000_000_000,
            amount: 10 * 1_000_000,
            receiver_id: Identifier([2u8; 32]),
            sender_id: Some(Identifier([1u8; 32])),
            sender_data: vec![1, 2, 3],
            previous_hash_height: 4,
            previous_block_hash: Hash([9u8; 32]),
            signature: Some(Signature([0xAA; 64])),
            cycle_voter_signatures: Vec::new(),
        }
    }

    #[test]
    fn fee_is_max_one_or_amount_over_400() {
        let mut tx = sample_standard_tx();
        tx.amount = 10 * 1_000_000;
        assert_eq!(tx.fee(), 25_000);

        tx.amount = 100;
        assert_eq!(tx.fee(), 1);
    }

    #[test]
    fn coin_generation_fee_is_zero() {
        let mut tx = sample_standard_tx();
        tx.transaction_type = TransactionType::CoinGeneration;
        tx.sender_id = None;
        tx.signature = None;
        assert_eq!(tx.fee(), 0);
    }

    #[test]
    fn signing_body_excludes_signature() {
        let tx = sample_standard_tx();
        let mut tampered = tx.clone();
        tampered.signature = Some(Signature([0xFF; 64]));
        assert_eq!(tx.signing_body(), tampered.signing_body());
    }

    #[test]
    fn round_trips_through_bytes() {
        let tx = sample_standard_tx();
        let bytes = tx.to_bytes();
        let decoded = Transaction::from_bytes(&bytes).expect("decodes");
        assert_eq!(decoded, tx);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn static_validity_requires_sender_and_signature_except_coin_generation() {
        let tx = sample_standard_tx();
        assert!(tx.is_statically_valid());

        let mut no_sender = tx.clone();
        no_sender.sender_id = None;
        assert!(!no_sender.is_statically_valid());

        let mut oversized_data = tx;
        oversized_data.sender_data = vec![0u8; 33];
        assert!(!oversized_data.is_statically_valid());
    }

    #[test]
    fn cycle_transaction_fee_is_zero() {
        let mut tx = sample_standard_tx();
        tx.transaction_type = TransactionType::Cycle;
        assert_eq!(tx.fee(), 0);
    }
}
