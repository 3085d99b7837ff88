//! Message envelope and tagged union (§6.1)
//!
//! `length(u32) || timestamp(i64) || type(u16) || content || sender_id(32)
//! || sender_sig(64)`. Replaces the dynamic-dispatch `MessageObject`
//! interface the Design Notes call out (§9: "Replace with a tagged-union
//! `Message::{Block, Vote, Transaction, ...}` so that exhaustive handling
//! is compiler-checked").

use crate::chain::block::Block;
use crate::chain::transaction::Transaction;
use crate::crypto::{Identifier, Signature};
use crate::hash::Hash;

/// The wire-level type tag (§6.1 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MessageTag {
    Transaction = 5,
    NewBlock = 9,
    BlockVote = 19,
    BlockVoteResponse = 20,
    NodeJoinV2 = 43,
}

impl MessageTag {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            5 => Some(Self::Transaction),
            9 => Some(Self::NewBlock),
            19 => Some(Self::BlockVote),
            20 => Some(Self::BlockVoteResponse),
            43 => Some(Self::NodeJoinV2),
            _ => None,
        }
    }
}

/// A vote for `height`, identified by the candidate's block hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockVote {
    pub height: u64,
    pub hash: Hash,
}

/// Content recognised by this core; everything else is out of scope (§1)
/// and left for the embedding application to route.
#[derive(Debug, Clone)]
pub enum MessageContent {
    Transaction(Transaction),
    NewBlock(Block),
    BlockVote(BlockVote),
    BlockVoteResponse,
    /// Peer-directory content the core does not interpret (§1 out-of-scope).
    NodeJoinV2(Vec<u8>),
}

impl MessageContent {
    pub fn tag(&self) -> MessageTag {
        match self {
            Self::Transaction(_) => MessageTag::Transaction,
            Self::NewBlock(_) => MessageTag::NewBlock,
            Self::BlockVote(_) => MessageTag::BlockVote,
            Self::BlockVoteResponse => MessageTag::BlockVoteResponse,
            Self::NodeJoinV2(_) => MessageTag::NodeJoinV2,
        }
    }

    /// Canonical content bytes, excluding the envelope fields around it.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Transaction(tx) => tx.to_bytes(),
            Self::NewBlock(block) => block.to_bytes(),
            Self::BlockVote(vote) => {
                let mut buf = Vec::with_capacity(40);
                buf.extend_from_slice(&vote.height.to_be_bytes());
                buf.extend_from_slice(&vote.hash.0);
                buf
            }
            Self::BlockVoteResponse => Vec::new(),
            Self::NodeJoinV2(bytes) => bytes.clone(),
        }
    }
}

/// A signed envelope (§6.1): `sender_sig` covers everything from
/// `timestamp` through `content` and `sender_id`.
#[derive(Debug, Clone)]
pub struct Message {
    pub timestamp: i64,
    pub content: MessageContent,
    pub sender_id: Identifier,
    pub sender_sig: Signature,
}

impl Message {
    /// The body `sender_sig` is computed over: everything except the
    /// length prefix and the signature itself.
    pub fn signing_body(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&(self.content.tag() as u16).to_be_bytes());
        buf.extend_from_slice(&self.content.to_bytes());
        buf.extend_from_slice(&self.sender_id.0);
        buf
    }

    /// Wire-exact bytes including the `u32` length prefix (§6.1).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = self.signing_body();
        body.extend_from_slice(&self.sender_sig.0);
        let mut out = Vec::with_capacity(body.len() + 4);
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&body);
        out
    }

    pub fn verify(&self, signature_scheme: &dyn crate::crypto::SignatureScheme) -> bool {
        signature_scheme.verify(&self.sender_sig, &self.signing_body(), &self.sender_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ed25519::Ed25519Signer;
    use crate::crypto::SignatureScheme;

    #[test]
    fn tag_round_trips_through_u16() {
        for tag in [
            MessageTag::Transaction,
            MessageTag::NewBlock,
            MessageTag::BlockVote,
            MessageTag::BlockVoteResponse,
            MessageTag::NodeJoinV2,
        ] {
            assert_eq!(MessageTag::from_u16(tag as u16), Some(tag));
        }
    }

    #[test]
    fn signed_vote_message_verifies() {
        let signer = Ed25519Signer::from_seed([4u8; 32]);
        let mut message = Message {
            timestamp: 1_000,
            content: MessageContent::BlockVote(BlockVote {
                height: 42,
                hash: Hash::of(b"candidate"),
            }),
            sender_id: signer.identifier(),
            sender_sig: Signature::ZERO,
        };
        message.sender_sig = signer.sign(&message.signing_body());
        assert!(message.verify(&signer));
    }

    #[test]
    fn tampered_content_fails_verification() {
        let signer = Ed25519Signer::from_seed([5u8; 32]);
        let mut message = Message {
            timestamp: 1_000,
            content: MessageContent::BlockVote(BlockVote {
                height: 1,
                hash: Hash::of(b"a"),
            }),
            sender_id: signer.identifier(),
            sender_sig: Signature::ZERO,
        };
        message.sender_sig = signer.sign(&message.signing_body());
        message.content = MessageContent::BlockVote(BlockVote {
            height: 1,
            hash: Hash::of(b"b"),
        });
        assert!(!message.verify(&signer));
    }

    #[test]
    fn wire_bytes_are_length_prefixed() {
        let signer = Ed25519Signer::from_seed([6u8; 32]);
        let mut message = Message {
            timestamp: 0,
            content: MessageContent::BlockVoteResponse,
            sender_id: signer.identifier(),
            sender_sig: Signature::ZERO,
        };
        message.sender_sig = signer.sign(&message.signing_body());
        let bytes = message.to_bytes();
        let len = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize;
        assert_eq!(len, bytes.len() - 4);
    }
}
