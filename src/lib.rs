//! # nyzo-verifier-core
//!
//! A Nyzo-style proof-of-diversity blockchain verifier core: block and
//! transaction types, the balance-snapshot execution rules, an incremental
//! cycle tracker, and the consensus loop that produces, votes on and
//! freezes blocks.
//!
//! ## Key components
//!
//! - [`chain`]: canonical wire types — [`chain::Transaction`], [`chain::Block`],
//!   [`chain::BalanceSnapshot`].
//! - [`consensus`]: the cycle tracker, block executor, transaction
//!   admission filter, frozen/unfrozen chain stores, vote tallier and the
//!   loop that drives them.
//! - [`crypto`]: the pluggable hash/signature primitives the rest of the
//!   crate is generic over.
//! - [`message`]: the signed wire envelope used to gossip transactions,
//!   blocks and votes between verifiers.
//! - [`signer`]: the running verifier's own keys, injected rather than
//!   reached for as a static.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use nyzo_verifier_core::consensus::{ConsensusConfig, ConsensusLoop, FrozenChain, ConsensusMetrics};
//! use nyzo_verifier_core::signer::SignerIdentity;
//!
//! let config = ConsensusConfig::default();
//! let metrics = std::sync::Arc::new(ConsensusMetrics::new(&prometheus::Registry::new()).unwrap());
//! let mut loop_ = ConsensusLoop::new(config, signer, frozen_chain, metrics);
//! loop_.run_iteration(now_ms, &pending_txs, &known_hash_at_height).await?;
//! ```

pub mod chain;
pub mod consensus;
pub mod constants;
pub mod crypto;
pub mod hash;
pub mod message;
pub mod signer;

pub use chain::{BalanceItem, BalanceSnapshot, Block, CycleVoterSignature, Transaction, TransactionType};
pub use consensus::{
    ConsensusConfig, ConsensusError, ConsensusLoop, ConsensusMetrics, ConsensusResult, CycleTracker,
    FrozenChain, UnfrozenStore, ValidationCache, VoteTallier,
};
pub use crypto::{Identifier, Signature, SignatureScheme};
pub use hash::Hash;
pub use message::{Message, MessageContent, MessageTag};
pub use signer::SignerIdentity;
