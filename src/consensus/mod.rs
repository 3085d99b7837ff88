//! Consensus engine (C5–C12)
//!
//! The cycle tracker, block executor, transaction admission filter,
//! frozen chain, unfrozen candidate store, vote tallier and the loop that
//! drives them (§4). Ambient concerns — errors, configuration, metrics,
//! caching — live alongside the algorithmic components rather than in a
//! separate crate, matching the teacher's `consensus` module layout.

pub mod admission;
pub mod cache;
pub mod config;
pub mod consensus_loop;
pub mod cycle;
pub mod error;
pub mod executor;
pub mod frozen_chain;
pub mod metrics;
pub mod store;
pub mod unfrozen_store;
pub mod vote_tallier;

pub use cache::{CacheConfig, ValidationCache};
pub use config::ConsensusConfig;
pub use consensus_loop::ConsensusLoop;
pub use cycle::{Continuity, CycleTracker, NewVerifierState};
pub use error::{ConflictReason, ConsensusError, ConsensusResult, FatalError, InvalidReason, TransientError};
pub use frozen_chain::FrozenChain;
pub use metrics::ConsensusMetrics;
pub use store::{BlockStore, MemoryBlockStore};
pub use unfrozen_store::UnfrozenStore;
pub use vote_tallier::VoteTallier;
