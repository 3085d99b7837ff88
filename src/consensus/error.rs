//! Error kinds (§7)
//!
//! Four families, mirroring the teacher's `thiserror`-derived
//! `ConsensusError` in `consensus/v1/types.rs`: transient, invalid,
//! conflict and fatal. Propagation policy follows §7 exactly — invalid
//! input is dropped locally, fatal errors abort only the current freeze
//! attempt.

use thiserror::Error;

/// Recoverable I/O or timing failures; the operation is simply abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransientError {
    #[error("I/O failure")]
    Io,
    #[error("operation timed out")]
    Timeout,
}

/// The offending input is silently dropped; no state change results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("signature does not verify")]
    Signature,
    #[error("timestamp outside the permitted window")]
    Timestamp,
    #[error("transaction type not permitted at this height/version")]
    TypeForHeight,
    #[error("previous-hash binding does not match the frozen chain")]
    PreviousHash,
    #[error("rejected by the anti-dust filter")]
    Dust,
    #[error("sender has insufficient funds")]
    InsufficientFunds,
    #[error("duplicate of an already-known item")]
    Duplicate,
    #[error("height outside the permitted (frozen_edge, open_edge] window")]
    HeightOutOfRange,
    #[error("voter is not a member of the current signer cycle")]
    VoterNotInCycle,
}

/// Rejected without state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictReason {
    #[error("vote flip throttled: needs {needed} confirmations, has {have}")]
    VoteFlipThrottled { needed: u32, have: u32 },
    #[error("a block with a different hash already occupies this height/signer slot")]
    BlockExistsWithDifferentHash,
}

/// The loop refuses to advance the frozen edge; no silent recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("supply invariant violated: {0}")]
    SupplyInvariantViolated(String),
    #[error("post-execution snapshot hash does not match the block's claimed hash")]
    SnapshotHashMismatchPostExecute,
    #[error("block store write failed: {0}")]
    StoreWriteFailed(String),
    #[error("freeze_block precondition violated: {0}")]
    FreezePreconditionViolated(String),
}

/// The top-level sum type from §7.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    #[error("transient: {0}")]
    Transient(#[from] TransientError),
    #[error("invalid: {0}")]
    Invalid(#[from] InvalidReason),
    #[error("conflict: {0}")]
    Conflict(#[from] ConflictReason),
    #[error("fatal: {0}")]
    Fatal(#[from] FatalError),
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;
