//! Wire-format data model (C2–C4)
//!
//! Canonical, byte-exact types shared by every verifier on the network —
//! two honest peers assembling the same block at the same height MUST
//! produce identical bytes and therefore identical hashes (§6.2).

pub mod balance;
pub mod block;
pub mod transaction;

pub use balance::{BalanceItem, BalanceSnapshot, CycleTransactionState, InvariantViolation};
pub use block::Block;
pub use transaction::{CycleVoterSignature, Transaction, TransactionType};
