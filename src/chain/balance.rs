//! BalanceSnapshot (C3) — §3.2
//!
//! Sorted account→balance map plus auxiliary state, with a canonical
//! byte serialisation (§6.2) and the invariants every snapshot must
//! satisfy at rest.

use crate::constants::{MAX_PREV_SIGNERS, MAX_ROLLOVER_FEES, TOTAL_SUPPLY};
use crate::crypto::Identifier;
use crate::hash::Hash;
use serde::{Deserialize, Serialize};

/// A single account entry in a [`BalanceSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceItem {
    pub identifier: Identifier,
    /// Always > 0 — zero-balance entries are dropped (§4.2 step 5).
    pub balance: i64,
    pub blocks_until_fee: u16,
}

/// Cycle-transaction bookkeeping carried at version >= 2 (§3.2, §4.2 step 7).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTransactionState {
    pub pending: Vec<Hash>,
    pub recently_approved: Vec<Hash>,
}

/// The post-execution balance state of the chain at a given height (§3.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub blockchain_version: u16,
    pub block_height: u64,
    /// 0..=2 micro-units carried forward.
    pub rollover_fees: u8,
    /// Last up-to-9 distinct signer identifiers, most recent first.
    pub previous_signers: Vec<Identifier>,
    /// Strictly sorted by identifier; no duplicates; no zero balances.
    pub items: Vec<BalanceItem>,
    /// Present from `VERSION_UNLOCK_FIELDS` onward.
    pub unlock_threshold: Option<i64>,
    pub unlock_transfer_sum: Option<i64>,
    /// Present from `VERSION_CYCLE_TRANSACTIONS` onward.
    pub cycle_transactions: Option<CycleTransactionState>,
}

/// Why a [`BalanceSnapshot`] failed its invariant check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("balances ({balances}) + rollover ({rollover}) != TOTAL_SUPPLY ({TOTAL_SUPPLY})")]
    SupplyMismatch { balances: i64, rollover: i64 },
    #[error("items not strictly ascending by identifier at index {index}")]
    NotSorted { index: usize },
    #[error("zero or negative balance at index {index}")]
    NonPositiveBalance { index: usize },
    #[error("too many previous signers: {count} > {MAX_PREV_SIGNERS}")]
    TooManyPreviousSigners { count: usize },
    #[error("duplicate previous signer")]
    DuplicatePreviousSigner,
    #[error("rollover_fees {0} out of range 0..={MAX_ROLLOVER_FEES}")]
    RolloverFeesOutOfRange(u8),
}

impl BalanceSnapshot {
    /// A Genesis snapshot minting the full supply to `genesis_account`.
    pub fn genesis(genesis_account: Identifier) -> Self {
        Self {
            blockchain_version: 0,
            block_height: 0,
            rollover_fees: 0,
            previous_signers: Vec::new(),
            items: vec![BalanceItem {
                identifier: genesis_account,
                balance: TOTAL_SUPPLY,
                blocks_until_fee: crate::constants::ACCOUNT_FEE_PERIOD,
            }],
            unlock_threshold: None,
            unlock_transfer_sum: None,
            cycle_transactions: None,
        }
    }

    pub fn balance_of(&self, identifier: &Identifier) -> i64 {
        self.items
            .iter()
            .find(|item| &item.identifier == identifier)
            .map(|item| item.balance)
            .unwrap_or(0)
    }

    /// Check every invariant in §3.2; returns the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.rollover_fees as u8 > MAX_ROLLOVER_FEES {
            return Err(InvariantViolation::RolloverFeesOutOfRange(self.rollover_fees));
        }
        if self.previous_signers.len() > MAX_PREV_SIGNERS {
            return Err(InvariantViolation::TooManyPreviousSigners {
                count: self.previous_signers.len(),
            });
        }
        {
            let mut seen = std::collections::HashSet::new();
            for signer in &self.previous_signers {
                if !seen.insert(*signer) {
                    return Err(InvariantViolation::DuplicatePreviousSigner);
                }
            }
        }
        let mut total: i64 = 0;
        for (index, item) in self.items.iter().enumerate() {
            if item.balance <= 0 {
                return Err(InvariantViolation::NonPositiveBalance { index });
            }
            if index > 0 && self.items[index - 1].identifier >= item.identifier {
                return Err(InvariantViolation::NotSorted { index });
            }
            total = total
                .checked_add(item.balance)
                .expect("balance sum overflow");
        }
        total += self.rollover_fees as i64;
        if total != TOTAL_SUPPLY {
            return Err(InvariantViolation::SupplyMismatch {
                balances: total - self.rollover_fees as i64,
                rollover: self.rollover_fees as i64,
            });
        }
        Ok(())
    }

    /// Wire-exact canonical bytes (§6.2).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.blockchain_version.to_be_bytes());
        buf.extend_from_slice(&self.block_height.to_be_bytes());
        buf.push(self.rollover_fees);

        buf.extend_from_slice(&(self.previous_signers.len() as u32).to_be_bytes());
        for signer in &self.previous_signers {
            buf.extend_from_slice(&signer.0);
        }

        buf.extend_from_slice(&(self.items.len() as u32).to_be_bytes());
        for item in &self.items {
            buf.extend_from_slice(&item.identifier.0);
            buf.extend_from_slice(&item.balance.to_be_bytes());
            buf.extend_from_slice(&item.blocks_until_fee.to_be_bytes());
        }

        if self.blockchain_version >= crate::constants::VERSION_UNLOCK_FIELDS {
            buf.extend_from_slice(&self.unlock_threshold.unwrap_or(0).to_be_bytes());
            buf.extend_from_slice(&self.unlock_transfer_sum.unwrap_or(0).to_be_bytes());
        }

        if self.blockchain_version >= crate::constants::VERSION_CYCLE_TRANSACTIONS {
            let cycle_state = self.cycle_transactions.clone().unwrap_or_default();
            buf.extend_from_slice(&(cycle_state.pending.len() as u32).to_be_bytes());
            for hash in &cycle_state.pending {
                buf.extend_from_slice(&hash.0);
            }
            buf.extend_from_slice(&(cycle_state.recently_approved.len() as u32).to_be_bytes());
            for hash in &cycle_state.recently_approved {
                buf.extend_from_slice(&hash.0);
            }
        }

        buf
    }

    pub fn hash(&self) -> Hash {
        Hash::of(&self.to_bytes())
    }
}
