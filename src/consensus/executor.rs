//! BlockExecutor (C6) — §4.2
//!
//! `(parent_snapshot, transactions, signer_id, version) → next_snapshot`.
//! Pure function, no I/O, mirroring the teacher's
//! `consensus::validator::apply_block` shape: a straight-line pipeline
//! over an owned map, returning a fatal error only on an internal
//! invariant violation (transactions have already passed admission).

use crate::chain::balance::{BalanceItem, BalanceSnapshot, CycleTransactionState};
use crate::chain::transaction::{Transaction, TransactionType};
use crate::constants::{self, ACCOUNT_FEE_PERIOD, FEE_THRESHOLD, MAX_PREV_SIGNERS, TOTAL_SUPPLY};
use crate::consensus::error::FatalError;
use crate::crypto::Identifier;
use std::collections::HashMap;

/// Unlock-account schedule used by step 6 (version ≥ 1). The threshold
/// grows linearly with height; accounts in `locked_accounts` are the only
/// ones whose outbound transfers count against it.
#[derive(Debug, Clone)]
pub struct UnlockSchedule {
    pub locked_accounts: Vec<Identifier>,
    pub base_threshold: i64,
    pub growth_per_block: i64,
}

impl UnlockSchedule {
    pub fn threshold_at(&self, height: u64) -> i64 {
        self.base_threshold + self.growth_per_block * height as i64
    }

    pub fn is_locked(&self, identifier: &Identifier) -> bool {
        self.locked_accounts.contains(identifier)
    }
}

impl Default for UnlockSchedule {
    fn default() -> Self {
        Self {
            locked_accounts: Vec::new(),
            base_threshold: 0,
            growth_per_block: 0,
        }
    }
}

/// Executes one block's transactions against a parent snapshot,
/// producing the next snapshot (§4.2 steps 1–8).
pub fn execute(
    parent_snapshot: &BalanceSnapshot,
    transactions: &[Transaction],
    signer_id: Identifier,
    version: u16,
    unlock_schedule: &UnlockSchedule,
    cycle_supermajority: usize,
) -> Result<BalanceSnapshot, FatalError> {
    let next_height = parent_snapshot.block_height + 1;

    // Step 1: load balances.
    let mut balances: HashMap<Identifier, (i64, u16)> = parent_snapshot
        .items
        .iter()
        .map(|item| (item.identifier, (item.balance, item.blocks_until_fee)))
        .collect();
    let mut total_fees: i64 = parent_snapshot.rollover_fees as i64;

    // The synthetic cycle account's balance is TOTAL_SUPPLY - Σ items -
    // rollover_fees, which the supply invariant holds at exactly zero at
    // rest. Cycle-typed transactions are therefore treated as carrying no
    // value below (see Step 2).
    let mut unlock_transfer_sum = parent_snapshot.unlock_transfer_sum.unwrap_or(0);
    let mut cycle_state = parent_snapshot.cycle_transactions.clone().unwrap_or_default();

    // Step 2: apply transactions in the given (already-sorted) order.
    for tx in transactions {
        if tx.transaction_type.is_cycle_typed() {
            record_cycle_signature(&mut cycle_state, tx);
            continue;
        }

        let fee = tx.fee();
        match tx.transaction_type {
            TransactionType::CoinGeneration => {
                let entry = balances
                    .entry(tx.receiver_id)
                    .or_insert((0, ACCOUNT_FEE_PERIOD));
                entry.0 = entry
                    .0
                    .checked_add(tx.amount)
                    .ok_or_else(|| FatalError::SupplyInvariantViolated("coin generation overflow".into()))?;
            }
            TransactionType::Standard | TransactionType::Seed => {
                let sender_id = tx
                    .sender_id
                    .ok_or_else(|| FatalError::SupplyInvariantViolated("missing sender".into()))?;
                let sender_entry = balances.entry(sender_id).or_insert((0, ACCOUNT_FEE_PERIOD));
                sender_entry.0 -= tx.amount;

                if unlock_schedule.is_locked(&sender_id) {
                    unlock_transfer_sum += tx.amount;
                }

                let receiver_entry = balances
                    .entry(tx.receiver_id)
                    .or_insert((0, ACCOUNT_FEE_PERIOD));
                receiver_entry.0 += tx.amount - fee;
                total_fees += fee;
            }
            TransactionType::Cycle | TransactionType::CycleSignature => unreachable!("handled above"),
        }
    }

    if version >= constants::VERSION_UNLOCK_FIELDS {
        let threshold = unlock_schedule.threshold_at(next_height);
        if unlock_transfer_sum > threshold {
            return Err(FatalError::SupplyInvariantViolated(format!(
                "unlock_transfer_sum {unlock_transfer_sum} exceeds threshold {threshold} at height {next_height}"
            )));
        }
    }

    // Step 3: periodic account-maintenance fee, carried-over accounts only.
    let carried_over: Vec<Identifier> = parent_snapshot.items.iter().map(|i| i.identifier).collect();
    for identifier in carried_over {
        if let Some(entry) = balances.get_mut(&identifier) {
            entry.1 = entry.1.saturating_sub(1);
            if entry.1 == 0 {
                if entry.0 < FEE_THRESHOLD {
                    entry.0 -= 1;
                    total_fees += 1;
                }
                entry.1 = ACCOUNT_FEE_PERIOD;
            }
        }
    }

    // Step 4: distribute total_fees across up to 9 most recent distinct signers.
    let mut previous_signers: Vec<Identifier> = vec![signer_id];
    for prior in &parent_snapshot.previous_signers {
        if !previous_signers.contains(prior) {
            previous_signers.push(*prior);
        }
    }
    previous_signers.truncate(MAX_PREV_SIGNERS);

    // `previous_signers` always holds at least `signer_id`, so every unit of
    // `total_fees` is distributed here: the first `remainder` signers (in
    // most-recent-first order) get one extra micro-unit each, so nothing is
    // lost to integer division regardless of how many distinct signers are
    // owed a share.
    let rollover_fees = {
        let n = previous_signers.len() as i64;
        let share = total_fees / n;
        let remainder = total_fees - share * n;
        for (index, signer) in previous_signers.iter().enumerate() {
            let entry = balances.entry(*signer).or_insert((0, ACCOUNT_FEE_PERIOD));
            entry.0 += share + if (index as i64) < remainder { 1 } else { 0 };
        }
        0u8
    };

    // Step 7: promote pending cycle txs whose signature set reached supermajority.
    if version >= constants::VERSION_CYCLE_TRANSACTIONS {
        promote_cycle_transactions(&mut cycle_state, transactions, cycle_supermajority);
    }

    // Step 5: rebuild items, dropping zero/negative balances (negative is fatal).
    let mut items = Vec::with_capacity(balances.len());
    for (identifier, (balance, blocks_until_fee)) in balances {
        if balance < 0 {
            return Err(FatalError::SupplyInvariantViolated(format!(
                "negative balance for {identifier} after executing height {next_height}"
            )));
        }
        if balance == 0 {
            continue;
        }
        items.push(BalanceItem {
            identifier,
            balance,
            blocks_until_fee,
        });
    }
    items.sort_by_key(|item| item.identifier);

    let next_snapshot = BalanceSnapshot {
        blockchain_version: version,
        block_height: next_height,
        rollover_fees,
        previous_signers,
        items,
        unlock_threshold: if version >= constants::VERSION_UNLOCK_FIELDS {
            Some(unlock_schedule.threshold_at(next_height))
        } else {
            None
        },
        unlock_transfer_sum: if version >= constants::VERSION_UNLOCK_FIELDS {
            Some(unlock_transfer_sum)
        } else {
            None
        },
        cycle_transactions: if version >= constants::VERSION_CYCLE_TRANSACTIONS {
            Some(cycle_state)
        } else {
            None
        },
    };

    // Step 8: supply check.
    next_snapshot
        .check_invariants()
        .map_err(|violation| FatalError::SupplyInvariantViolated(violation.to_string()))?;

    Ok(next_snapshot)
}

fn record_cycle_signature(state: &mut CycleTransactionState, tx: &Transaction) {
    let hash = tx.hash();
    if !state.pending.contains(&hash) && !state.recently_approved.contains(&hash) {
        state.pending.push(hash);
    }
}

fn promote_cycle_transactions(
    state: &mut CycleTransactionState,
    transactions: &[Transaction],
    cycle_supermajority: usize,
) {
    let mut signature_counts: HashMap<crate::hash::Hash, usize> = HashMap::new();
    for tx in transactions {
        if tx.transaction_type.is_cycle_typed() {
            *signature_counts.entry(tx.hash()).or_insert(0) += tx.cycle_voter_signatures.len();
        }
    }

    let mut still_pending = Vec::new();
    for hash in state.pending.drain(..) {
        let count = signature_counts.get(&hash).copied().unwrap_or(0);
        if count >= cycle_supermajority {
            state.recently_approved.push(hash);
        } else {
            still_pending.push(hash);
        }
    }
    state.pending = still_pending;

    const RETENTION: usize = 40;
    if state.recently_approved.len() > RETENTION {
        let excess = state.recently_approved.len() - RETENTION;
        state.recently_approved.drain(0..excess);
    }
}
