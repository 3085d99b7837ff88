//! TxAdmission (C7) — §4.3
//!
//! Deterministic filter: `(candidate_txs, parent state) → approved_txs`.
//! Pure function over owned inputs, following the staged-pipeline shape
//! of the teacher's `consensus::transaction_selector` (normalise, filter,
//! simulate, cap) rather than the exception-driven per-tx rejection the
//! Design Notes call out for replacement. Signature verification (step 5)
//! is memoised through a caller-supplied [`ValidationCache`], since the
//! consensus loop re-admits an overlapping mempool every iteration.

use crate::chain::balance::BalanceSnapshot;
use crate::chain::transaction::{Transaction, TransactionType};
use crate::consensus::cache::ValidationCache;
use crate::constants::{MAX_TX_PER_BLOCK, MIN_PREFERRED_BALANCE};
use crate::crypto::{Identifier, SignatureScheme};
use crate::hash::Hash;
use std::collections::{HashMap, HashSet};

/// Everything admission needs to know about the frozen chain and the
/// block being assembled, beyond the parent snapshot itself.
pub struct AdmissionContext<'a> {
    pub height: u64,
    pub version: u16,
    pub start_timestamp: i64,
    pub block_duration_ms: i64,
    pub seed_transaction_cutoff_height: u64,
    pub max_tx_per_block: usize,
    /// `(height, hash)` pairs accepted as valid `previous_hash_height` bindings.
    pub known_hash_at_height: &'a dyn Fn(u64) -> Option<crate::hash::Hash>,
    pub signature_scheme: &'a dyn SignatureScheme,
    /// Memoises `tx.hash() -> signature valid` across repeated admission
    /// passes over the same mempool; keyed on the transaction's full wire
    /// hash, which already covers the signature bytes, so a cache hit is a
    /// hit against the exact signed transaction, never a stale one.
    pub signature_cache: &'a ValidationCache<Hash, bool>,
}

/// Select the approved subset of `candidates` for inclusion at `ctx.height`
/// against `parent_snapshot` (§4.3 steps 1–9).
pub fn admit(
    candidates: &[Transaction],
    parent_snapshot: &BalanceSnapshot,
    ctx: &AdmissionContext<'_>,
) -> Vec<Transaction> {
    // Step 1: normalise — sort by (timestamp, signature), dedupe by bytes.
    let mut sorted: Vec<Transaction> = candidates.to_vec();
    sorted.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.signature.map(|s| s.0).cmp(&b.signature.map(|s| s.0)))
    });
    let mut seen_bytes = HashSet::new();
    sorted.retain(|tx| seen_bytes.insert(tx.to_bytes()));

    let window_start = ctx.start_timestamp;
    let window_end = ctx.start_timestamp + ctx.block_duration_ms;

    let mut filtered = Vec::with_capacity(sorted.len());
    for tx in sorted {
        // Step 2: time window.
        if tx.timestamp < window_start || tx.timestamp >= window_end {
            continue;
        }

        // Step 3: type filter.
        let type_allowed = match tx.transaction_type {
            TransactionType::CoinGeneration => ctx.height == 0,
            TransactionType::Seed => ctx.height < ctx.seed_transaction_cutoff_height,
            TransactionType::Cycle | TransactionType::CycleSignature => ctx.version >= 2,
            TransactionType::Standard => true,
        };
        if !type_allowed {
            continue;
        }

        if !tx.is_statically_valid() {
            continue;
        }

        // Step 4: previous-hash binding.
        match (ctx.known_hash_at_height)(tx.previous_hash_height) {
            Some(expected) if expected == tx.previous_block_hash => {}
            _ => continue,
        }

        // Step 5: signature.
        if tx.transaction_type != TransactionType::CoinGeneration {
            let Some(signature) = tx.signature else { continue };
            let Some(sender) = tx.sender_id else { continue };
            let tx_hash = tx.hash();
            let valid = match ctx.signature_cache.get(&tx_hash) {
                Some(cached) => cached,
                None => {
                    let verified = ctx.signature_scheme.verify(&signature, &tx.signing_body(), &sender);
                    ctx.signature_cache.insert(tx_hash, verified);
                    verified
                }
            };
            if !valid {
                continue;
            }
        }

        filtered.push(tx);
    }

    // Step 7: sequential balance simulation.
    let mut working: HashMap<Identifier, i64> = parent_snapshot
        .items
        .iter()
        .map(|item| (item.identifier, item.balance))
        .collect();
    let mut provisional = Vec::with_capacity(filtered.len());
    for tx in filtered {
        if tx.transaction_type == TransactionType::CoinGeneration
            || tx.transaction_type.is_cycle_typed()
        {
            provisional.push(tx);
            continue;
        }
        let Some(sender) = tx.sender_id else { continue };
        let sender_balance = working.get(&sender).copied().unwrap_or(0);
        if sender_balance < tx.amount {
            continue;
        }
        *working.entry(sender).or_insert(0) -= tx.amount;
        *working.entry(tx.receiver_id).or_insert(0) += tx.amount - tx.fee();
        provisional.push(tx);
    }

    // Step 8: anti-dust filter.
    let existing_accounts: HashSet<Identifier> =
        parent_snapshot.items.iter().map(|item| item.identifier).collect();
    let approved: Vec<Transaction> = provisional
        .into_iter()
        .filter(|tx| {
            if tx.transaction_type == TransactionType::CoinGeneration
                || tx.transaction_type.is_cycle_typed()
            {
                return true;
            }
            let Some(sender) = tx.sender_id else { return false };

            let receiver_is_new = !existing_accounts.contains(&tx.receiver_id);
            if receiver_is_new && tx.amount > 1 && tx.amount < MIN_PREFERRED_BALANCE {
                return false;
            }

            let sender_remaining = working.get(&sender).copied().unwrap_or(0);
            if sender_remaining > 0 && sender_remaining < MIN_PREFERRED_BALANCE {
                return false;
            }

            true
        })
        .collect();

    // Step 9: capacity cap, priority sort, restore timestamp order.
    let cap = ctx.max_tx_per_block.min(MAX_TX_PER_BLOCK);
    if approved.len() <= cap {
        return approved;
    }

    let mut by_priority = approved;
    by_priority.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| type_priority(b.transaction_type).cmp(&type_priority(a.transaction_type)))
            .then_with(|| a.signature.map(|s| s.0).cmp(&b.signature.map(|s| s.0)))
    });
    by_priority.truncate(cap);
    by_priority.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.signature.map(|s| s.0).cmp(&b.signature.map(|s| s.0)))
    });
    by_priority
}

fn type_priority(transaction_type: TransactionType) -> u8 {
    match transaction_type {
        TransactionType::CoinGeneration => 4,
        TransactionType::Cycle | TransactionType::CycleSignature => 3,
        TransactionType::Seed => 2,
        TransactionType::Standard => 1,
    }
}
