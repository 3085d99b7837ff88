//! Protocol constants (§6.4)
//!
//! Mirrors the shape of the teacher's `consensus::v1::types::constants`
//! module: a flat table of `pub const`s consumed throughout the crate
//! instead of scattered magic numbers.

/// Total supply, in micro-units (100,000,000 units).
pub const TOTAL_SUPPLY: i64 = 100_000_000 * 1_000_000;

/// Smallest accounting denomination per unit.
pub const MICRO_UNITS_PER_UNIT: i64 = 1_000_000;

/// Target time between block heights, in milliseconds.
pub const BLOCK_DURATION_MS: i64 = 7_000;

/// Minimum "preferred" balance for the anti-dust filter (10 units).
pub const MIN_PREFERRED_BALANCE: i64 = 10 * MICRO_UNITS_PER_UNIT;

/// Maximum number of distinct signers carried in `previous_signers`.
pub const MAX_PREV_SIGNERS: usize = 9;

/// How many blocks of vote/candidate history to retain behind the frozen edge.
pub const VOTE_RETENTION_BLOCKS: u64 = 40;

/// Per-height cap on unfrozen candidates outside the Genesis cycle.
pub const MAX_UNFROZEN_PER_HEIGHT: usize = 10;

/// Rollover fees are always in this range.
pub const MAX_ROLLOVER_FEES: u8 = 2;

/// Account-maintenance fee period, in blocks (§4.2 step 3).
pub const ACCOUNT_FEE_PERIOD: u16 = 500;

/// Account-maintenance fee threshold, in micro-units (10 units).
pub const FEE_THRESHOLD: i64 = 10 * MICRO_UNITS_PER_UNIT;

/// Number of consecutive flip votes required before a vote change is honoured.
pub const FLIP_CONFIRMATIONS: u32 = 2;

/// Minimum age (ms) of the prior vote before a flip may be honoured.
pub const FLIP_MIN_AGE_MS: i64 = 2 * BLOCK_DURATION_MS;

/// Default maximum transactions admitted per block (version-dependent in
/// principle; this is the v0 default used when no override is configured).
pub const MAX_TX_PER_BLOCK: usize = 1000;

/// Height below which `Seed` transactions remain valid.
pub const SEED_TRANSACTION_CUTOFF_HEIGHT: u64 = 500_000;

/// Blockchain version at which `unlock_threshold`/`unlock_transfer_sum`
/// fields appear in `BalanceSnapshot` (§3.2).
pub const VERSION_UNLOCK_FIELDS: u16 = 1;

/// Blockchain version at which cycle-transaction bookkeeping fields appear.
pub const VERSION_CYCLE_TRANSACTIONS: u16 = 2;

/// Chain-score bonus subtracted for a `Continuous` cycle-tracker verdict
/// (lower score is better; see Open Question in §9 / SPEC_FULL.md §D).
pub const CHAIN_SCORE_CONTINUITY_BONUS: i64 = BLOCK_DURATION_MS;

/// Chain-score penalty added per missing-parent lineage hop.
pub const CHAIN_SCORE_LINEAGE_PENALTY: i64 = BLOCK_DURATION_MS / 2;

/// Genesis previous-block-hash sentinel (all-zero).
pub const GENESIS_PREVIOUS_HASH: [u8; 32] = [0u8; 32];
