//! `ConsensusConfig` — ambient configuration
//!
//! Modelled directly on the teacher's `consensus::v1::types::ConsensusConfig`:
//! a `Default`-impl struct of durations and thresholds that parameterises
//! behaviour the spec otherwise fixes as constants, so a caller can tune
//! (e.g.) the open-edge lookahead without touching the core algorithms.

use crate::constants;
use std::time::Duration;

/// Tunable parameters for the consensus engine. Defaults reproduce the
/// values §4, §5 and §6.4 fix directly.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// Blockchain version new blocks are produced/validated against.
    pub blockchain_version: u16,

    /// Unix ms timestamp of height 0's `start_timestamp`.
    pub genesis_start_timestamp: i64,

    /// Target time between block heights.
    pub block_duration: Duration,

    /// How far past `start_timestamp` a `verification_timestamp` may land.
    pub open_edge_slack: Duration,

    /// `ConsensusLoop` iteration period (§4.7: "default 300 ms").
    pub loop_interval: Duration,

    /// Delay after `start_timestamp(height)` before the local signer
    /// attempts to produce a block (§4.7 step 1).
    pub production_delay: Duration,

    /// Consecutive flip-votes required before a vote change is honoured.
    pub flip_confirmations: u32,

    /// Minimum age of the prior vote before a flip may be honoured.
    pub flip_min_age: Duration,

    /// Per-height cap on unfrozen candidates outside the Genesis cycle.
    pub max_unfrozen_per_height: usize,

    /// How many blocks behind the frozen edge vote/candidate history is kept.
    pub vote_retention_blocks: u64,

    /// Maximum transactions admitted per block.
    pub max_tx_per_block: usize,

    /// Height below which `Seed` transactions remain valid.
    pub seed_transaction_cutoff_height: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            blockchain_version: 2,
            genesis_start_timestamp: 0,
            block_duration: Duration::from_millis(constants::BLOCK_DURATION_MS as u64),
            open_edge_slack: Duration::from_millis(constants::BLOCK_DURATION_MS as u64),
            loop_interval: Duration::from_millis(300),
            production_delay: Duration::from_millis(0),
            flip_confirmations: constants::FLIP_CONFIRMATIONS,
            flip_min_age: Duration::from_millis(constants::FLIP_MIN_AGE_MS as u64),
            max_unfrozen_per_height: constants::MAX_UNFROZEN_PER_HEIGHT,
            vote_retention_blocks: constants::VOTE_RETENTION_BLOCKS,
            max_tx_per_block: constants::MAX_TX_PER_BLOCK,
            seed_transaction_cutoff_height: constants::SEED_TRANSACTION_CUTOFF_HEIGHT,
        }
    }
}

impl ConsensusConfig {
    pub fn start_timestamp(&self, height: u64) -> i64 {
        self.genesis_start_timestamp + (height as i64) * self.block_duration.as_millis() as i64
    }

    /// Supermajority threshold for a committee of the given size (§6.4:
    /// `FREEZE_THRESHOLD = ceil(3 * |cycle| / 4) + 1`).
    pub fn freeze_threshold(&self, cycle_size: usize) -> usize {
        let numerator = cycle_size * 3;
        (numerator + 3) / 4 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let config = ConsensusConfig::default();
        assert_eq!(config.block_duration, Duration::from_millis(7000));
        assert_eq!(config.flip_confirmations, 2);
        assert_eq!(config.flip_min_age, Duration::from_millis(14_000));
    }

    #[test]
    fn freeze_threshold_matches_scenario_5() {
        let config = ConsensusConfig::default();
        // Cycle of 7 signers: ceil(21/4) + 1 = 7.
        assert_eq!(config.freeze_threshold(7), 7);
    }

    #[test]
    fn start_timestamp_advances_by_block_duration() {
        let config = ConsensusConfig::default();
        assert_eq!(config.start_timestamp(0), 0);
        assert_eq!(config.start_timestamp(1), 7000);
    }
}
