//! `ConsensusMetrics` — ambient observability
//!
//! Wraps a `prometheus::Registry` the way the teacher's
//! `consensus/validator.rs` and `consensus/voting.rs` consume a shared
//! `Arc<ConsensusMetrics>` across components, even though the teacher's
//! own `metrics.rs` was not retrieved into this pack — the call sites
//! (`increment_validation_failures`, `observe_block_validation`, ...)
//! fully determine the shape a drop-in replacement needs.

use prometheus::{Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry};

pub struct ConsensusMetrics {
    pub blocks_frozen: Counter,
    pub blocks_rejected: CounterVec,
    pub votes_registered: Counter,
    pub votes_rejected: CounterVec,
    pub executor_fatals: Counter,
    pub freeze_latency_ms: Histogram,
}

impl ConsensusMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let blocks_frozen = Counter::with_opts(Opts::new(
            "verifier_blocks_frozen_total",
            "Total blocks moved from the unfrozen store into the frozen chain",
        ))?;
        let blocks_rejected = CounterVec::new(
            Opts::new("verifier_blocks_rejected_total", "Blocks rejected during registration"),
            &["reason"],
        )?;
        let votes_registered = Counter::with_opts(Opts::new(
            "verifier_votes_registered_total",
            "Total votes accepted by the vote tallier",
        ))?;
        let votes_rejected = CounterVec::new(
            Opts::new("verifier_votes_rejected_total", "Votes rejected by the vote tallier"),
            &["reason"],
        )?;
        let executor_fatals = Counter::with_opts(Opts::new(
            "verifier_executor_fatals_total",
            "Fatal errors raised by the block executor",
        ))?;
        let freeze_latency_ms = Histogram::with_opts(HistogramOpts::new(
            "verifier_freeze_latency_ms",
            "Wall-clock time spent inside a single freeze_block call",
        ))?;

        registry.register(Box::new(blocks_frozen.clone()))?;
        registry.register(Box::new(blocks_rejected.clone()))?;
        registry.register(Box::new(votes_registered.clone()))?;
        registry.register(Box::new(votes_rejected.clone()))?;
        registry.register(Box::new(executor_fatals.clone()))?;
        registry.register(Box::new(freeze_latency_ms.clone()))?;

        Ok(Self {
            blocks_frozen,
            blocks_rejected,
            votes_registered,
            votes_rejected,
            executor_fatals,
            freeze_latency_ms,
        })
    }

    pub fn record_block_rejected(&self, reason: &str) {
        self.blocks_rejected.with_label_values(&[reason]).inc();
    }

    pub fn record_vote_rejected(&self, reason: &str) {
        self.votes_rejected.with_label_values(&[reason]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_collision() {
        let registry = Registry::new();
        let metrics = ConsensusMetrics::new(&registry).expect("registers");
        metrics.blocks_frozen.inc();
        metrics.record_block_rejected("bad_signature");
        assert_eq!(metrics.blocks_frozen.get(), 1.0);
    }
}
