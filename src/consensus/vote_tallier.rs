//! VoteTallier (C10) — §4.6
//!
//! `height -> voter_id -> (voted_hash, received_at)`, plus a flip-vote
//! throttle so a voter can change their mind but not thrash. Plain owned
//! maps (single-threaded loop, Design Notes §9).

use crate::consensus::error::{ConflictReason, ConsensusResult, InvalidReason};
use crate::consensus::frozen_chain::FrozenChain;
use crate::crypto::Identifier;
use crate::hash::Hash;
use std::collections::HashMap;

const RETENTION_BLOCKS: u64 = 40;

#[derive(Debug, Clone, Copy)]
struct VoteRecord {
    voted_hash: Hash,
    received_at_ms: i64,
}

#[derive(Debug, Clone, Copy)]
struct FlipState {
    candidate_hash: Hash,
    confirmations: u32,
}

pub struct VoteTallier {
    votes: HashMap<u64, HashMap<Identifier, VoteRecord>>,
    flip_votes: HashMap<(u64, Identifier), FlipState>,
    flip_confirmations: u32,
    flip_min_age_ms: i64,
}

impl VoteTallier {
    pub fn new(flip_confirmations: u32, flip_min_age_ms: i64) -> Self {
        Self {
            votes: HashMap::new(),
            flip_votes: HashMap::new(),
            flip_confirmations,
            flip_min_age_ms,
        }
    }

    /// Register a single vote (§4.6). `open_edge_height` is the caller's
    /// current `frozen_edge + lookahead`.
    pub fn register_vote(
        &mut self,
        height: u64,
        voter_id: Identifier,
        voted_hash: Hash,
        message_timestamp: i64,
        frozen: &FrozenChain,
        open_edge_height: u64,
    ) -> ConsensusResult<()> {
        if !frozen.is_genesis_cycle() && !frozen.cycle_contains(&voter_id) {
            return Err(InvalidReason::VoterNotInCycle.into());
        }
        if height <= frozen.frozen_edge_height() || height > open_edge_height {
            return Err(InvalidReason::HeightOutOfRange.into());
        }

        let height_map = self.votes.entry(height).or_default();
        match height_map.get(&voter_id).copied() {
            None => {
                height_map.insert(
                    voter_id,
                    VoteRecord {
                        voted_hash,
                        received_at_ms: message_timestamp,
                    },
                );
                Ok(())
            }
            Some(existing) if existing.voted_hash == voted_hash => Ok(()),
            Some(existing) => {
                let key = (height, voter_id);
                let flip = self.flip_votes.entry(key).or_insert(FlipState {
                    candidate_hash: voted_hash,
                    confirmations: 0,
                });
                if flip.candidate_hash != voted_hash {
                    flip.candidate_hash = voted_hash;
                    flip.confirmations = 1;
                } else {
                    flip.confirmations += 1;
                }

                let age = message_timestamp - existing.received_at_ms;
                if flip.confirmations >= self.flip_confirmations && age >= self.flip_min_age_ms {
                    self.votes.get_mut(&height).unwrap().insert(
                        voter_id,
                        VoteRecord {
                            voted_hash,
                            received_at_ms: message_timestamp,
                        },
                    );
                    self.flip_votes.remove(&key);
                    Ok(())
                } else {
                    Err(ConflictReason::VoteFlipThrottled {
                        needed: self.flip_confirmations,
                        have: flip.confirmations,
                    }
                    .into())
                }
            }
        }
    }

    /// `(leading_hash, count)` among voters in the current cycle; ties
    /// break by lexicographically smallest hash.
    pub fn leading_hash(&self, height: u64, frozen: &FrozenChain) -> (Option<Hash>, usize) {
        let Some(height_map) = self.votes.get(&height) else {
            return (None, 0);
        };

        let mut counts: HashMap<Hash, usize> = HashMap::new();
        for (voter_id, record) in height_map {
            if frozen.is_genesis_cycle() || frozen.cycle_contains(voter_id) {
                *counts.entry(record.voted_hash).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(hash, count)| (Some(hash), count))
            .unwrap_or((None, 0))
    }

    pub fn prune(&mut self, new_frozen_height: u64) {
        let cutoff = new_frozen_height.saturating_sub(RETENTION_BLOCKS);
        self.votes.retain(|height, _| *height > cutoff);
        self.flip_votes.retain(|(height, _), _| *height > cutoff);
    }
}
