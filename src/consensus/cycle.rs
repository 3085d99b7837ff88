//! CycleTracker (C5) — §3.4, §4.1
//!
//! An incrementally maintained summary of recent signers. Each update is
//! a pure derivation from the parent tracker's identifier buffer and the
//! next block's signer id — no back-references into the block chain, no
//! I/O, matching Design Notes §9's replacement for the source's "cyclic
//! back-to-previous-block traversal".

use crate::crypto::Identifier;
use std::collections::HashSet;

/// Verdict on whether a candidate block satisfies the Proof-of-Diversity
/// rules (new-signer spacing and cycle-shrinkage bound).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    Undetermined,
    Continuous,
    Discontinuous,
}

/// Whether an identifier's appearance at a given position is the first
/// time it has joined the committee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewVerifierState {
    Undetermined,
    NewVerifier,
    ExistingVerifier,
}

/// Rolling summary of recent signers (§3.4).
#[derive(Debug, Clone)]
pub struct CycleTracker {
    identifiers: Vec<Identifier>,
    cycle_start_indices: [usize; 4],
    cycle_lengths: [u32; 4],
    continuity: Continuity,
    complete: bool,
    new_verifier_states: Vec<NewVerifierState>,
}

impl CycleTracker {
    /// The tracker for an empty chain (no blocks yet).
    pub fn empty() -> Self {
        Self {
            identifiers: Vec::new(),
            cycle_start_indices: [0; 4],
            cycle_lengths: [0; 4],
            continuity: Continuity::Undetermined,
            complete: false,
            new_verifier_states: Vec::new(),
        }
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    pub fn cycle_lengths(&self) -> [u32; 4] {
        self.cycle_lengths
    }

    pub fn cycle_start_indices(&self) -> [usize; 4] {
        self.cycle_start_indices
    }

    pub fn continuity(&self) -> Continuity {
        self.continuity
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Current signer committee: the distinct identifiers making up the
    /// most recently closed (cycle 0) span, or the whole buffer if no
    /// cycle has closed yet.
    pub fn current_cycle(&self) -> Vec<Identifier> {
        if self.identifiers.is_empty() {
            return Vec::new();
        }
        let start = if self.complete {
            self.cycle_start_indices[0]
        } else {
            0
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for id in &self.identifiers[start.min(self.identifiers.len())..] {
            if seen.insert(*id) {
                out.push(*id);
            }
        }
        out
    }

    /// Derive the next tracker given this (parent) tracker and the next
    /// block's signer id (§4.1 steps 1–7).
    pub fn derive_next(&self, signer_id: Identifier) -> CycleTracker {
        let mut ids = self.identifiers.clone();
        ids.push(signer_id);
        let n = ids.len();

        // Step 2: walk backwards, closing cycles at each repeat.
        let mut seen: HashSet<Identifier> = HashSet::new();
        let mut closings: Vec<usize> = Vec::new();
        let mut idx: isize = n as isize - 1;
        let mut reached_genesis = false;
        while closings.len() < 4 {
            if idx < 0 {
                reached_genesis = true;
                break;
            }
            let id = ids[idx as usize];
            if seen.contains(&id) {
                closings.push(idx as usize);
                seen.clear();
                seen.insert(id);
                if closings.len() == 4 {
                    break;
                }
            } else {
                seen.insert(id);
            }
            idx -= 1;
        }

        // Step 3: completeness.
        let complete = closings.len() == 4 || reached_genesis;

        // Step 4: cycle lengths / start indices.
        let mut cycle_start_indices = [0usize; 4];
        let mut cycle_lengths = [0u32; 4];
        let mut prev_boundary = n;
        for i in 0..4 {
            let start = closings.get(i).copied().unwrap_or(0);
            cycle_lengths[i] = (prev_boundary - start) as u32;
            cycle_start_indices[i] = start;
            prev_boundary = start;
        }

        // Step 5: trim, keeping one leading slot beyond the oldest boundary.
        let trim_start = cycle_start_indices[3].saturating_sub(1);
        let trimmed_ids: Vec<Identifier> = ids[trim_start..].to_vec();
        let shifted_start_indices = [
            cycle_start_indices[0] - trim_start,
            cycle_start_indices[1] - trim_start,
            cycle_start_indices[2] - trim_start,
            cycle_start_indices[3] - trim_start,
        ];

        // Step 6: forward pass for new-verifier states.
        let determined_from = if closings.len() == 4 {
            shifted_start_indices[3]
        } else {
            0
        };
        let mut new_verifier_states = vec![NewVerifierState::Undetermined; trimmed_ids.len()];
        let mut forward_seen: HashSet<Identifier> = HashSet::new();
        for (i, id) in trimmed_ids.iter().enumerate() {
            if i < determined_from {
                continue;
            }
            new_verifier_states[i] = if forward_seen.insert(*id) {
                NewVerifierState::NewVerifier
            } else {
                NewVerifierState::ExistingVerifier
            };
        }

        // Step 7: continuity verdict.
        let continuity = if !complete {
            Continuity::Undetermined
        } else {
            let tip_index = trimmed_ids.len() - 1;
            let tip_is_new = matches!(new_verifier_states[tip_index], NewVerifierState::NewVerifier);

            let rule_a = if !tip_is_new {
                true
            } else {
                let span = (cycle_lengths[0] as usize).saturating_sub(1);
                let lower = tip_index.saturating_sub(span);
                !new_verifier_states[lower..tip_index]
                    .iter()
                    .any(|s| matches!(s, NewVerifierState::NewVerifier))
            };

            let max_other = cycle_lengths[1..4].iter().copied().max().unwrap_or(0);
            let bound = ((max_other as f64) * 0.5).ceil() as u32 + 1;
            let rule_b = cycle_lengths[0] >= bound;

            if rule_a && rule_b {
                Continuity::Continuous
            } else {
                Continuity::Discontinuous
            }
        };

        CycleTracker {
            identifiers: trimmed_ids,
            cycle_start_indices: shifted_start_indices,
            cycle_lengths,
            continuity,
            complete,
            new_verifier_states,
        }
    }
}

impl Default for CycleTracker {
    fn default() -> Self {
        Self::empty()
    }
}
