//! UnfrozenStore (C9) — §4.5
//!
//! `height -> (hash -> Block)` for every candidate above the frozen edge.
//! Plain owned maps suffice (Design Notes §9: "Concurrent maps used for
//! vote storage... because the loop is single-threaded, plain owned maps
//! suffice"); bounded per-height retention keeps memory flat under churn.

use crate::chain::block::Block;
use crate::consensus::error::{ConsensusResult, InvalidReason};
use crate::consensus::executor::{self, UnlockSchedule};
use crate::consensus::frozen_chain::FrozenChain;
use crate::crypto::SignatureScheme;
use crate::hash::Hash;
use std::collections::HashMap;

pub struct UnfrozenStore {
    candidates: HashMap<u64, HashMap<Hash, Block>>,
    max_per_height: usize,
    max_lookahead: u64,
}

impl UnfrozenStore {
    pub fn new(max_per_height: usize, max_lookahead: u64) -> Self {
        Self {
            candidates: HashMap::new(),
            max_per_height,
            max_lookahead,
        }
    }

    /// Register a candidate block (§4.5 steps 1–5).
    ///
    /// `score_fn` ranks candidates for eviction (lower is better, per the
    /// `chain_score` convention owned by `ConsensusLoop` — C9 never
    /// computes continuity/lineage scoring itself).
    pub async fn register(
        &mut self,
        block: Block,
        frozen: &FrozenChain,
        signature_scheme: &dyn SignatureScheme,
        vote_leader: Option<Hash>,
        score_fn: &dyn Fn(&Block) -> i64,
    ) -> ConsensusResult<()> {
        if block.height <= frozen.frozen_edge_height()
            || block.height > frozen.frozen_edge_height() + self.max_lookahead
        {
            return Err(InvalidReason::HeightOutOfRange.into());
        }

        if !signature_scheme.verify(&block.signer_signature, &block.signing_body(), &block.signer_id) {
            return Err(InvalidReason::Signature.into());
        }

        let hash = block.hash();
        if self
            .candidates
            .get(&block.height)
            .is_some_and(|m| m.contains_key(&hash))
        {
            return Ok(());
        }

        let snapshot = self
            .compute_snapshot(&block, frozen)
            .await
            .ok_or(InvalidReason::PreviousHash)?;
        if snapshot.hash() != block.balance_list_hash {
            return Err(InvalidReason::PreviousHash.into());
        }

        self.candidates
            .entry(block.height)
            .or_default()
            .insert(hash, block.clone());

        if !frozen.is_genesis_cycle() {
            self.enforce_retention(block.height, vote_leader, score_fn);
        }

        Ok(())
    }

    pub fn lookup(&self, height: u64, hash: &Hash) -> Option<&Block> {
        self.candidates.get(&height)?.get(hash)
    }

    pub fn candidates_at(&self, height: u64) -> Vec<&Block> {
        self.candidates
            .get(&height)
            .map(|m| m.values().collect())
            .unwrap_or_default()
    }

    pub fn prune(&mut self, new_frozen_height: u64) {
        self.candidates.retain(|height, _| *height > new_frozen_height);
    }

    /// Ancestors from just above the frozen edge through `block`, ascending
    /// by height. `None` if any intermediate candidate is missing.
    pub fn ancestor_chain(&self, block: &Block, frozen: &FrozenChain) -> Option<Vec<Block>> {
        self.collect_chain(block, frozen)
    }

    fn enforce_retention(&mut self, height: u64, vote_leader: Option<Hash>, score_fn: &dyn Fn(&Block) -> i64) {
        let Some(map) = self.candidates.get_mut(&height) else { return };
        while map.len() > self.max_per_height {
            let worst = map
                .iter()
                .filter(|(hash, _)| Some(**hash) != vote_leader)
                .max_by_key(|(_, block)| score_fn(block))
                .map(|(hash, _)| *hash);
            match worst {
                Some(hash) => {
                    map.remove(&hash);
                }
                None => break, // every remaining candidate is the vote leader; stop evicting.
            }
        }
    }

    async fn compute_snapshot(
        &self,
        block: &Block,
        frozen: &FrozenChain,
    ) -> Option<crate::chain::balance::BalanceSnapshot> {
        let chain = self.collect_chain(block, frozen)?;
        let mut snapshot = frozen.frozen_edge_snapshot().clone();
        for ancestor in chain {
            snapshot = executor::execute(
                &snapshot,
                &ancestor.transactions,
                ancestor.signer_id,
                ancestor.version,
                &UnlockSchedule::default(),
                0,
            )
            .ok()?;
        }
        Some(snapshot)
    }

    /// Ancestors from just above the frozen edge through `block`, ascending
    /// by height, resolved entirely from registered candidates.
    fn collect_chain(&self, block: &Block, frozen: &FrozenChain) -> Option<Vec<Block>> {
        let mut chain = vec![block.clone()];
        let mut current = block.clone();
        while current.height > frozen.frozen_edge_height() + 1 {
            let parent_height = current.height - 1;
            let parent = self
                .candidates
                .get(&parent_height)?
                .get(&current.previous_block_hash)?
                .clone();
            chain.push(parent.clone());
            current = parent;
        }
        if current.previous_block_hash != frozen.frozen_edge_block().hash() {
            return None;
        }
        chain.reverse();
        Some(chain)
    }
}
