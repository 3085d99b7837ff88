//! FrozenChain (C8) — §4.4
//!
//! The authoritative tail: frozen-edge height/block/snapshot, a small
//! ring of recent snapshots, a derived signer committee, and a
//! `BlockStore` handle. Mirrors the teacher's `Validator` in owning the
//! durable-state seam while keeping recent lookups in memory.

use crate::chain::balance::BalanceSnapshot;
use crate::chain::block::Block;
use crate::consensus::cycle::CycleTracker;
use crate::consensus::error::{ConsensusResult, FatalError};
use crate::consensus::executor::{self, UnlockSchedule};
use crate::consensus::store::BlockStore;
use crate::crypto::Identifier;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

const SNAPSHOT_RING_CAPACITY: usize = 8;
const BLOCK_CACHE_CAPACITY: usize = 32;

pub struct FrozenChain {
    frozen_edge_height: u64,
    frozen_edge_block: Block,
    frozen_edge_snapshot: BalanceSnapshot,
    snapshot_ring: VecDeque<BalanceSnapshot>,
    block_cache: VecDeque<Block>,
    cycle_tracker: CycleTracker,
    current_cycle: Vec<Identifier>,
    current_cycle_set: HashSet<Identifier>,
    store: Arc<dyn BlockStore>,
}

impl FrozenChain {
    /// Build the chain at Genesis: `genesis_block` and `genesis_snapshot`
    /// become the frozen edge; the cycle tracker is seeded with the
    /// Genesis signer.
    pub fn genesis(
        genesis_block: Block,
        genesis_snapshot: BalanceSnapshot,
        store: Arc<dyn BlockStore>,
    ) -> Self {
        let cycle_tracker = CycleTracker::empty().derive_next(genesis_block.signer_id);
        let current_cycle = cycle_tracker.current_cycle();
        let current_cycle_set = current_cycle.iter().copied().collect();

        let mut snapshot_ring = VecDeque::with_capacity(SNAPSHOT_RING_CAPACITY);
        snapshot_ring.push_front(genesis_snapshot.clone());

        let mut block_cache = VecDeque::with_capacity(BLOCK_CACHE_CAPACITY);
        block_cache.push_front(genesis_block.clone());

        Self {
            frozen_edge_height: genesis_block.height,
            frozen_edge_block: genesis_block,
            frozen_edge_snapshot: genesis_snapshot,
            snapshot_ring,
            block_cache,
            cycle_tracker,
            current_cycle,
            current_cycle_set,
            store,
        }
    }

    pub fn frozen_edge_height(&self) -> u64 {
        self.frozen_edge_height
    }

    pub fn frozen_edge_block(&self) -> &Block {
        &self.frozen_edge_block
    }

    pub fn frozen_edge_snapshot(&self) -> &BalanceSnapshot {
        &self.frozen_edge_snapshot
    }

    pub fn current_cycle(&self) -> &[Identifier] {
        &self.current_cycle
    }

    pub fn cycle_tracker(&self) -> &CycleTracker {
        &self.cycle_tracker
    }

    pub fn is_genesis_cycle(&self) -> bool {
        !self.cycle_tracker.is_complete()
    }

    pub fn cycle_contains(&self, identifier: &Identifier) -> bool {
        self.current_cycle_set.contains(identifier)
    }

    /// Advance the frozen edge to `block`/`snapshot`, given the cycle
    /// tracker derived for `block.signer_id` from the current tracker
    /// (§4.4: "Recompute `current_cycle` by delegating to `CycleTracker`").
    pub async fn freeze_block(
        &mut self,
        block: Block,
        snapshot: BalanceSnapshot,
        next_cycle_tracker: CycleTracker,
    ) -> ConsensusResult<()> {
        if block.height != self.frozen_edge_height + 1 {
            return Err(FatalError::FreezePreconditionViolated(format!(
                "expected height {}, got {}",
                self.frozen_edge_height + 1,
                block.height
            ))
            .into());
        }
        if block.previous_block_hash != self.frozen_edge_block.hash() {
            return Err(FatalError::FreezePreconditionViolated(
                "previous_block_hash does not match the current frozen edge".into(),
            )
            .into());
        }
        if snapshot.hash() != block.balance_list_hash {
            return Err(FatalError::SnapshotHashMismatchPostExecute.into());
        }

        self.store.put_block(&block).await?;
        self.store.put_snapshot(&snapshot).await?;

        self.frozen_edge_height = block.height;
        self.frozen_edge_block = block.clone();
        self.frozen_edge_snapshot = snapshot.clone();

        self.cycle_tracker = next_cycle_tracker;
        self.current_cycle = self.cycle_tracker.current_cycle();
        self.current_cycle_set = self.current_cycle.iter().copied().collect();

        self.snapshot_ring.push_front(snapshot);
        if self.snapshot_ring.len() > SNAPSHOT_RING_CAPACITY {
            self.snapshot_ring.pop_back();
        }

        self.block_cache.push_front(block);
        if self.block_cache.len() > BLOCK_CACHE_CAPACITY {
            self.block_cache.pop_back();
        }

        Ok(())
    }

    /// Lookup order: memory cache, then `BlockStore`.
    pub async fn frozen_block_at(&self, height: u64) -> ConsensusResult<Option<Block>> {
        if let Some(block) = self.block_cache.iter().find(|b| b.height == height) {
            return Ok(Some(block.clone()));
        }
        self.store.get_block(height).await
    }

    /// Returns the snapshot for `block` if it sits in the ring; otherwise
    /// re-executes forward from the nearest earlier ring entry using
    /// cached/stored blocks. Fails (`None`) if any intermediate block is
    /// missing.
    pub async fn snapshot_for_block(&self, block: &Block) -> ConsensusResult<Option<BalanceSnapshot>> {
        if let Some(snapshot) = self
            .snapshot_ring
            .iter()
            .find(|s| s.block_height == block.height)
        {
            return Ok(Some(snapshot.clone()));
        }

        let Some(base) = self
            .snapshot_ring
            .iter()
            .filter(|s| s.block_height <= block.height)
            .max_by_key(|s| s.block_height)
            .cloned()
        else {
            return Ok(None);
        };

        let mut current = base;
        for height in (current.block_height + 1)..=block.height {
            let Some(intermediate) = self.frozen_block_at(height).await? else {
                return Ok(None);
            };
            current = match executor::execute(
                &current,
                &intermediate.transactions,
                intermediate.signer_id,
                intermediate.version,
                &UnlockSchedule::default(),
                0,
            ) {
                Ok(next) => next,
                Err(_) => return Ok(None),
            };
        }
        Ok(Some(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::balance::BalanceSnapshot;
    use crate::consensus::store::MemoryBlockStore;
    use crate::crypto::{Identifier, Signature};
    use crate::hash::Hash;

    fn genesis_pair() -> (Block, BalanceSnapshot) {
        let signer = Identifier([1u8; 32]);
        let snapshot = BalanceSnapshot::genesis(signer);
        let block = Block {
            version: 0,
            height: 0,
            previous_block_hash: Hash(crate::constants::GENESIS_PREVIOUS_HASH),
            start_timestamp: 0,
            verification_timestamp: 0,
            transactions: Vec::new(),
            balance_list_hash: snapshot.hash(),
            signer_id: signer,
            signer_signature: Signature::ZERO,
        };
        (block, snapshot)
    }

    #[tokio::test]
    async fn genesis_frozen_edge_matches_constructor_inputs() {
        let (block, snapshot) = genesis_pair();
        let store = Arc::new(MemoryBlockStore::new(0));
        let chain = FrozenChain::genesis(block.clone(), snapshot.clone(), store);

        assert_eq!(chain.frozen_edge_height(), 0);
        assert_eq!(chain.frozen_edge_block().hash(), block.hash());
        assert!(chain.cycle_contains(&block.signer_id));
    }

    #[tokio::test]
    async fn freeze_block_rejects_wrong_height() {
        let (genesis_block, genesis_snapshot) = genesis_pair();
        let store = Arc::new(MemoryBlockStore::new(0));
        let mut chain = FrozenChain::genesis(genesis_block.clone(), genesis_snapshot, store);

        let mut bad_block = genesis_block.clone();
        bad_block.height = 5;
        let next_tracker = chain.cycle_tracker().derive_next(bad_block.signer_id);
        let result = chain
            .freeze_block(bad_block, BalanceSnapshot::genesis(Identifier([2u8; 32])), next_tracker)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn frozen_block_at_hits_memory_cache() {
        let (block, snapshot) = genesis_pair();
        let store = Arc::new(MemoryBlockStore::new(0));
        let chain = FrozenChain::genesis(block.clone(), snapshot, store);

        let found = chain.frozen_block_at(0).await.unwrap();
        assert_eq!(found.map(|b| b.hash()), Some(block.hash()));
    }
}
