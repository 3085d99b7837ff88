//! BlockStore (C12) — §6.3
//!
//! Abstract persistence collaborator; the core never depends on the
//! on-disk layout (§1 out-of-scope). `async_trait`-based interface,
//! matching the teacher's repository-trait pattern for its own storage
//! seams. `MemoryBlockStore` is the reference implementation the rest of
//! the crate is tested against.

use crate::chain::balance::BalanceSnapshot;
use crate::chain::block::Block;
use crate::consensus::error::ConsensusResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait BlockStore: Send + Sync {
    async fn put_block(&self, block: &Block) -> ConsensusResult<()>;
    async fn get_block(&self, height: u64) -> ConsensusResult<Option<Block>>;
    async fn put_snapshot(&self, snapshot: &BalanceSnapshot) -> ConsensusResult<()>;
    async fn get_snapshot(&self, height: u64) -> ConsensusResult<Option<BalanceSnapshot>>;
    async fn highest_height(&self) -> ConsensusResult<Option<u64>>;
    async fn genesis_start_timestamp(&self) -> ConsensusResult<i64>;
}

/// An in-memory `BlockStore`, sufficient for tests and single-process
/// embedding; durability across restarts is out of scope (§1).
pub struct MemoryBlockStore {
    genesis_start_timestamp: i64,
    blocks: RwLock<HashMap<u64, Block>>,
    snapshots: RwLock<HashMap<u64, BalanceSnapshot>>,
}

impl MemoryBlockStore {
    pub fn new(genesis_start_timestamp: i64) -> Self {
        Self {
            genesis_start_timestamp,
            blocks: RwLock::new(HashMap::new()),
            snapshots: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn put_block(&self, block: &Block) -> ConsensusResult<()> {
        self.blocks.write().await.insert(block.height, block.clone());
        Ok(())
    }

    async fn get_block(&self, height: u64) -> ConsensusResult<Option<Block>> {
        Ok(self.blocks.read().await.get(&height).cloned())
    }

    async fn put_snapshot(&self, snapshot: &BalanceSnapshot) -> ConsensusResult<()> {
        self.snapshots
            .write()
            .await
            .insert(snapshot.block_height, snapshot.clone());
        Ok(())
    }

    async fn get_snapshot(&self, height: u64) -> ConsensusResult<Option<BalanceSnapshot>> {
        Ok(self.snapshots.read().await.get(&height).cloned())
    }

    async fn highest_height(&self) -> ConsensusResult<Option<u64>> {
        Ok(self.blocks.read().await.keys().copied().max())
    }

    async fn genesis_start_timestamp(&self) -> ConsensusResult<i64> {
        Ok(self.genesis_start_timestamp)
    }
}
