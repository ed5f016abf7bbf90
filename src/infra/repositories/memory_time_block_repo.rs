use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::memory_store::MemoryStore;
use crate::domain::{models::time_block::TimeBlock, ports::TimeBlockRepository};
use crate::error::EngineError;

pub struct MemoryTimeBlockRepo {
    store: Arc<MemoryStore>,
}

impl MemoryTimeBlockRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    async fn snapshot(&self) -> Vec<TimeBlock> {
        let mut blocks: Vec<TimeBlock> =
            self.store.time_blocks.read().await.values().cloned().collect();
        blocks.sort_by(|a, b| a.id.cmp(&b.id));
        blocks
    }
}

#[async_trait]
impl TimeBlockRepository for MemoryTimeBlockRepo {
    async fn list(&self) -> Result<Vec<TimeBlock>, EngineError> {
        Ok(self.snapshot().await)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TimeBlock>, EngineError> {
        Ok(self.store.time_blocks.read().await.get(id).cloned())
    }

    async fn upsert(&self, block: &TimeBlock) -> Result<TimeBlock, EngineError> {
        if block.id.trim().is_empty() {
            return Err(EngineError::Validation("Time block id must not be empty".into()));
        }
        self.store
            .time_blocks
            .write()
            .await
            .insert(block.id.clone(), block.clone());
        let _ = self.store.time_blocks_tx.send(self.snapshot().await);
        Ok(block.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), EngineError> {
        if self.store.time_blocks.write().await.remove(id).is_none() {
            return Err(EngineError::NotFound("Time block not found".into()));
        }
        let _ = self.store.time_blocks_tx.send(self.snapshot().await);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Vec<TimeBlock>> {
        self.store.time_blocks_tx.subscribe()
    }
}
