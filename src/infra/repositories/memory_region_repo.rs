use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::memory_store::MemoryStore;
use crate::domain::{models::region::Region, ports::RegionRepository};
use crate::error::EngineError;

pub struct MemoryRegionRepo {
    store: Arc<MemoryStore>,
}

impl MemoryRegionRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    async fn snapshot(&self) -> Vec<Region> {
        let mut regions: Vec<Region> =
            self.store.regions.read().await.values().cloned().collect();
        regions.sort_by(|a, b| a.id.cmp(&b.id));
        regions
    }
}

#[async_trait]
impl RegionRepository for MemoryRegionRepo {
    async fn list(&self) -> Result<Vec<Region>, EngineError> {
        Ok(self.snapshot().await)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Region>, EngineError> {
        Ok(self.store.regions.read().await.get(id).cloned())
    }

    async fn upsert(&self, region: &Region) -> Result<Region, EngineError> {
        if region.id.trim().is_empty() {
            return Err(EngineError::Validation("Region id must not be empty".into()));
        }
        self.store
            .regions
            .write()
            .await
            .insert(region.id.clone(), region.clone());
        let _ = self.store.regions_tx.send(self.snapshot().await);
        Ok(region.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), EngineError> {
        if self.store.regions.write().await.remove(id).is_none() {
            return Err(EngineError::NotFound("Region not found".into()));
        }
        let _ = self.store.regions_tx.send(self.snapshot().await);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Vec<Region>> {
        self.store.regions_tx.subscribe()
    }
}
