use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tokio::sync::broadcast;
use tracing::warn;

use super::memory_store::MemoryStore;
use crate::domain::models::availability::{AvailabilityDay, SlotKey, SlotPatch, SlotState};
use crate::domain::ports::AvailabilityRepository;
use crate::error::EngineError;

pub struct MemoryAvailabilityRepo {
    store: Arc<MemoryStore>,
}

impl MemoryAvailabilityRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AvailabilityRepository for MemoryAvailabilityRepo {
    async fn get(&self, date: NaiveDate) -> Result<Option<AvailabilityDay>, EngineError> {
        Ok(self.store.availability.read().await.get(&date).cloned())
    }

    async fn get_range(
        &self,
        start: NaiveDate,
        days: u32,
    ) -> Result<BTreeMap<NaiveDate, AvailabilityDay>, EngineError> {
        let end = start + Duration::days(days as i64);
        let records = self.store.availability.read().await;
        Ok(records
            .values()
            .filter(|day| day.date >= start && day.date < end)
            .map(|day| (day.date, day.clone()))
            .collect())
    }

    async fn put(&self, day: &AvailabilityDay) -> Result<AvailabilityDay, EngineError> {
        let mut records = self.store.availability.write().await;
        let current_version = records.get(&day.date).map(|d| d.version).unwrap_or(0);
        if day.version != current_version {
            return Err(EngineError::Conflict(format!(
                "Availability for {} is at version {}, write expected {}",
                day.date, current_version, day.version
            )));
        }
        let mut stored = day.clone();
        stored.version = day.version + 1;
        records.insert(day.date, stored.clone());
        drop(records);
        let _ = self.store.availability_tx.send(stored.clone());
        Ok(stored)
    }

    async fn set_slot(
        &self,
        date: NaiveDate,
        time_block_id: &str,
        region_id: &str,
        patch: SlotPatch,
    ) -> Result<SlotState, EngineError> {
        if time_block_id.is_empty() || region_id.is_empty() {
            return Err(EngineError::Validation("Slot ids must not be empty".into()));
        }
        let mut records = self.store.availability.write().await;
        let day = records
            .entry(date)
            .or_insert_with(|| AvailabilityDay::empty(date));
        let state = day
            .slots
            .entry(SlotKey::new(time_block_id, region_id))
            .or_insert_with(SlotState::default);
        patch.apply(state);
        if state.booked > state.capacity {
            warn!(
                "Slot {}/{} on {} booked {} above capacity {}",
                time_block_id, region_id, date, state.booked, state.capacity
            );
        }
        let result = state.clone();
        day.version += 1;
        let snapshot = day.clone();
        drop(records);
        let _ = self.store.availability_tx.send(snapshot);
        Ok(result)
    }

    fn subscribe(&self) -> broadcast::Receiver<AvailabilityDay> {
        self.store.availability_tx.subscribe()
    }
}
