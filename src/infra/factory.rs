use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::infra::repositories::{
    memory_availability_repo::MemoryAvailabilityRepo, memory_booking_repo::MemoryBookingRepo,
    memory_region_repo::MemoryRegionRepo, memory_store::MemoryStore,
    memory_time_block_repo::MemoryTimeBlockRepo,
};
use crate::state::SchedulerState;

pub fn bootstrap_state(config: &Config) -> SchedulerState {
    info!("Initializing in-memory document store...");
    let store = Arc::new(MemoryStore::new());

    SchedulerState {
        config: config.clone(),
        time_block_repo: Arc::new(MemoryTimeBlockRepo::new(store.clone())),
        region_repo: Arc::new(MemoryRegionRepo::new(store.clone())),
        availability_repo: Arc::new(MemoryAvailabilityRepo::new(store.clone())),
        booking_repo: Arc::new(MemoryBookingRepo::new(store)),
    }
}
