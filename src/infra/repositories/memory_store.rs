use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::{broadcast, RwLock};

use crate::domain::models::{
    availability::AvailabilityDay, booking::Booking, region::Region, time_block::TimeBlock,
};

const CHANGE_BUFFER: usize = 64;

/// Shared in-memory document store: one collection plus one change channel
/// per logical collection. Repositories hold a shared `Arc<MemoryStore>`
/// handle the way a SQL adapter would hold a pool.
pub struct MemoryStore {
    pub(crate) time_blocks: RwLock<HashMap<String, TimeBlock>>,
    pub(crate) regions: RwLock<HashMap<String, Region>>,
    pub(crate) availability: RwLock<HashMap<NaiveDate, AvailabilityDay>>,
    pub(crate) bookings: RwLock<Vec<Booking>>,
    pub(crate) time_blocks_tx: broadcast::Sender<Vec<TimeBlock>>,
    pub(crate) regions_tx: broadcast::Sender<Vec<Region>>,
    pub(crate) availability_tx: broadcast::Sender<AvailabilityDay>,
    pub(crate) bookings_tx: broadcast::Sender<Booking>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (time_blocks_tx, _) = broadcast::channel(CHANGE_BUFFER);
        let (regions_tx, _) = broadcast::channel(CHANGE_BUFFER);
        let (availability_tx, _) = broadcast::channel(CHANGE_BUFFER);
        let (bookings_tx, _) = broadcast::channel(CHANGE_BUFFER);

        Self {
            time_blocks: RwLock::new(HashMap::new()),
            regions: RwLock::new(HashMap::new()),
            availability: RwLock::new(HashMap::new()),
            bookings: RwLock::new(Vec::new()),
            time_blocks_tx,
            regions_tx,
            availability_tx,
            bookings_tx,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
