use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;

use crate::domain::models::{
    availability::{AvailabilityDay, SlotPatch, SlotState},
    booking::Booking,
    region::Region,
    time_block::TimeBlock,
};
use crate::error::EngineError;

#[async_trait]
pub trait TimeBlockRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<TimeBlock>, EngineError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<TimeBlock>, EngineError>;
    /// Creates on an unknown id, replaces on a known one. Any non-empty id
    /// is accepted. Catalog mutations do not reconcile availability
    /// records; run the ReconciliationEngine after editing.
    async fn upsert(&self, block: &TimeBlock) -> Result<TimeBlock, EngineError>;
    async fn remove(&self, id: &str) -> Result<(), EngineError>;
    /// Delivers the full current catalog, sorted by id, on every change.
    /// Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<Vec<TimeBlock>>;
}

#[async_trait]
pub trait RegionRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Region>, EngineError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Region>, EngineError>;
    async fn upsert(&self, region: &Region) -> Result<Region, EngineError>;
    async fn remove(&self, id: &str) -> Result<(), EngineError>;
    fn subscribe(&self) -> broadcast::Receiver<Vec<Region>>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// `None` means "no record materialized yet", which callers must not
    /// conflate with "all slots unavailable".
    async fn get(&self, date: NaiveDate) -> Result<Option<AvailabilityDay>, EngineError>;
    /// Materialized records in `[start, start + days)`, keyed by date.
    async fn get_range(
        &self,
        start: NaiveDate,
        days: u32,
    ) -> Result<BTreeMap<NaiveDate, AvailabilityDay>, EngineError>;
    /// Compare-and-swap write of a whole day: `day.version` must match the
    /// stored version (0 when absent) or the call fails with `Conflict`.
    /// The stored record gets `day.version + 1`.
    async fn put(&self, day: &AvailabilityDay) -> Result<AvailabilityDay, EngineError>;
    /// Partial merge into one slot; omitted patch fields are preserved.
    /// Creates the day record (day type derived from the date) and a
    /// default slot when absent. Writes that leave `booked > capacity`
    /// are accepted but logged.
    async fn set_slot(
        &self,
        date: NaiveDate,
        time_block_id: &str,
        region_id: &str,
        patch: SlotPatch,
    ) -> Result<SlotState, EngineError>;
    /// Delivers a snapshot of each changed day.
    fn subscribe(&self) -> broadcast::Receiver<AvailabilityDay>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Unconditional ledger append. Does not check or touch the matrix's
    /// booked counters; callers reflect the count via `set_slot`
    /// separately, or use `reserve` for the capacity-safe path.
    async fn append(&self, booking: &Booking) -> Result<Booking, EngineError>;
    /// Capacity-checked booking: verifies the slot exists, is open and
    /// under capacity, then increments the booked counter and appends the
    /// ledger record in one store transaction.
    async fn reserve(&self, booking: &Booking) -> Result<Booking, EngineError>;
    /// Bookings for one date, ordered by creation time.
    async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Booking>, EngineError>;
    fn subscribe(&self) -> broadcast::Receiver<Booking>;
}
