use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;

use super::memory_store::MemoryStore;
use crate::domain::models::{availability::SlotKey, booking::Booking};
use crate::domain::ports::BookingRepository;
use crate::error::EngineError;

pub struct MemoryBookingRepo {
    store: Arc<MemoryStore>,
}

impl MemoryBookingRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepo {
    async fn append(&self, booking: &Booking) -> Result<Booking, EngineError> {
        let mut ledger = self.store.bookings.write().await;
        if ledger.iter().any(|b| b.id == booking.id) {
            return Err(EngineError::Conflict(format!(
                "Booking {} already recorded",
                booking.id
            )));
        }
        ledger.push(booking.clone());
        drop(ledger);
        let _ = self.store.bookings_tx.send(booking.clone());
        Ok(booking.clone())
    }

    async fn reserve(&self, booking: &Booking) -> Result<Booking, EngineError> {
        // Both collections stay locked until the counter and the ledger
        // record agree.
        let mut records = self.store.availability.write().await;
        let day = records.get_mut(&booking.date).ok_or_else(|| {
            EngineError::NotFound(format!("No availability record for {}", booking.date))
        })?;
        let key = SlotKey::new(&booking.time_block_id, &booking.region_id);
        let slot = day.slots.get_mut(&key).ok_or_else(|| {
            EngineError::NotFound(format!(
                "Slot {}/{} not offered on {}",
                booking.time_block_id, booking.region_id, booking.date
            ))
        })?;
        if !slot.available {
            return Err(EngineError::Conflict(format!(
                "Slot {}/{} on {} is closed",
                booking.time_block_id, booking.region_id, booking.date
            )));
        }
        if slot.booked >= slot.capacity {
            return Err(EngineError::Conflict(format!(
                "Slot {}/{} on {} is fully booked",
                booking.time_block_id, booking.region_id, booking.date
            )));
        }

        let mut ledger = self.store.bookings.write().await;
        if ledger.iter().any(|b| b.id == booking.id) {
            return Err(EngineError::Conflict(format!(
                "Booking {} already recorded",
                booking.id
            )));
        }
        slot.booked += 1;
        day.version += 1;
        ledger.push(booking.clone());
        let snapshot = day.clone();
        drop(ledger);
        drop(records);
        let _ = self.store.availability_tx.send(snapshot);
        let _ = self.store.bookings_tx.send(booking.clone());
        Ok(booking.clone())
    }

    async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Booking>, EngineError> {
        let mut rows: Vec<Booking> = self
            .store
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| b.date == date)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    fn subscribe(&self) -> broadcast::Receiver<Booking> {
        self.store.bookings_tx.subscribe()
    }
}
