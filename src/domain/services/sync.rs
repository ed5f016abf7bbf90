use chrono::NaiveDate;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::domain::models::{
    availability::AvailabilityDay, booking::Booking, region::Region, time_block::TimeBlock,
};
use crate::state::SchedulerState;

const FANOUT_BUFFER: usize = 64;

/// Fan-out hub over the live store feeds. Subscribes once to each backing
/// collection and re-delivers snapshots to any number of local watchers,
/// so multiple surfaces observe the same state without duplicate store
/// subscriptions. No transformation happens here.
pub struct SyncHub {
    time_blocks_tx: broadcast::Sender<Vec<TimeBlock>>,
    regions_tx: broadcast::Sender<Vec<Region>>,
    days_tx: broadcast::Sender<AvailabilityDay>,
    bookings_tx: broadcast::Sender<Booking>,
    pumps: Vec<JoinHandle<()>>,
}

impl SyncHub {
    pub fn start(state: &SchedulerState) -> Self {
        let (time_blocks_tx, _) = broadcast::channel(FANOUT_BUFFER);
        let (regions_tx, _) = broadcast::channel(FANOUT_BUFFER);
        let (days_tx, _) = broadcast::channel(FANOUT_BUFFER);
        let (bookings_tx, _) = broadcast::channel(FANOUT_BUFFER);

        let pumps = vec![
            pump("time-blocks", state.time_block_repo.subscribe(), time_blocks_tx.clone()),
            pump("regions", state.region_repo.subscribe(), regions_tx.clone()),
            pump("availability", state.availability_repo.subscribe(), days_tx.clone()),
            pump("bookings", state.booking_repo.subscribe(), bookings_tx.clone()),
        ];

        Self {
            time_blocks_tx,
            regions_tx,
            days_tx,
            bookings_tx,
            pumps,
        }
    }

    pub fn watch_time_blocks(&self) -> broadcast::Receiver<Vec<TimeBlock>> {
        self.time_blocks_tx.subscribe()
    }

    pub fn watch_regions(&self) -> broadcast::Receiver<Vec<Region>> {
        self.regions_tx.subscribe()
    }

    pub fn watch_days(&self) -> broadcast::Receiver<AvailabilityDay> {
        self.days_tx.subscribe()
    }

    pub fn watch_bookings(&self) -> broadcast::Receiver<Booking> {
        self.bookings_tx.subscribe()
    }

    /// Availability feed filtered to one date.
    pub fn watch_date(&self, date: NaiveDate) -> mpsc::Receiver<AvailabilityDay> {
        let (tx, rx) = mpsc::channel(FANOUT_BUFFER);
        let mut feed = self.days_tx.subscribe();
        tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(day) if day.date == date => {
                        if tx.send(day).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Date watcher for {} lagged, skipped {} updates", date, n)
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        rx
    }

    /// Ledger feed filtered to one date.
    pub fn watch_bookings_for(&self, date: NaiveDate) -> mpsc::Receiver<Booking> {
        let (tx, rx) = mpsc::channel(FANOUT_BUFFER);
        let mut feed = self.bookings_tx.subscribe();
        tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(booking) if booking.date == date => {
                        if tx.send(booking).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Booking watcher for {} lagged, skipped {} updates", date, n)
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        rx
    }
}

fn pump<T: Clone + Send + 'static>(
    feed: &'static str,
    mut rx: broadcast::Receiver<T>,
    tx: broadcast::Sender<T>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(value) => {
                    // Send only fails with no active watchers; fine to drop.
                    let _ = tx.send(value);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Sync feed {} lagged, skipped {} updates", feed, n)
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

impl Drop for SyncHub {
    fn drop(&mut self) {
        for pump in &self.pumps {
            pump.abort();
        }
    }
}
