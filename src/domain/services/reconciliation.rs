use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::models::{
    availability::{AvailabilityDay, SlotKey, SlotState},
    region::Region,
    time_block::{DayType, TimeBlock},
};
use crate::domain::ports::{AvailabilityRepository, RegionRepository, TimeBlockRepository};
use crate::domain::services::renames::SlotRenameTable;
use crate::error::EngineError;
use crate::state::SchedulerState;

const READ_RETRIES: u32 = 2;
const RETRY_BACKOFF_MS: u64 = 50;
const CAS_ATTEMPTS: u32 = 3;

/// One slot removed during reconciliation: it existed in a date's record
/// but matches nothing in the current catalog/registry, directly or via
/// the rename table. Surfaced so an operator can repair by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedSlot {
    pub date: NaiveDate,
    pub time_block_id: String,
    pub region_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Default, Clone)]
pub struct InitializeReport {
    pub created: Vec<NaiveDate>,
    pub existing: Vec<NaiveDate>,
    pub skipped: Vec<SkippedDate>,
}

#[derive(Debug, Default, Clone)]
pub struct ReconcileReport {
    pub reconciled: Vec<NaiveDate>,
    pub unchanged: Vec<NaiveDate>,
    pub skipped: Vec<SkippedDate>,
    pub dropped: Vec<DroppedSlot>,
}

enum DateOutcome {
    Absent,
    Unchanged,
    Rebuilt(Vec<DroppedSlot>),
}

/// Keeps materialized availability records consistent with the current
/// time-block catalog and region registry, preserving booking state
/// wherever the same logical slot can still be identified.
pub struct ReconciliationEngine {
    time_blocks: Arc<dyn TimeBlockRepository>,
    regions: Arc<dyn RegionRepository>,
    availability: Arc<dyn AvailabilityRepository>,
    renames: SlotRenameTable,
    config: Config,
}

impl ReconciliationEngine {
    pub fn new(state: &SchedulerState, renames: SlotRenameTable) -> Self {
        Self {
            time_blocks: state.time_block_repo.clone(),
            regions: state.region_repo.clone(),
            availability: state.availability_repo.clone(),
            renames,
            config: state.config.clone(),
        }
    }

    pub async fn initialize(&self, window_days: u32) -> Result<InitializeReport, EngineError> {
        self.initialize_from(self.config.local_today(), window_days)
            .await
    }

    /// Materializes a default availability record for every date in
    /// `[start, start + window_days)` that has none. Existing records are
    /// left untouched. Catalog/registry read failures abort the whole
    /// operation; per-date failures are skipped and reported.
    pub async fn initialize_from(
        &self,
        start: NaiveDate,
        window_days: u32,
    ) -> Result<InitializeReport, EngineError> {
        let blocks = self.time_blocks.list().await?;
        let regions = self.regions.list().await?;

        let mut report = InitializeReport::default();
        for offset in 0..window_days {
            let date = start + ChronoDuration::days(offset as i64);
            match timeout(self.record_timeout(), self.initialize_date(date, &blocks, &regions))
                .await
            {
                Ok(Ok(true)) => report.created.push(date),
                Ok(Ok(false)) => report.existing.push(date),
                Ok(Err(e)) => {
                    warn!("Skipping {} during initialize: {}", date, e);
                    report.skipped.push(SkippedDate {
                        date,
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    let e = EngineError::Timeout(self.config.record_timeout_ms);
                    warn!("Skipping {} during initialize: {}", date, e);
                    report.skipped.push(SkippedDate {
                        date,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Initialized {}-day window from {}: {} created, {} existing, {} skipped",
            window_days,
            start,
            report.created.len(),
            report.existing.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    pub async fn reconcile(&self, window_days: u32) -> Result<ReconcileReport, EngineError> {
        self.reconcile_from(self.config.local_today(), window_days)
            .await
    }

    /// Rebuilds every materialized record in `[start, start + window_days)`
    /// against the current catalog and registry. Running it twice with no
    /// intervening catalog change leaves records byte-identical; unchanged
    /// days are not rewritten.
    pub async fn reconcile_from(
        &self,
        start: NaiveDate,
        window_days: u32,
    ) -> Result<ReconcileReport, EngineError> {
        let blocks = self.time_blocks.list().await?;
        let regions = self.regions.list().await?;

        let mut report = ReconcileReport::default();
        for offset in 0..window_days {
            let date = start + ChronoDuration::days(offset as i64);
            match timeout(self.record_timeout(), self.reconcile_date(date, &blocks, &regions))
                .await
            {
                Ok(Ok(DateOutcome::Absent)) => {
                    debug!("No availability record for {}, nothing to reconcile", date)
                }
                Ok(Ok(DateOutcome::Unchanged)) => report.unchanged.push(date),
                Ok(Ok(DateOutcome::Rebuilt(dropped))) => {
                    report.reconciled.push(date);
                    report.dropped.extend(dropped);
                }
                Ok(Err(e)) => {
                    warn!("Skipping {} during reconcile: {}", date, e);
                    report.skipped.push(SkippedDate {
                        date,
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    let e = EngineError::Timeout(self.config.record_timeout_ms);
                    warn!("Skipping {} during reconcile: {}", date, e);
                    report.skipped.push(SkippedDate {
                        date,
                        reason: e.to_string(),
                    });
                }
            }
        }

        for dropped in &report.dropped {
            warn!(
                "Dropped stale slot {}/{} on {}",
                dropped.time_block_id, dropped.region_id, dropped.date
            );
        }
        info!(
            "Reconciled {}-day window from {}: {} rebuilt, {} unchanged, {} skipped, {} slots dropped",
            window_days,
            start,
            report.reconciled.len(),
            report.unchanged.len(),
            report.skipped.len(),
            report.dropped.len()
        );
        Ok(report)
    }

    async fn initialize_date(
        &self,
        date: NaiveDate,
        blocks: &[TimeBlock],
        regions: &[Region],
    ) -> Result<bool, EngineError> {
        if self.get_with_retry(date).await?.is_some() {
            return Ok(false);
        }
        let day = AvailabilityDay::seeded(date, blocks, regions, self.config.default_capacity);
        match self.availability.put(&day).await {
            Ok(_) => Ok(true),
            // Raced with another writer that materialized the date first.
            Err(EngineError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn reconcile_date(
        &self,
        date: NaiveDate,
        blocks: &[TimeBlock],
        regions: &[Region],
    ) -> Result<DateOutcome, EngineError> {
        for _ in 0..CAS_ATTEMPTS {
            let day = match self.get_with_retry(date).await? {
                Some(day) => day,
                None => return Ok(DateOutcome::Absent),
            };

            let (rebuilt, dropped) =
                rebuild_day(&day, blocks, regions, &self.renames, self.config.default_capacity);
            if rebuilt.slots == day.slots && rebuilt.day_type == day.day_type {
                return Ok(DateOutcome::Unchanged);
            }

            match self.availability.put(&rebuilt).await {
                Ok(_) => return Ok(DateOutcome::Rebuilt(dropped)),
                // Lost the version race to a concurrent write; re-read so
                // that write is folded in rather than clobbered.
                Err(EngineError::Conflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(EngineError::Conflict(format!(
            "gave up on {} after {} contended write attempts",
            date, CAS_ATTEMPTS
        )))
    }

    async fn get_with_retry(
        &self,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityDay>, EngineError> {
        let mut attempt = 0;
        loop {
            match self.availability.get(date).await {
                Ok(day) => return Ok(day),
                Err(e) if e.is_transient() && attempt < READ_RETRIES => {
                    attempt += 1;
                    debug!("Transient failure reading {} (attempt {}): {}", date, attempt, e);
                    sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn record_timeout(&self) -> Duration {
        Duration::from_millis(self.config.record_timeout_ms)
    }
}

/// Rebuilds one day's slot map against the current catalog and registry.
/// State carries over for target keys that match an existing slot, either
/// directly or through the rename table; new pairs are backfilled with
/// defaults; leftovers are dropped and returned for reporting. The day
/// type is re-derived from the date.
pub fn rebuild_day(
    day: &AvailabilityDay,
    blocks: &[TimeBlock],
    regions: &[Region],
    renames: &SlotRenameTable,
    default_capacity: u32,
) -> (AvailabilityDay, Vec<DroppedSlot>) {
    let day_type = DayType::of(day.date);
    let mut slots = BTreeMap::new();
    let mut consumed: HashSet<SlotKey> = HashSet::new();

    for block in blocks.iter().filter(|b| b.day_type == day_type) {
        for region in regions {
            let key = SlotKey::new(&block.id, &region.id);
            let state = if let Some(existing) = day.slots.get(&key) {
                consumed.insert(key.clone());
                existing.clone()
            } else if let Some((former_key, carried)) =
                match_former(day, &block.id, &region.id, renames)
            {
                consumed.insert(former_key);
                carried
            } else {
                SlotState::open(default_capacity)
            };
            slots.insert(key, state);
        }
    }

    let dropped = day
        .slots
        .keys()
        .filter(|key| !consumed.contains(*key))
        .map(|key| DroppedSlot {
            date: day.date,
            time_block_id: key.time_block_id.clone(),
            region_id: key.region_id.clone(),
        })
        .collect();

    let rebuilt = AvailabilityDay {
        date: day.date,
        day_type,
        version: day.version,
        slots,
    };
    (rebuilt, dropped)
}

fn match_former(
    day: &AvailabilityDay,
    current_block_id: &str,
    region_id: &str,
    renames: &SlotRenameTable,
) -> Option<(SlotKey, SlotState)> {
    renames.former_ids(current_block_id).find_map(|old_id| {
        let key = SlotKey::new(old_id, region_id);
        day.slots.get(&key).map(|state| (key.clone(), state.clone()))
    })
}
