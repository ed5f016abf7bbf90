use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tokio::sync::broadcast;

use slotgrid::config::Config;
use slotgrid::domain::models::availability::{AvailabilityDay, SlotPatch, SlotState};
use slotgrid::domain::models::region::Region;
use slotgrid::domain::models::time_block::{DayType, TimeBlock};
use slotgrid::domain::ports::AvailabilityRepository;
use slotgrid::domain::services::reconciliation::ReconciliationEngine;
use slotgrid::domain::services::renames::SlotRenameTable;
use slotgrid::error::EngineError;
use slotgrid::infra::factory::bootstrap_state;
use slotgrid::state::SchedulerState;

pub fn test_config() -> Config {
    Config {
        window_days: 21,
        default_capacity: 3,
        timezone: "UTC".to_string(),
        record_timeout_ms: 1_000,
    }
}

/// 2025-06-03 is a Tuesday.
#[allow(dead_code)]
pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()
}

/// 2025-06-07 is a Saturday.
#[allow(dead_code)]
pub fn saturday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()
}

#[allow(dead_code)]
pub struct TestEngine {
    pub state: SchedulerState,
    pub engine: ReconciliationEngine,
}

#[allow(dead_code)]
impl TestEngine {
    pub fn new() -> Self {
        Self::with_renames(SlotRenameTable::catalog_redesign_v1())
    }

    pub fn with_renames(renames: SlotRenameTable) -> Self {
        let state = bootstrap_state(&test_config());
        let engine = ReconciliationEngine::new(&state, renames);
        Self { state, engine }
    }

    /// Same store and renames, but availability reads go through a
    /// failure-injecting wrapper.
    pub fn with_flaky_availability(renames: SlotRenameTable) -> (Self, Arc<FlakyAvailabilityRepo>) {
        let base = bootstrap_state(&test_config());
        let flaky = Arc::new(FlakyAvailabilityRepo::new(base.availability_repo.clone()));
        let state = SchedulerState {
            availability_repo: flaky.clone() as Arc<dyn AvailabilityRepository>,
            ..base
        };
        let engine = ReconciliationEngine::new(&state, renames);
        (Self { state, engine }, flaky)
    }

    pub async fn add_block(&self, id: &str, start: &str, day_type: DayType) {
        let start_time = NaiveTime::parse_from_str(start, "%H:%M").unwrap();
        let block = TimeBlock::new(id, start_time, id, day_type);
        self.state.time_block_repo.upsert(&block).await.unwrap();
    }

    pub async fn add_region(&self, id: &str) {
        let region = Region::new(id, id, "#3b82f6");
        self.state.region_repo.upsert(&region).await.unwrap();
    }

    pub async fn set_slot(&self, date: NaiveDate, block: &str, region: &str, patch: SlotPatch) {
        self.state
            .availability_repo
            .set_slot(date, block, region, patch)
            .await
            .unwrap();
    }

    pub async fn slot(&self, date: NaiveDate, block: &str, region: &str) -> Option<SlotState> {
        self.state
            .availability_repo
            .get(date)
            .await
            .unwrap()
            .and_then(|day| day.slot(block, region).cloned())
    }

    pub async fn window_snapshot(&self, start: NaiveDate, days: u32) -> String {
        let range: BTreeMap<NaiveDate, AvailabilityDay> = self
            .state
            .availability_repo
            .get_range(start, days)
            .await
            .unwrap();
        serde_json::to_string(&range).unwrap()
    }
}

/// Availability adapter that fails reads for chosen dates a configured
/// number of times, to exercise retry and skip-and-continue paths.
pub struct FlakyAvailabilityRepo {
    inner: Arc<dyn AvailabilityRepository>,
    read_failures: Mutex<HashMap<NaiveDate, u32>>,
}

#[allow(dead_code)]
impl FlakyAvailabilityRepo {
    pub fn new(inner: Arc<dyn AvailabilityRepository>) -> Self {
        Self {
            inner,
            read_failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail_reads(&self, date: NaiveDate, times: u32) {
        self.read_failures.lock().unwrap().insert(date, times);
    }

    pub fn heal(&self) {
        self.read_failures.lock().unwrap().clear();
    }

    fn take_failure(&self, date: NaiveDate) -> bool {
        let mut failures = self.read_failures.lock().unwrap();
        match failures.get_mut(&date) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl AvailabilityRepository for FlakyAvailabilityRepo {
    async fn get(&self, date: NaiveDate) -> Result<Option<AvailabilityDay>, EngineError> {
        if self.take_failure(date) {
            return Err(EngineError::Store("injected read failure".into()));
        }
        self.inner.get(date).await
    }

    async fn get_range(
        &self,
        start: NaiveDate,
        days: u32,
    ) -> Result<BTreeMap<NaiveDate, AvailabilityDay>, EngineError> {
        self.inner.get_range(start, days).await
    }

    async fn put(&self, day: &AvailabilityDay) -> Result<AvailabilityDay, EngineError> {
        self.inner.put(day).await
    }

    async fn set_slot(
        &self,
        date: NaiveDate,
        time_block_id: &str,
        region_id: &str,
        patch: SlotPatch,
    ) -> Result<SlotState, EngineError> {
        self.inner.set_slot(date, time_block_id, region_id, patch).await
    }

    fn subscribe(&self) -> broadcast::Receiver<AvailabilityDay> {
        self.inner.subscribe()
    }
}
