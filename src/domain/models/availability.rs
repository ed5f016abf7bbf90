use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::region::Region;
use super::time_block::{DayType, TimeBlock};

pub const DEFAULT_SLOT_CAPACITY: u32 = 3;

/// Composite key addressing one (time block, region) cell of a day's grid.
/// Serialized as `"<time_block_id>/<region_id>"`; time block ids must not
/// contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SlotKey {
    pub time_block_id: String,
    pub region_id: String,
}

impl SlotKey {
    pub fn new(time_block_id: &str, region_id: &str) -> Self {
        Self {
            time_block_id: time_block_id.to_string(),
            region_id: region_id.to_string(),
        }
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        format!("{}/{}", key.time_block_id, key.region_id)
    }
}

impl TryFrom<String> for SlotKey {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.split_once('/') {
            Some((block, region)) if !block.is_empty() && !region.is_empty() => {
                Ok(SlotKey::new(block, region))
            }
            _ => Err(format!("invalid slot key: {raw}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SlotState {
    pub available: bool,
    pub booked: u32,
    pub capacity: u32,
}

impl SlotState {
    pub fn open(capacity: u32) -> Self {
        Self {
            available: true,
            booked: 0,
            capacity,
        }
    }
}

impl Default for SlotState {
    fn default() -> Self {
        Self::open(DEFAULT_SLOT_CAPACITY)
    }
}

/// Partial update for one slot. `None` fields keep their stored value.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SlotPatch {
    pub available: Option<bool>,
    pub booked: Option<u32>,
    pub capacity: Option<u32>,
}

impl SlotPatch {
    pub fn available(flag: bool) -> Self {
        Self {
            available: Some(flag),
            ..Default::default()
        }
    }

    pub fn booked(count: u32) -> Self {
        Self {
            booked: Some(count),
            ..Default::default()
        }
    }

    pub fn capacity(ceiling: u32) -> Self {
        Self {
            capacity: Some(ceiling),
            ..Default::default()
        }
    }

    pub fn apply(&self, state: &mut SlotState) {
        if let Some(flag) = self.available {
            state.available = flag;
        }
        if let Some(count) = self.booked {
            state.booked = count;
        }
        if let Some(ceiling) = self.capacity {
            state.capacity = ceiling;
        }
    }
}

/// Per-date record of open/closed and booked/capacity state for every
/// (time block, region) pair valid on that date.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AvailabilityDay {
    pub date: NaiveDate,
    pub day_type: DayType,
    /// Optimistic-concurrency sequence, bumped by the store on every write.
    pub version: u64,
    pub slots: BTreeMap<SlotKey, SlotState>,
}

impl AvailabilityDay {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            day_type: DayType::of(date),
            version: 0,
            slots: BTreeMap::new(),
        }
    }

    /// A fresh record with a fully-open grid for every catalog pair that
    /// matches the date's day type.
    pub fn seeded(
        date: NaiveDate,
        blocks: &[TimeBlock],
        regions: &[Region],
        capacity: u32,
    ) -> Self {
        let day_type = DayType::of(date);
        let mut slots = BTreeMap::new();
        for block in blocks.iter().filter(|b| b.day_type == day_type) {
            for region in regions {
                slots.insert(SlotKey::new(&block.id, &region.id), SlotState::open(capacity));
            }
        }
        Self {
            date,
            day_type,
            version: 0,
            slots,
        }
    }

    pub fn slot(&self, time_block_id: &str, region_id: &str) -> Option<&SlotState> {
        self.slots.get(&SlotKey::new(time_block_id, region_id))
    }
}
