use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Weekday/weekend partition of the slot catalog. An availability day
/// carries slots only for blocks of its own day type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }
}

/// A recurring named appointment slot, e.g. "Morning 10:00". The `id` is
/// the stable join key availability records are built on.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimeBlock {
    pub id: String,
    pub start_time: NaiveTime,
    pub label: String,
    pub day_type: DayType,
    pub enabled_by_default: bool,
}

impl TimeBlock {
    pub fn new(id: &str, start_time: NaiveTime, label: &str, day_type: DayType) -> Self {
        Self {
            id: id.to_string(),
            start_time,
            label: label.to_string(),
            day_type,
            enabled_by_default: true,
        }
    }
}
