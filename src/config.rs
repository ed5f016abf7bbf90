use std::env;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::domain::models::availability::DEFAULT_SLOT_CAPACITY;

#[derive(Clone)]
pub struct Config {
    /// Number of future days kept materialized in the availability store.
    pub window_days: u32,
    /// Capacity assigned to engine-seeded slots.
    pub default_capacity: u32,
    /// Operator timezone used to anchor the rolling window.
    pub timezone: String,
    /// Time limit for a single date's record during batch operations.
    pub record_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            window_days: env::var("SLOTGRID_WINDOW_DAYS")
                .unwrap_or_else(|_| "21".to_string())
                .parse()
                .expect("SLOTGRID_WINDOW_DAYS must be a number"),
            default_capacity: env::var("SLOTGRID_DEFAULT_CAPACITY")
                .unwrap_or_else(|_| DEFAULT_SLOT_CAPACITY.to_string())
                .parse()
                .expect("SLOTGRID_DEFAULT_CAPACITY must be a number"),
            timezone: env::var("SLOTGRID_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            record_timeout_ms: env::var("SLOTGRID_RECORD_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("SLOTGRID_RECORD_TIMEOUT_MS must be a number"),
        }
    }

    /// Current calendar date in the operator timezone.
    pub fn local_today(&self) -> NaiveDate {
        let tz: Tz = self.timezone.parse().unwrap_or(chrono_tz::UTC);
        chrono::Utc::now().with_timezone(&tz).date_naive()
    }
}
