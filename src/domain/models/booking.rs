use chrono::{DateTime, NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only record of one confirmed appointment. The matrix's booked
/// counters are denormalized from these; the ledger itself is the source
/// of truth for demand.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub date: NaiveDate,
    pub time_block_id: String,
    pub region_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_note: Option<String>,
    pub confirmation_token: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub date: NaiveDate,
    pub time_block_id: String,
    pub region_id: String,
    pub name: String,
    pub phone: String,
    pub note: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            date: params.date,
            time_block_id: params.time_block_id,
            region_id: params.region_id,
            customer_name: params.name,
            customer_phone: params.phone,
            customer_note: params.note,
            confirmation_token: token,
            created_at: Utc::now(),
        }
    }
}
