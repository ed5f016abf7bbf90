use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{
    AvailabilityRepository, BookingRepository, RegionRepository, TimeBlockRepository,
};

#[derive(Clone)]
pub struct SchedulerState {
    pub config: Config,
    pub time_block_repo: Arc<dyn TimeBlockRepository>,
    pub region_repo: Arc<dyn RegionRepository>,
    pub availability_repo: Arc<dyn AvailabilityRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
}
