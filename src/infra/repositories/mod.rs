pub mod memory_availability_repo;
pub mod memory_booking_repo;
pub mod memory_region_repo;
pub mod memory_store;
pub mod memory_time_block_repo;
