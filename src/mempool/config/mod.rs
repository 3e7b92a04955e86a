//! Pool configuration

pub mod types;

pub use types::{MAX_BULK_SIZE, PoolConfig, RING_NAME_PREFIX, RING_NAMESIZE};
