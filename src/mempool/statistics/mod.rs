//! Pool statistics tracking

pub mod pool_stats;

pub use pool_stats::{AtomicPoolStats, PoolStats};
