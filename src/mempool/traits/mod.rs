//! Error types and driver traits shared by the ring and the pool

pub mod ops;
pub mod types_and_enums;

pub use ops::MempoolOps;
pub use types_and_enums::{ErrorCategory, PoolOperationError, PoolState, RecoveryHint, RingError};
