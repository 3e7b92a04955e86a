//! Canonical error types and classification enums for pool operations
//!
//! Every fallible pool and ring operation reports one of the enums below.
//! Errors are plain values: nothing in the core logs-and-swallows them or
//! retries on the caller's behalf.

use std::fmt;

use crate::mempool::ring::SlotIndex;

/// Error category for efficient classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Ring lacks room or elements for the batch
    Resource,
    /// Pool or ring misconfigured by the embedding layer
    Configuration,
    /// Caller handed in something the pool never produced
    InvalidInput,
    /// Internal invariant broken; pool unusable
    InvalidState,
}

/// Recovery hint for pool operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryHint {
    /// Retry later, the ring may have drained or refilled
    RetryBackoff,
    /// Split the batch into smaller ones
    SplitBatch,
    /// Fix the pool configuration before using it again
    Reconfigure,
    /// No recovery possible
    Fatal,
}

/// Slot ring errors
///
/// Ring bulk operations never transfer part of a batch; on any of these
/// errors the ring is exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// Fewer free positions than the enqueue batch needs
    InsufficientSpace { requested: u32, available: u32 },
    /// Fewer resident indices than the dequeue batch needs
    InsufficientElements { requested: u32, available: u32 },
    /// Requested capacity is zero or exceeds the ring's addressable range
    InvalidCapacity { requested: u32 },
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::InsufficientSpace {
                requested,
                available,
            } => write!(
                f,
                "Insufficient ring space: requested {}, available {}",
                requested, available
            ),
            RingError::InsufficientElements {
                requested,
                available,
            } => write!(
                f,
                "Insufficient ring elements: requested {}, available {}",
                requested, available
            ),
            RingError::InvalidCapacity { requested } => {
                write!(f, "Invalid ring capacity: {}", requested)
            }
        }
    }
}

impl std::error::Error for RingError {}

/// Pool operation error types
///
/// Mirrors the error kinds the pool contract exposes. `OutOfBufferSpace` is
/// the only recoverable one; the configuration and invariant variants mean
/// the embedding layer must act before the pool is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolOperationError {
    /// Ring not bound (or already released), or pool parameters rejected
    ConfigurationError(String),
    /// Backing region could not provide a base address
    InternalInvariantViolation(String),
    /// Ring lacks capacity (free) or elements (allocate) for the batch
    OutOfBufferSpace { requested: u32, available: u32 },
    /// Address passed to `free` does not name an object of this pool
    InvalidAddress { address: usize, reason: &'static str },
    /// Batch exceeds the pool's staging bound
    BatchTooLarge { requested: usize, max: usize },
    /// Slot index outside the pool
    InvalidIndex { index: SlotIndex, capacity: u32 },
}

impl fmt::Display for PoolOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolOperationError::ConfigurationError(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
            PoolOperationError::InternalInvariantViolation(msg) => {
                write!(f, "Internal invariant violation: {}", msg)
            }
            PoolOperationError::OutOfBufferSpace {
                requested,
                available,
            } => write!(
                f,
                "Out of buffer space: requested {}, available {}",
                requested, available
            ),
            PoolOperationError::InvalidAddress { address, reason } => {
                write!(f, "Invalid object address {:#x}: {}", address, reason)
            }
            PoolOperationError::BatchTooLarge { requested, max } => {
                write!(f, "Batch too large: {} objects (max {})", requested, max)
            }
            PoolOperationError::InvalidIndex { index, capacity } => {
                write!(f, "Invalid slot index {}: pool holds {} objects", index, capacity)
            }
        }
    }
}

impl std::error::Error for PoolOperationError {}

impl From<RingError> for PoolOperationError {
    fn from(err: RingError) -> Self {
        match err {
            RingError::InsufficientSpace {
                requested,
                available,
            }
            | RingError::InsufficientElements {
                requested,
                available,
            } => Self::OutOfBufferSpace {
                requested,
                available,
            },
            RingError::InvalidCapacity { .. } => Self::ConfigurationError(err.to_string()),
        }
    }
}

impl PoolOperationError {
    /// Create configuration error
    #[inline(always)]
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create internal invariant violation
    #[inline(always)]
    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InternalInvariantViolation(msg.into())
    }

    /// Create invalid address error
    #[inline(always)]
    pub fn invalid_address(address: usize, reason: &'static str) -> Self {
        Self::InvalidAddress { address, reason }
    }

    /// Create batch-too-large error
    #[inline(always)]
    pub fn batch_too_large(requested: usize, max: usize) -> Self {
        Self::BatchTooLarge { requested, max }
    }

    /// Create invalid index error
    #[inline(always)]
    pub fn invalid_index(index: SlotIndex, capacity: u32) -> Self {
        Self::InvalidIndex { index, capacity }
    }

    /// Error category for classification
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
            Self::InternalInvariantViolation(_) => ErrorCategory::InvalidState,
            Self::OutOfBufferSpace { .. } => ErrorCategory::Resource,
            Self::InvalidAddress { .. }
            | Self::InvalidIndex { .. }
            | Self::BatchTooLarge { .. } => ErrorCategory::InvalidInput,
        }
    }

    /// Get recovery hint for this error
    pub fn recovery_hint(&self) -> RecoveryHint {
        match self {
            Self::OutOfBufferSpace { .. } => RecoveryHint::RetryBackoff,
            Self::BatchTooLarge { .. } => RecoveryHint::SplitBatch,
            Self::ConfigurationError(_) => RecoveryHint::Reconfigure,
            Self::InternalInvariantViolation(_)
            | Self::InvalidAddress { .. }
            | Self::InvalidIndex { .. } => RecoveryHint::Fatal,
        }
    }

    /// Check if operation can be retried
    pub fn retryable(&self) -> bool {
        matches!(
            self.recovery_hint(),
            RecoveryHint::RetryBackoff | RecoveryHint::SplitBatch
        )
    }

    /// Get error code for programmatic handling
    pub fn code(&self) -> u32 {
        match self {
            Self::OutOfBufferSpace { .. } => 1001,
            Self::InvalidAddress { .. } => 2004,
            Self::BatchTooLarge { .. } => 2005,
            Self::InvalidIndex { .. } => 2006,
            Self::ConfigurationError(_) => 4001,
            Self::InternalInvariantViolation(_) => 8001,
        }
    }
}

/// Lifecycle of an [`IndexedPool`](crate::mempool::indexed::IndexedPool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolState {
    /// No ring attached yet
    Uninitialized,
    /// Ring attached, base address not resolved
    Bound,
    /// Base address resolved; translation is lock-free from here on
    Active,
    /// Ring reference dropped by `teardown`
    Released,
}

impl PoolState {
    /// Whether `free`/`allocate` may be issued in this state
    #[inline(always)]
    pub fn accepts_operations(self) -> bool {
        matches!(self, PoolState::Bound | PoolState::Active)
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolState::Uninitialized => "uninitialized",
            PoolState::Bound => "bound",
            PoolState::Active => "active",
            PoolState::Released => "released",
        };
        f.write_str(name)
    }
}

/// Convert a batch length to the ring's counter width, saturating
#[inline(always)]
pub(crate) fn batch_len(len: usize) -> SlotIndex {
    SlotIndex::try_from(len).unwrap_or(SlotIndex::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_errors_map_to_out_of_buffer_space() {
        let space: PoolOperationError = RingError::InsufficientSpace {
            requested: 8,
            available: 3,
        }
        .into();
        let elements: PoolOperationError = RingError::InsufficientElements {
            requested: 5,
            available: 0,
        }
        .into();

        assert_eq!(
            space,
            PoolOperationError::OutOfBufferSpace {
                requested: 8,
                available: 3
            }
        );
        assert_eq!(
            elements,
            PoolOperationError::OutOfBufferSpace {
                requested: 5,
                available: 0
            }
        );
        assert!(space.retryable());
    }

    #[test]
    fn test_invalid_capacity_is_configuration_error() {
        let err: PoolOperationError = RingError::InvalidCapacity { requested: 0 }.into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.recovery_hint(), RecoveryHint::Reconfigure);
        assert!(!err.retryable());
    }

    #[test]
    fn test_recovery_hints() {
        assert_eq!(
            PoolOperationError::batch_too_large(4096, 2048).recovery_hint(),
            RecoveryHint::SplitBatch
        );
        assert_eq!(
            PoolOperationError::invariant_violation("no segment").recovery_hint(),
            RecoveryHint::Fatal
        );
        assert!(!PoolOperationError::invalid_address(0x1001, "misaligned").retryable());
        assert_eq!(PoolOperationError::invalid_index(9, 4).code(), 2006);
    }

    #[test]
    fn test_display_formats_address_as_hex() {
        let err = PoolOperationError::invalid_address(0x10c1, "not on a stride boundary");
        assert_eq!(
            err.to_string(),
            "Invalid object address 0x10c1: not on a stride boundary"
        );
    }

    #[test]
    fn test_pool_state_acceptance() {
        assert!(!PoolState::Uninitialized.accepts_operations());
        assert!(PoolState::Bound.accepts_operations());
        assert!(PoolState::Active.accepts_operations());
        assert!(!PoolState::Released.accepts_operations());
    }
}
