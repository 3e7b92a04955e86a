//! idxpool prelude - convenient imports for users
//!
//! This module provides everything users need to build a pool or embed the
//! indexed pool over their own memory.

// Re-export the public API
pub use crate::idxpool::{IdxPool, IdxPoolBuilder};

// Re-export error and state types callers match on
pub use crate::mempool::traits::{ErrorCategory, PoolOperationError, PoolState, RecoveryHint, RingError};

// Re-export the building blocks for custom embeddings
pub use crate::mempool::config::{MAX_BULK_SIZE, PoolConfig};
pub use crate::mempool::indexed::{AddressTranslator, IndexedPool};
pub use crate::mempool::region::{BackingRegion, HeapRegion, MemorySegment, ObjectLayout, RegionDescriptor};
pub use crate::mempool::ring::{SlotIndex, SlotRing};
pub use crate::mempool::statistics::PoolStats;
pub use crate::mempool::traits::MempoolOps;
