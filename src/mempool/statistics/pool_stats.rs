//! Lock-free pool operation counters
//!
//! Counters are updated with relaxed atomics on every bulk call and read as a
//! best-effort snapshot. They never influence allocation decisions.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;
use serde::{Deserialize, Serialize};

/// Atomic counters for one pool
#[derive(Debug, Default)]
pub struct AtomicPoolStats {
    /// Objects handed out by successful allocate calls
    objects_allocated: CachePadded<AtomicU64>,
    /// Objects returned by successful free calls
    objects_freed: CachePadded<AtomicU64>,
    /// Allocate calls rejected for lack of free objects
    allocation_failures: AtomicU64,
    /// Free calls rejected for lack of ring space
    free_failures: AtomicU64,
    /// Free calls rejected because of a foreign or misaligned address
    invalid_addresses: AtomicU64,
    /// Calls rejected for exceeding the staging bound
    oversized_batches: AtomicU64,
}

impl AtomicPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn record_allocation(&self, objects: usize) {
        self.objects_allocated
            .fetch_add(objects as u64, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_free(&self, objects: usize) {
        self.objects_freed.fetch_add(objects as u64, Ordering::Relaxed);
    }

    pub fn record_allocation_failure(&self) {
        self.allocation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_free_failure(&self) {
        self.free_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_address(&self) {
        self.invalid_addresses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_oversized_batch(&self) {
        self.oversized_batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of every counter
    pub fn snapshot(&self) -> PoolStats {
        PoolStats {
            objects_allocated: self.objects_allocated.load(Ordering::Relaxed),
            objects_freed: self.objects_freed.load(Ordering::Relaxed),
            allocation_failures: self.allocation_failures.load(Ordering::Relaxed),
            free_failures: self.free_failures.load(Ordering::Relaxed),
            invalid_addresses: self.invalid_addresses.load(Ordering::Relaxed),
            oversized_batches: self.oversized_batches.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`AtomicPoolStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub objects_allocated: u64,
    pub objects_freed: u64,
    pub allocation_failures: u64,
    pub free_failures: u64,
    pub invalid_addresses: u64,
    pub oversized_batches: u64,
}

impl PoolStats {
    /// Objects allocated minus objects freed since the counters started.
    ///
    /// Negative while the pool is being populated, since populating frees
    /// objects that were never allocated.
    pub fn net_outstanding(&self) -> i64 {
        self.objects_allocated as i64 - self.objects_freed as i64
    }

    /// Total calls rejected for any reason
    pub fn total_failures(&self) -> u64 {
        self.allocation_failures + self.free_failures + self.invalid_addresses + self.oversized_batches
    }
}
