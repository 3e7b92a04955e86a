//! Simple public API for the indexed object pool
//!
//! `IdxPool` wires a heap-reserved backing region, a slot ring and an indexed
//! pool together from one [`PoolConfig`]. Embeddings that manage their own
//! memory or rings use [`IndexedPool`] and [`SlotRing`] directly instead.

use std::sync::Arc;

use crate::mempool::config::PoolConfig;
use crate::mempool::indexed::IndexedPool;
use crate::mempool::region::{BackingRegion, HeapRegion};
use crate::mempool::ring::SlotRing;
use crate::mempool::statistics::PoolStats;
use crate::mempool::traits::types_and_enums::PoolOperationError;

/// Ready-to-use object pool over its own heap region
///
/// Cloning is cheap: clones share the same pool, ring and region.
#[derive(Clone)]
pub struct IdxPool {
    pool: Arc<IndexedPool>,
    ring: Arc<SlotRing>,
    region: Arc<HeapRegion>,
}

impl IdxPool {
    /// Create new pool builder with fluent configuration
    pub fn builder() -> IdxPoolBuilder {
        IdxPoolBuilder::new()
    }

    /// Allocate `count` objects, all or none
    pub fn allocate(&self, count: usize) -> Result<Vec<usize>, PoolOperationError> {
        self.pool.allocate(count)
    }

    /// Allocate `out.len()` objects into `out` without heap allocation
    pub fn allocate_into(&self, out: &mut [usize]) -> Result<(), PoolOperationError> {
        self.pool.allocate_into(out)
    }

    /// Return objects to the pool, all or none
    pub fn free(&self, addresses: &[usize]) -> Result<(), PoolOperationError> {
        self.pool.free(addresses)
    }

    /// Number of free objects (snapshot)
    pub fn live_count(&self) -> u32 {
        self.pool.live_count()
    }

    /// Operation counters
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn capacity(&self) -> u32 {
        self.pool.capacity()
    }

    pub fn name(&self) -> &str {
        self.pool.name()
    }

    /// Base address of the backing region
    pub fn base_address(&self) -> usize {
        self.region.base_address()
    }

    /// Underlying indexed pool
    pub fn pool(&self) -> &Arc<IndexedPool> {
        &self.pool
    }

    /// Free-list ring
    pub fn ring(&self) -> &Arc<SlotRing> {
        &self.ring
    }
}

impl std::fmt::Debug for IdxPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdxPool")
            .field("pool", &self.pool)
            .field("ring", &self.ring)
            .finish()
    }
}

/// Fluent builder for IdxPool configuration
#[derive(Debug, Clone, Default)]
pub struct IdxPoolBuilder {
    config: PoolConfig,
}

impl IdxPoolBuilder {
    /// Create new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: PoolConfig) -> Self {
        Self { config }
    }

    /// Set pool name
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set number of objects
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set payload size per object
    pub fn element_size(mut self, size: usize) -> Self {
        self.config.element_size = size;
        self
    }

    /// Set header size per object
    pub fn header_size(mut self, size: usize) -> Self {
        self.config.header_size = size;
        self
    }

    /// Set trailer size per object
    pub fn trailer_size(mut self, size: usize) -> Self {
        self.config.trailer_size = size;
        self
    }

    /// Set the per-call batch bound
    pub fn max_bulk(mut self, max_bulk: usize) -> Self {
        self.config.max_bulk = max_bulk;
        self
    }

    /// Set ring capacity (defaults to the pool capacity)
    pub fn ring_capacity(mut self, capacity: u32) -> Self {
        self.config.ring_capacity = Some(capacity);
        self
    }

    /// Configuration the builder currently holds
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Build the pool with every object free
    pub fn build(self) -> Result<IdxPool, PoolOperationError> {
        let config = self.config;
        config.validate()?;

        let region = Arc::new(HeapRegion::new(config.layout()?, config.capacity)?);
        let ring = Arc::new(SlotRing::new(config.effective_ring_capacity())?);

        let shared_region: Arc<dyn BackingRegion> = region.clone();
        let pool = IndexedPool::initialize(shared_region, Some(Arc::clone(&ring)))?
            .with_name(config.name.clone())
            .with_max_bulk(config.max_bulk)?;
        pool.populate()?;

        log::debug!(
            "Built pool '{}' ({} objects, ring '{}')",
            config.name,
            config.capacity,
            config.ring_name()
        );

        Ok(IdxPool {
            pool: Arc::new(pool),
            ring,
            region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mempool::config::MAX_BULK_SIZE;
    use crate::mempool::traits::types_and_enums::PoolState;
    use std::collections::HashSet;

    #[test]
    fn test_builder_produces_full_pool() {
        let pool = IdxPool::builder()
            .name("rx")
            .capacity(128)
            .element_size(256)
            .header_size(64)
            .build()
            .unwrap();

        assert_eq!(pool.name(), "rx");
        assert_eq!(pool.capacity(), 128);
        assert_eq!(pool.live_count(), 128);
        assert_eq!(pool.pool().state(), PoolState::Active);
        assert_eq!(pool.pool().base_address(), Some(pool.base_address()));
        assert_eq!(pool.pool().max_bulk(), MAX_BULK_SIZE);
    }

    #[test]
    fn test_builder_allocates_distinct_payloads() {
        let pool = IdxPool::builder()
            .capacity(64)
            .element_size(100)
            .header_size(28)
            .build()
            .unwrap();

        let mut out = [0usize; 64];
        pool.allocate_into(&mut out).unwrap();
        let unique: HashSet<usize> = out.iter().copied().collect();
        assert_eq!(unique.len(), 64);
        for addr in &out {
            assert_eq!((addr - pool.base_address()) % 128, 28);
        }
        assert_eq!(pool.live_count(), 0);

        pool.free(&out).unwrap();
        assert_eq!(pool.live_count(), 64);
        assert_eq!(pool.stats().objects_allocated, 64);
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        assert!(matches!(
            IdxPool::builder().capacity(0).build(),
            Err(PoolOperationError::ConfigurationError(_))
        ));
        assert!(
            IdxPool::builder()
                .capacity(16)
                .ring_capacity(8)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_builder_from_json_config() {
        let config = PoolConfig::from_json_str(
            r#"{ "name": "json", "capacity": 8, "element_size": 64, "max_bulk": 4, "ring_capacity": 16 }"#,
        )
        .unwrap();
        let pool = IdxPoolBuilder::from_config(config).build().unwrap();

        assert_eq!(pool.ring().capacity(), 16);
        assert_eq!(pool.live_count(), 8);
        assert!(matches!(
            pool.allocate(5),
            Err(PoolOperationError::BatchTooLarge { requested: 5, max: 4 })
        ));
    }

    #[test]
    fn test_oversized_allocate_returns_error() {
        let pool = IdxPool::builder().capacity(4).element_size(64).build().unwrap();
        assert!(matches!(
            pool.allocate(usize::MAX / 8),
            Err(PoolOperationError::BatchTooLarge { max: MAX_BULK_SIZE, .. })
        ));
        assert_eq!(pool.live_count(), 4);
    }

    #[test]
    fn test_clones_share_state() {
        let pool = IdxPool::builder().capacity(4).element_size(64).build().unwrap();
        let other = pool.clone();
        let addrs = other.allocate(3).unwrap();
        assert_eq!(pool.live_count(), 1);
        pool.free(&addrs).unwrap();
        assert_eq!(other.live_count(), 4);
    }
}
