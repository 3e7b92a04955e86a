//! Indexed object pool
//!
//! The pool hands out fixed-size objects carved from a backing region and
//! keeps the free ones as compact slot indices in an injected [`SlotRing`].
//! Every allocate/free batch is translated between addresses and indices and
//! transferred to or from the ring as a single all-or-nothing operation.

use std::fmt;
use std::sync::Arc;

use arrayvec::ArrayVec;
use once_cell::sync::OnceCell;

use super::translation::AddressTranslator;
use crate::mempool::config::MAX_BULK_SIZE;
use crate::mempool::region::{BackingRegion, ObjectLayout};
use crate::mempool::ring::{SlotIndex, SlotRing};
use crate::mempool::statistics::{AtomicPoolStats, PoolStats};
use crate::mempool::traits::MempoolOps;
use crate::mempool::traits::types_and_enums::{PoolOperationError, PoolState};

/// Stack buffer for one batch of slot indices
type Staging = ArrayVec<SlotIndex, MAX_BULK_SIZE>;

/// Fixed-capacity object pool with an index-based free-list
pub struct IndexedPool {
    /// Pool name for identification
    name: String,
    /// Memory the objects are carved from (not owned by the pool)
    region: Arc<dyn BackingRegion>,
    /// Object layout cached from the region
    layout: ObjectLayout,
    /// Number of objects in the region
    capacity: u32,
    /// Free-list; `None` until bound and after teardown
    ring: Option<Arc<SlotRing>>,
    /// Set by `teardown`, never cleared
    released: bool,
    /// Base address and stride, resolved once on first use
    translator: OnceCell<AddressTranslator>,
    /// Largest batch accepted per call
    max_bulk: usize,
    /// Operation counters
    stats: AtomicPoolStats,
}

impl IndexedPool {
    /// Driver name reported through [`MempoolOps`]
    pub const OPS_NAME: &'static str = "indexed";

    /// Create an unbound pool over `region`
    pub fn new(region: Arc<dyn BackingRegion>) -> Self {
        let layout = region.layout();
        let capacity = region.capacity();
        Self {
            name: Self::OPS_NAME.to_string(),
            region,
            layout,
            capacity,
            ring: None,
            released: false,
            translator: OnceCell::new(),
            max_bulk: MAX_BULK_SIZE,
            stats: AtomicPoolStats::new(),
        }
    }

    /// Create a pool and bind it to `ring` in one step.
    ///
    /// Fails with `ConfigurationError` when no ring is supplied.
    pub fn initialize(
        region: Arc<dyn BackingRegion>,
        ring: Option<Arc<SlotRing>>,
    ) -> Result<Self, PoolOperationError> {
        let ring = ring.ok_or_else(|| {
            PoolOperationError::configuration_error(
                "a slot ring must be supplied before the pool can be used",
            )
        })?;
        let mut pool = Self::new(region);
        pool.bind_ring(ring)?;
        Ok(pool)
    }

    /// Set the pool name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Lower the per-call batch bound (at most [`MAX_BULK_SIZE`])
    pub fn with_max_bulk(mut self, max_bulk: usize) -> Result<Self, PoolOperationError> {
        if max_bulk == 0 || max_bulk > MAX_BULK_SIZE {
            return Err(PoolOperationError::configuration_error(format!(
                "max_bulk {} outside 1..={}",
                max_bulk, MAX_BULK_SIZE
            )));
        }
        self.max_bulk = max_bulk;
        Ok(self)
    }

    /// Attach the free-list ring, moving `Uninitialized -> Bound`
    pub fn bind_ring(&mut self, ring: Arc<SlotRing>) -> Result<(), PoolOperationError> {
        if self.released {
            return Err(PoolOperationError::configuration_error(format!(
                "pool '{}' has been torn down",
                self.name
            )));
        }
        if ring.capacity() < self.capacity {
            return Err(PoolOperationError::configuration_error(format!(
                "ring capacity {} is below pool capacity {}",
                ring.capacity(),
                self.capacity
            )));
        }

        log::debug!(
            "Pool '{}' bound to ring of capacity {} ({} objects, stride {})",
            self.name,
            ring.capacity(),
            self.capacity,
            self.layout.stride()
        );
        self.ring = Some(ring);
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        if self.released {
            PoolState::Released
        } else if self.ring.is_none() {
            PoolState::Uninitialized
        } else if self.translator.get().is_some() {
            PoolState::Active
        } else {
            PoolState::Bound
        }
    }

    /// Return objects to the pool.
    ///
    /// The whole batch is validated before anything reaches the ring: one
    /// foreign or misaligned address rejects the batch with `InvalidAddress`,
    /// and a ring without room for all of it yields `OutOfBufferSpace`.
    ///
    /// Double frees are not detected. When the ring is larger than the pool,
    /// freeing an object that is already free succeeds and leaves its index
    /// in the ring twice; the caller must only free what it allocated.
    pub fn free(&self, addresses: &[usize]) -> Result<(), PoolOperationError> {
        let ring = self.bound_ring()?;
        if addresses.is_empty() {
            return Ok(());
        }
        self.check_batch(addresses.len())?;
        let translator = self.translator()?;

        let mut staging = Staging::new();
        for &address in addresses {
            match translator.index_of(address) {
                Ok(index) => staging.push(index),
                Err(err) => {
                    self.stats.record_invalid_address();
                    return Err(err);
                }
            }
        }

        ring.enqueue(&staging).map_err(|err| {
            self.stats.record_free_failure();
            PoolOperationError::from(err)
        })?;

        self.stats.record_free(staging.len());
        log::trace!("Pool '{}' freed {} objects", self.name, staging.len());
        Ok(())
    }

    /// Fill `out` with freshly allocated object addresses, all or none.
    ///
    /// Allocation-free: indices are staged on the stack.
    pub fn allocate_into(&self, out: &mut [usize]) -> Result<(), PoolOperationError> {
        let ring = self.bound_ring()?;
        if out.is_empty() {
            return Ok(());
        }
        self.check_batch(out.len())?;
        // Resolve before touching the ring so a resolution failure cannot strand indices.
        let translator = self.translator()?;

        let mut staging = Staging::new();
        staging.extend(std::iter::repeat_n(0, out.len()));
        ring.dequeue(&mut staging).map_err(|err| {
            self.stats.record_allocation_failure();
            PoolOperationError::from(err)
        })?;

        for (slot, &index) in out.iter_mut().zip(staging.iter()) {
            *slot = translator.address_of(index);
        }

        self.stats.record_allocation(out.len());
        log::trace!("Pool '{}' allocated {} objects", self.name, out.len());
        Ok(())
    }

    /// Allocate `count` objects into a new vector
    pub fn allocate(&self, count: usize) -> Result<Vec<usize>, PoolOperationError> {
        self.bound_ring()?;
        self.check_batch(count)?;
        let mut out = vec![0; count];
        self.allocate_into(&mut out)?;
        Ok(out)
    }

    /// Hand every object of the region to the ring.
    ///
    /// Meant for pool setup, before the pool is shared. Fails with
    /// `OutOfBufferSpace` without enqueuing anything if the ring cannot take
    /// all of them.
    pub fn populate(&self) -> Result<(), PoolOperationError> {
        let ring = self.bound_ring()?;
        self.translator()?;

        let available = ring.free_count();
        if available < self.capacity {
            self.stats.record_free_failure();
            return Err(PoolOperationError::OutOfBufferSpace {
                requested: self.capacity,
                available,
            });
        }

        let mut staging = Staging::new();
        let mut next: SlotIndex = 0;
        while next < self.capacity {
            let end = next.saturating_add(self.max_bulk as SlotIndex).min(self.capacity);
            staging.clear();
            staging.extend(next..end);
            ring.enqueue(&staging)?;
            self.stats.record_free(staging.len());
            next = end;
        }

        log::debug!("Pool '{}' populated with {} objects", self.name, self.capacity);
        Ok(())
    }

    /// Number of free objects resident in the ring (snapshot).
    ///
    /// Zero when no ring is bound.
    pub fn live_count(&self) -> u32 {
        self.ring.as_ref().map_or(0, |ring| ring.count())
    }

    /// Drop the pool's reference to its ring, moving to `Released`.
    ///
    /// Neither the region nor the ring storage is freed here: both are owned
    /// by the embedding layer.
    pub fn teardown(&mut self) {
        if self.ring.take().is_some() {
            log::debug!("Pool '{}' released its ring", self.name);
        }
        self.released = true;
    }

    /// Slot index of the object at `address`
    pub fn index_of(&self, address: usize) -> Result<SlotIndex, PoolOperationError> {
        self.translator()?.index_of(address)
    }

    /// Payload address of the object at `index`
    pub fn address_of(&self, index: SlotIndex) -> Result<usize, PoolOperationError> {
        if index >= self.capacity {
            return Err(PoolOperationError::invalid_index(index, self.capacity));
        }
        Ok(self.translator()?.address_of(index))
    }

    /// Base address, once resolved
    pub fn base_address(&self) -> Option<usize> {
        self.translator.get().map(AddressTranslator::base_address)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn layout(&self) -> ObjectLayout {
        self.layout
    }

    pub fn max_bulk(&self) -> usize {
        self.max_bulk
    }

    /// The bound ring, if any
    pub fn ring(&self) -> Option<&Arc<SlotRing>> {
        self.ring.as_ref()
    }

    /// Snapshot of the operation counters
    pub fn stats(&self) -> PoolStats {
        self.stats.snapshot()
    }

    fn bound_ring(&self) -> Result<&SlotRing, PoolOperationError> {
        let state = self.state();
        match &self.ring {
            Some(ring) if state.accepts_operations() => Ok(&**ring),
            _ if state == PoolState::Released => Err(PoolOperationError::configuration_error(
                format!("pool '{}' has been torn down", self.name),
            )),
            _ => Err(PoolOperationError::configuration_error(format!(
                "pool '{}' used before a slot ring was bound",
                self.name
            ))),
        }
    }

    fn check_batch(&self, len: usize) -> Result<(), PoolOperationError> {
        if len > self.max_bulk {
            self.stats.record_oversized_batch();
            return Err(PoolOperationError::batch_too_large(len, self.max_bulk));
        }
        Ok(())
    }

    /// Resolve the base address exactly once, `Bound -> Active`
    fn translator(&self) -> Result<&AddressTranslator, PoolOperationError> {
        self.translator.get_or_try_init(|| {
            let translator = AddressTranslator::resolve(self.region.as_ref()).map_err(|err| {
                log::error!("Pool '{}' cannot resolve its base address: {}", self.name, err);
                err
            })?;
            log::debug!(
                "Pool '{}' resolved base address {:#x}",
                self.name,
                translator.base_address()
            );
            Ok(translator)
        })
    }
}

impl MempoolOps for IndexedPool {
    fn name(&self) -> &'static str {
        Self::OPS_NAME
    }

    fn enqueue(&self, objects: &[usize]) -> Result<(), PoolOperationError> {
        self.free(objects)
    }

    fn dequeue(&self, objects: &mut [usize]) -> Result<(), PoolOperationError> {
        self.allocate_into(objects)
    }

    fn get_count(&self) -> u32 {
        self.live_count()
    }
}

impl fmt::Debug for IndexedPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedPool")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("capacity", &self.capacity)
            .field("layout", &self.layout)
            .field("base_address", &self.base_address())
            .field("live_count", &self.live_count())
            .finish()
    }
}
