//! Address <-> slot index translation
//!
//! Objects live at `base + index * stride`; the address handed to callers
//! skips the object header, so it is `base + index * stride + header_size`.
//! Translation is pure arithmetic over values fixed at resolution time.

use crate::mempool::region::{BackingRegion, ObjectLayout};
use crate::mempool::ring::SlotIndex;
use crate::mempool::traits::types_and_enums::PoolOperationError;

/// Resolved translation parameters of one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressTranslator {
    base_address: usize,
    stride: usize,
    header_size: usize,
    capacity: u32,
}

impl AddressTranslator {
    /// Resolve translation parameters from the region's first memory segment.
    ///
    /// Fails with `InternalInvariantViolation` when the region reports no
    /// segment, or one that cannot hold every object.
    pub fn resolve(region: &dyn BackingRegion) -> Result<Self, PoolOperationError> {
        let layout = region.layout();
        let capacity = region.capacity();

        let segment = region.first_segment().ok_or_else(|| {
            PoolOperationError::invariant_violation("backing region reports no memory segment")
        })?;
        let span = layout.region_size(capacity).ok_or_else(|| {
            PoolOperationError::invariant_violation("backing region size overflows")
        })?;
        if segment.len < span || segment.addr.checked_add(span).is_none() {
            return Err(PoolOperationError::invariant_violation(format!(
                "first memory segment ({} bytes at {:#x}) cannot hold {} objects of stride {}",
                segment.len,
                segment.addr,
                capacity,
                layout.stride()
            )));
        }

        Ok(Self::new(segment.addr, layout, capacity))
    }

    /// Build a translator for an already known base address
    pub fn new(base_address: usize, layout: ObjectLayout, capacity: u32) -> Self {
        Self {
            base_address,
            stride: layout.stride(),
            header_size: layout.header_size(),
            capacity,
        }
    }

    #[inline(always)]
    pub fn base_address(&self) -> usize {
        self.base_address
    }

    /// Payload address of the object at `index`
    #[inline(always)]
    pub fn address_of(&self, index: SlotIndex) -> usize {
        self.base_address + index as usize * self.stride + self.header_size
    }

    /// Slot index of the object whose payload starts at `address`
    #[inline]
    pub fn index_of(&self, address: usize) -> Result<SlotIndex, PoolOperationError> {
        let offset = address
            .checked_sub(self.base_address + self.header_size)
            .ok_or(PoolOperationError::invalid_address(
                address,
                "below the first object of the region",
            ))?;
        if offset % self.stride != 0 {
            return Err(PoolOperationError::invalid_address(
                address,
                "not on an object stride boundary",
            ));
        }

        let index = offset / self.stride;
        if index >= self.capacity as usize {
            return Err(PoolOperationError::invalid_address(
                address,
                "beyond the last object of the region",
            ));
        }
        Ok(index as SlotIndex)
    }
}
