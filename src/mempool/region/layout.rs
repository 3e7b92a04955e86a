//! Object layout and memory segment descriptors

use serde::{Deserialize, Serialize};

use crate::mempool::traits::types_and_enums::PoolOperationError;

/// Per-object byte layout: `header | element | trailer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLayout {
    header_size: usize,
    element_size: usize,
    trailer_size: usize,
}

impl ObjectLayout {
    /// Build a layout, rejecting a zero or overflowing stride
    pub fn checked_new(
        header_size: usize,
        element_size: usize,
        trailer_size: usize,
    ) -> Result<Self, PoolOperationError> {
        let stride = header_size
            .checked_add(element_size)
            .and_then(|s| s.checked_add(trailer_size))
            .ok_or_else(|| PoolOperationError::configuration_error("Object stride overflows"))?;
        if stride == 0 {
            return Err(PoolOperationError::configuration_error(
                "Object stride must be non-zero",
            ));
        }

        Ok(Self {
            header_size,
            element_size,
            trailer_size,
        })
    }

    /// Layout of a headerless, trailerless object of `element_size` bytes
    pub fn element_only(element_size: usize) -> Result<Self, PoolOperationError> {
        Self::checked_new(0, element_size, 0)
    }

    /// Total per-object span
    #[inline(always)]
    pub fn stride(&self) -> usize {
        self.header_size + self.element_size + self.trailer_size
    }

    #[inline(always)]
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    #[inline(always)]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    #[inline(always)]
    pub fn trailer_size(&self) -> usize {
        self.trailer_size
    }

    /// Bytes needed for `capacity` objects, if representable
    pub fn region_size(&self, capacity: u32) -> Option<usize> {
        self.stride().checked_mul(capacity as usize)
    }
}

/// One contiguous chunk of memory backing a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemorySegment {
    pub addr: usize,
    pub len: usize,
}

impl MemorySegment {
    pub const fn new(addr: usize, len: usize) -> Self {
        Self { addr, len }
    }

    /// One past the last byte of the segment
    #[inline(always)]
    pub fn end(&self) -> usize {
        self.addr.saturating_add(self.len)
    }
}
