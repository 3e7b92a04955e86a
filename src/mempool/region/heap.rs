//! Heap-reserved backing region
//!
//! Reserves `capacity * stride` bytes from the global allocator with
//! cache-line alignment. The region owns that memory and returns it on drop;
//! pools built on top only compute addresses inside it.

use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ptr::NonNull;

use super::descriptor::BackingRegion;
use super::layout::{MemorySegment, ObjectLayout};
use crate::mempool::traits::types_and_enums::PoolOperationError;

/// Alignment of the region base
pub const REGION_ALIGN: usize = 64;

#[derive(Debug)]
pub struct HeapRegion {
    base: NonNull<u8>,
    memory_layout: Layout,
    object_layout: ObjectLayout,
    capacity: u32,
}

// The region never reads or writes object memory itself; callers that receive
// object addresses are responsible for synchronizing access to them.
unsafe impl Send for HeapRegion {}
unsafe impl Sync for HeapRegion {}

impl HeapRegion {
    pub fn new(object_layout: ObjectLayout, capacity: u32) -> Result<Self, PoolOperationError> {
        if capacity == 0 {
            return Err(PoolOperationError::configuration_error(
                "Region capacity must be non-zero",
            ));
        }
        let size = object_layout
            .region_size(capacity)
            .ok_or_else(|| PoolOperationError::configuration_error("Region size overflows"))?;
        let memory_layout = Layout::from_size_align(size, REGION_ALIGN)
            .map_err(|_| PoolOperationError::configuration_error("Invalid region layout"))?;

        // SAFETY: `memory_layout` has a non-zero size (stride and capacity are non-zero).
        let ptr = unsafe { alloc_zeroed(memory_layout) };
        let base = NonNull::new(ptr).ok_or_else(|| {
            PoolOperationError::configuration_error("System memory exhausted reserving region")
        })?;

        log::debug!(
            "Reserved heap region of {} objects ({} bytes) at {:#x}",
            capacity,
            size,
            base.as_ptr() as usize
        );

        Ok(Self {
            base,
            memory_layout,
            object_layout,
            capacity,
        })
    }

    /// Base address of the reserved memory
    pub fn base_address(&self) -> usize {
        self.base.as_ptr() as usize
    }

    /// Total reserved bytes
    pub fn len(&self) -> usize {
        self.memory_layout.size()
    }

    pub fn is_empty(&self) -> bool {
        self.memory_layout.size() == 0
    }
}

impl BackingRegion for HeapRegion {
    fn layout(&self) -> ObjectLayout {
        self.object_layout
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn first_segment(&self) -> Option<MemorySegment> {
        Some(MemorySegment::new(self.base_address(), self.len()))
    }
}

impl Drop for HeapRegion {
    fn drop(&mut self) {
        // SAFETY: `base` was returned by `alloc_zeroed` with `memory_layout`.
        unsafe { dealloc(self.base.as_ptr(), self.memory_layout) };
    }
}
