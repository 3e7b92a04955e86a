//! Backing region contract and a non-owning descriptor implementation

use super::layout::{MemorySegment, ObjectLayout};

/// Contiguous memory a pool carves its objects from.
///
/// The region is owned by whoever reserved it; the pool only reads its
/// layout and the address of its first segment.
pub trait BackingRegion: Send + Sync {
    /// Per-object layout shared by every object in the region
    fn layout(&self) -> ObjectLayout;

    /// Number of objects the region holds
    fn capacity(&self) -> u32;

    /// First memory segment, whose address is the region base
    fn first_segment(&self) -> Option<MemorySegment>;
}

/// Description of memory reserved elsewhere
///
/// Nothing is allocated or freed here; the descriptor just reports what the
/// external allocator handed over. A descriptor with no segments models a
/// region whose memory has not been (or could not be) attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDescriptor {
    layout: ObjectLayout,
    capacity: u32,
    segments: Vec<MemorySegment>,
}

impl RegionDescriptor {
    pub fn new(layout: ObjectLayout, capacity: u32, segments: Vec<MemorySegment>) -> Self {
        Self {
            layout,
            capacity,
            segments,
        }
    }

    /// Descriptor for a single segment starting at `base`, sized for `capacity` objects
    pub fn contiguous(layout: ObjectLayout, capacity: u32, base: usize) -> Self {
        let len = layout.region_size(capacity).unwrap_or(usize::MAX);
        Self::new(layout, capacity, vec![MemorySegment::new(base, len)])
    }

    pub fn segments(&self) -> &[MemorySegment] {
        &self.segments
    }
}

impl BackingRegion for RegionDescriptor {
    fn layout(&self) -> ObjectLayout {
        self.layout
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn first_segment(&self) -> Option<MemorySegment> {
        self.segments.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_descriptor_reports_first_segment() {
        let layout = ObjectLayout::element_only(64).unwrap();
        let region = RegionDescriptor::contiguous(layout, 4, 0x1000);
        let seg = region.first_segment().unwrap();
        assert_eq!(seg.addr, 0x1000);
        assert_eq!(seg.end(), 0x1100);
        assert_eq!(region.capacity(), 4);
    }

    #[test]
    fn test_empty_descriptor_has_no_segment() {
        let layout = ObjectLayout::element_only(64).unwrap();
        let region = RegionDescriptor::new(layout, 4, Vec::new());
        assert!(region.first_segment().is_none());
        assert!(region.segments().is_empty());
    }
}
