//! Backing regions - the memory a pool carves fixed-size objects from

pub mod descriptor;
pub mod heap;
pub mod layout;

pub use descriptor::{BackingRegion, RegionDescriptor};
pub use heap::HeapRegion;
pub use layout::{MemorySegment, ObjectLayout};
