//! Concurrent slot ring - bounded MPMC free-list of slot indices
//!
//! The ring is the leaf component of the pool: it knows nothing about
//! addresses, only about `SlotIndex` values and how many of them it holds.

mod head_tail;
pub mod slot_ring;

pub use slot_ring::{SlotIndex, SlotRing};
