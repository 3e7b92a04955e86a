//! Indexed object pool - address translation over a slot ring free-list
//!
//! Objects are identified by their slot index inside the backing region; the
//! pool converts between those indices and payload addresses on every
//! allocate and free, delegating free-slot tracking to a [`SlotRing`].
//!
//! [`SlotRing`]: crate::mempool::ring::SlotRing

pub mod pool;
pub mod translation;

pub use pool::IndexedPool;
pub use translation::AddressTranslator;
