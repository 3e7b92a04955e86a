//! idxpool - Fixed-capacity indexed object pool
//!
//! Objects live in one contiguous region at a fixed stride. The pool hands out
//! payload addresses, but internally tracks free objects by their slot index
//! in a bounded multi-producer/multi-consumer ring.
//!
//! # Features
//!
//! - **All-or-nothing batches**: bulk allocate and free never transfer part of a batch
//! - **Lock-free ring**: CAS reservation with in-order publication per side
//! - **O(1) translation**: address <-> index is pure arithmetic once the base is resolved
//! - **Pluggable memory**: any [`BackingRegion`](mempool::region::BackingRegion) can back a pool
//! - **JSON configuration**: serde-backed [`PoolConfig`](mempool::config::PoolConfig)

// Public API modules
pub mod idxpool;
pub mod prelude;

// Pool implementation modules - region and ring traits are public for embedders
pub mod mempool;

// Re-export the public API at the crate root for convenience
pub use idxpool::{IdxPool, IdxPoolBuilder};
pub use prelude::*;
