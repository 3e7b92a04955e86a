//! Fixed-size object pooling over a contiguous backing region
//!
//! - [`ring`] - bounded MPMC ring of free slot indices
//! - [`indexed`] - pool translating object addresses to slot indices
//! - [`region`] - backing region contract and implementations
//! - [`config`] - serde-backed pool configuration
//! - [`statistics`] - lock-free operation counters
//! - [`traits`] - error types and the driver ops trait

pub mod config;
pub mod indexed;
pub mod region;
pub mod ring;
pub mod statistics;
pub mod traits;
