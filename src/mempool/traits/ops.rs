//! Driver operations table
//!
//! A mempool driver is plugged into the object-management layer through this
//! trait. `enqueue` returns objects to the driver's free store and `dequeue`
//! takes them out, both as all-or-nothing batches.

use super::types_and_enums::PoolOperationError;

/// Object-store operations a mempool driver exposes
pub trait MempoolOps: Send + Sync {
    /// Driver name the store is registered under
    fn name(&self) -> &'static str;

    /// Return `objects` to the store
    fn enqueue(&self, objects: &[usize]) -> Result<(), PoolOperationError>;

    /// Fill `objects` with free objects taken from the store
    fn dequeue(&self, objects: &mut [usize]) -> Result<(), PoolOperationError>;

    /// Number of objects currently held by the store
    fn get_count(&self) -> u32;
}
