//! Bounded multi-producer/multi-consumer ring of slot indices
//!
//! The ring stores `SlotIndex` values in a power-of-two array addressed by
//! free-running counters. Callers claim a run of positions with a single CAS
//! on their side's head, copy their batch, then publish it by advancing their
//! side's tail in claim order. A batch is therefore transferred entirely or
//! not at all, and concurrent batches never interleave.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crossbeam_utils::CachePadded;

use super::head_tail::HeadTail;
use crate::mempool::traits::types_and_enums::{RingError, batch_len};

/// Compact identifier of one object position within a backing region
pub type SlotIndex = u32;

/// Bounded MPMC ring of free slot indices with all-or-nothing bulk transfer
pub struct SlotRing {
    /// Producer positions (enqueue side)
    prod: CachePadded<HeadTail>,
    /// Consumer positions (dequeue side)
    cons: CachePadded<HeadTail>,
    /// Index storage; length is a power of two
    slots: Box<[AtomicU32]>,
    /// Storage length - 1
    mask: u32,
    /// Usable capacity (may be smaller than the storage length)
    capacity: u32,
}

impl SlotRing {
    /// Largest capacity a ring can be created with
    pub const MAX_CAPACITY: u32 = 1 << 31;

    /// Create an empty ring able to hold exactly `capacity` indices
    pub fn new(capacity: u32) -> Result<Self, RingError> {
        if capacity == 0 || capacity > Self::MAX_CAPACITY {
            return Err(RingError::InvalidCapacity {
                requested: capacity,
            });
        }

        let size = capacity.next_power_of_two();
        let slots = (0..size).map(|_| AtomicU32::new(0)).collect::<Box<[_]>>();

        Ok(Self {
            prod: CachePadded::new(HeadTail::new(0)),
            cons: CachePadded::new(HeadTail::new(0)),
            slots,
            mask: size - 1,
            capacity,
        })
    }

    /// Create a full ring holding every index in `0..capacity`, in order
    pub fn with_all_slots(capacity: u32) -> Result<Self, RingError> {
        let size = capacity.checked_next_power_of_two().unwrap_or(0);
        if capacity == 0 || capacity > Self::MAX_CAPACITY || size == 0 {
            return Err(RingError::InvalidCapacity {
                requested: capacity,
            });
        }

        let slots = (0..size)
            .map(|idx| AtomicU32::new(if idx < capacity { idx } else { 0 }))
            .collect::<Box<[_]>>();

        Ok(Self {
            prod: CachePadded::new(HeadTail::new(capacity)),
            cons: CachePadded::new(HeadTail::new(0)),
            slots,
            mask: size - 1,
            capacity,
        })
    }

    /// Insert every index in `indices`, or none of them.
    ///
    /// Fails with [`RingError::InsufficientSpace`] when fewer than
    /// `indices.len()` positions are free; the ring is then unchanged.
    pub fn enqueue(&self, indices: &[SlotIndex]) -> Result<(), RingError> {
        let n = batch_len(indices.len());
        if n == 0 {
            return Ok(());
        }
        if n > self.capacity {
            return Err(RingError::InsufficientSpace {
                requested: n,
                available: self.free_count(),
            });
        }

        let capacity = self.capacity;
        let start = self
            .prod
            .reserve(n, self.cons.tail(), |head, cons_tail| {
                let used = head.wrapping_sub(cons_tail);
                (used <= capacity).then(|| capacity - used)
            })
            .map_err(|available| RingError::InsufficientSpace {
                requested: n,
                available,
            })?;

        for (offset, &index) in indices.iter().enumerate() {
            let pos = start.wrapping_add(offset as u32) & self.mask;
            self.slots[pos as usize].store(index, Ordering::Relaxed);
        }

        self.prod.publish(start, n);
        Ok(())
    }

    /// Remove exactly `out.len()` indices into `out`, or none.
    ///
    /// Fails with [`RingError::InsufficientElements`] when fewer indices are
    /// resident; the ring and `out` are then unchanged.
    pub fn dequeue(&self, out: &mut [SlotIndex]) -> Result<(), RingError> {
        let n = batch_len(out.len());
        if n == 0 {
            return Ok(());
        }
        if n > self.capacity {
            return Err(RingError::InsufficientElements {
                requested: n,
                available: self.count(),
            });
        }

        let capacity = self.capacity;
        let start = self
            .cons
            .reserve(n, self.prod.tail(), |head, prod_tail| {
                let entries = prod_tail.wrapping_sub(head);
                (entries <= capacity).then_some(entries)
            })
            .map_err(|available| RingError::InsufficientElements {
                requested: n,
                available,
            })?;

        for (offset, slot) in out.iter_mut().enumerate() {
            let pos = start.wrapping_add(offset as u32) & self.mask;
            *slot = self.slots[pos as usize].load(Ordering::Relaxed);
        }

        self.cons.publish(start, n);
        Ok(())
    }

    /// Dequeue `count` indices into a freshly allocated vector
    pub fn dequeue_vec(&self, count: usize) -> Result<Vec<SlotIndex>, RingError> {
        if count > self.capacity as usize {
            return Err(RingError::InsufficientElements {
                requested: batch_len(count),
                available: self.count(),
            });
        }
        let mut out = vec![0; count];
        self.dequeue(&mut out)?;
        Ok(out)
    }

    /// Number of resident indices.
    ///
    /// A snapshot only: concurrent producers and consumers may change it
    /// before the caller looks at the result.
    pub fn count(&self) -> u32 {
        let cons_tail = self.cons.tail().load(Ordering::Acquire);
        let prod_tail = self.prod.tail().load(Ordering::Acquire);
        prod_tail.wrapping_sub(cons_tail).min(self.capacity)
    }

    /// Number of free positions (same caveat as [`count`](Self::count))
    pub fn free_count(&self) -> u32 {
        self.capacity - self.count()
    }

    /// Usable capacity fixed at creation
    #[inline(always)]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Whether the ring currently holds no indices
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Whether the ring currently has no free positions
    pub fn is_full(&self) -> bool {
        self.count() == self.capacity
    }
}

impl fmt::Debug for SlotRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotRing")
            .field("capacity", &self.capacity)
            .field("storage", &self.slots.len())
            .field("count", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_new_ring_is_empty() {
        let ring = SlotRing::new(6).unwrap();
        assert_eq!(ring.capacity(), 6);
        assert_eq!(ring.count(), 0);
        assert_eq!(ring.free_count(), 6);
        assert!(ring.is_empty());
        assert_eq!(ring.slots.len(), 8);
    }

    #[test]
    fn test_invalid_capacity() {
        assert_eq!(
            SlotRing::new(0).unwrap_err(),
            RingError::InvalidCapacity { requested: 0 }
        );
        assert!(SlotRing::new(SlotRing::MAX_CAPACITY + 1).is_err());
        assert!(SlotRing::with_all_slots(0).is_err());
    }

    #[test]
    fn test_with_all_slots_yields_every_index_in_order() {
        let ring = SlotRing::with_all_slots(5).unwrap();
        assert!(ring.is_full());
        assert_eq!(ring.dequeue_vec(5).unwrap(), vec![0, 1, 2, 3, 4]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_fifo_within_single_thread() {
        let ring = SlotRing::new(8).unwrap();
        ring.enqueue(&[7, 3, 5]).unwrap();
        ring.enqueue(&[1]).unwrap();

        let mut out = [0; 2];
        ring.dequeue(&mut out).unwrap();
        assert_eq!(out, [7, 3]);
        assert_eq!(ring.dequeue_vec(2).unwrap(), vec![5, 1]);
    }

    #[test]
    fn test_enqueue_is_all_or_nothing() {
        let ring = SlotRing::new(4).unwrap();
        ring.enqueue(&[0, 1, 2]).unwrap();

        let err = ring.enqueue(&[3, 4]).unwrap_err();
        assert_eq!(
            err,
            RingError::InsufficientSpace {
                requested: 2,
                available: 1
            }
        );
        assert_eq!(ring.count(), 3);

        ring.enqueue(&[3]).unwrap();
        assert!(ring.is_full());
        assert_eq!(ring.dequeue_vec(4).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_dequeue_is_all_or_nothing() {
        let ring = SlotRing::new(4).unwrap();
        ring.enqueue(&[9, 8]).unwrap();

        let mut out = [u32::MAX; 3];
        let err = ring.dequeue(&mut out).unwrap_err();
        assert_eq!(
            err,
            RingError::InsufficientElements {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(out, [u32::MAX; 3]);
        assert_eq!(ring.count(), 2);
    }

    #[test]
    fn test_batch_larger_than_capacity_fails() {
        let ring = SlotRing::with_all_slots(4).unwrap();
        assert!(matches!(
            ring.dequeue_vec(5),
            Err(RingError::InsufficientElements { requested: 5, .. })
        ));
        assert_eq!(
            ring.dequeue_vec(usize::MAX / 8).unwrap_err(),
            RingError::InsufficientElements {
                requested: u32::MAX,
                available: 4
            }
        );
        assert!(ring.is_full());
        let empty = SlotRing::new(4).unwrap();
        assert!(matches!(
            empty.enqueue(&[0, 1, 2, 3, 4]),
            Err(RingError::InsufficientSpace { requested: 5, .. })
        ));
    }

    #[test]
    fn test_zero_length_batches_are_noops() {
        let ring = SlotRing::new(2).unwrap();
        ring.enqueue(&[]).unwrap();
        ring.dequeue(&mut []).unwrap();
        assert_eq!(ring.count(), 0);
    }

    #[test]
    fn test_wrap_around_many_cycles() {
        // Non power-of-two capacity exercises the exact-size bound.
        let ring = SlotRing::new(5).unwrap();
        let mut next = 0u32;
        for round in 0..10_000u32 {
            let n = (round % 5) + 1;
            let batch: Vec<u32> = (next..next + n).collect();
            ring.enqueue(&batch).unwrap();
            assert_eq!(ring.dequeue_vec(n as usize).unwrap(), batch);
            next = next.wrapping_add(n);
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_concurrent_transfer_conserves_indices() {
        const CAPACITY: u32 = 1024;
        const THREADS: usize = 8;
        const ROUNDS: usize = 2_000;

        let ring = SlotRing::with_all_slots(CAPACITY).unwrap();
        let barrier = Barrier::new(THREADS);

        thread::scope(|s| {
            for t in 0..THREADS {
                let ring = &ring;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    let mut buf = vec![0u32; 1 + t * 3];
                    for _ in 0..ROUNDS {
                        if ring.dequeue(&mut buf).is_ok() {
                            ring.enqueue(&buf).unwrap();
                        }
                    }
                });
            }
        });

        let all = ring.dequeue_vec(CAPACITY as usize).unwrap();
        let unique: HashSet<u32> = all.iter().copied().collect();
        assert_eq!(unique.len(), CAPACITY as usize);
        assert!(all.iter().all(|&idx| idx < CAPACITY));
        assert!(ring.is_empty());
    }

    #[test]
    fn test_concurrent_batches_stay_contiguous() {
        // Linearizable, not FIFO across calls: each producer's batch must come
        // out as one unbroken run, in whatever order the batches landed.
        const PRODUCERS: u32 = 4;
        const BATCHES: u32 = 200;
        const BATCH: u32 = 8;

        let ring = SlotRing::new(PRODUCERS * BATCHES * BATCH).unwrap();
        thread::scope(|s| {
            for p in 0..PRODUCERS {
                let ring = &ring;
                s.spawn(move || {
                    for b in 0..BATCHES {
                        let base = (p * BATCHES + b) * BATCH;
                        let batch: Vec<u32> = (base..base + BATCH).collect();
                        ring.enqueue(&batch).unwrap();
                    }
                });
            }
        });

        let all = ring.dequeue_vec((PRODUCERS * BATCHES * BATCH) as usize).unwrap();
        for chunk in all.chunks(BATCH as usize) {
            assert_eq!(chunk[0] % BATCH, 0);
            for (i, &v) in chunk.iter().enumerate() {
                assert_eq!(v, chunk[0] + i as u32);
            }
        }
    }
}
