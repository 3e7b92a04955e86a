//! Producer/consumer position counters
//!
//! Each side of the ring owns one `HeadTail`. `head` is where the next
//! reservation starts; `tail` is where completed operations end. Positions are
//! free-running `u32` counters and only ever compared by wrapping difference.

use std::sync::atomic::{AtomicU32, Ordering};

use crossbeam_utils::Backoff;

#[derive(Debug)]
pub(super) struct HeadTail {
    head: AtomicU32,
    tail: AtomicU32,
}

impl HeadTail {
    pub(super) const fn new(position: u32) -> Self {
        Self {
            head: AtomicU32::new(position),
            tail: AtomicU32::new(position),
        }
    }

    /// Published end position, synchronizing with the last completed operation
    #[inline(always)]
    pub(super) fn tail(&self) -> &AtomicU32 {
        &self.tail
    }

    /// Claim `n` positions starting at the current head.
    ///
    /// `available` maps `(head, opposite_tail)` to the number of positions this
    /// side may claim, or `None` when the two loads raced and the snapshot is
    /// not usable. Returns the first claimed position, or the available count
    /// when fewer than `n` positions can be claimed.
    #[inline]
    pub(super) fn reserve<F>(&self, n: u32, opposite_tail: &AtomicU32, available: F) -> Result<u32, u32>
    where
        F: Fn(u32, u32) -> Option<u32>,
    {
        let backoff = Backoff::new();
        loop {
            let old_head = self.head.load(Ordering::Acquire);
            let tail = opposite_tail.load(Ordering::Acquire);

            let Some(room) = available(old_head, tail) else {
                backoff.spin();
                continue;
            };
            if n > room {
                return Err(room);
            }

            match self.head.compare_exchange_weak(
                old_head,
                old_head.wrapping_add(n),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(old_head),
                Err(_) => backoff.spin(),
            }
        }
    }

    /// Publish `[start, start + n)` once every earlier reservation has published.
    ///
    /// Tails advance strictly in reservation order, so each batch occupies a
    /// contiguous run of positions.
    #[inline]
    pub(super) fn publish(&self, start: u32, n: u32) {
        let backoff = Backoff::new();
        // Acquire so our release below carries earlier publishers' writes along.
        while self.tail.load(Ordering::Acquire) != start {
            backoff.snooze();
        }
        self.tail.store(start.wrapping_add(n), Ordering::Release);
    }
}
