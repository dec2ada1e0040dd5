//! Reuse container for short-lived combat records.
//!
//! Projectiles, floating damage text and explosion fragments live for a
//! handful of frames each. [`ObjectPool`] keeps released records on a bounded
//! free list so that the next acquire reuses their storage (including any heap
//! buffers they own) instead of allocating.
//!
//! # Ownership
//!
//! Records are moved out of the pool on [`ObjectPool::acquire`] and moved back
//! in on [`ObjectPool::release`]. A record that has been handed out therefore
//! cannot also sit on the free list: the in-use / free invariant is enforced
//! by the borrow checker rather than by bookkeeping.
//!
//! # Example
//!
//! ```
//! use skirmish_core::pool::{ObjectPool, Recyclable};
//!
//! #[derive(Default)]
//! struct Spark {
//!     ttl: f32,
//! }
//!
//! impl Recyclable for Spark {}
//!
//! let mut pool = ObjectPool::new(4);
//! let spark = pool.acquire(|s: &mut Spark| s.ttl = 0.5);
//! assert_eq!(pool.stats().in_use, 1);
//!
//! pool.release(spark);
//! let again = pool.acquire(|s: &mut Spark| s.ttl = 1.0);
//! assert_eq!(again.ttl, 1.0);
//! assert_eq!(pool.stats().reused, 1);
//! ```

use serde::{Deserialize, Serialize};

/// A record that can be cleared and handed out again by an [`ObjectPool`].
///
/// `clear` must leave no trace of the previous logical object. The default
/// implementation replaces the value with `Self::default()`; types owning
/// heap buffers should override it to clear those buffers in place.
pub trait Recyclable: Default {
    /// Resets every field to its blank state.
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Counters describing pool activity since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Total number of acquire calls.
    pub acquired: u64,
    /// Acquires that had to create a fresh record.
    pub created: u64,
    /// Acquires served from the free list.
    pub reused: u64,
    /// Total number of releases of a real record.
    pub released: u64,
    /// Releases discarded because the free list was full.
    pub dropped: u64,
    /// Records currently handed out.
    pub in_use: usize,
    /// Highest `in_use` observed.
    pub peak_in_use: usize,
    /// Largest free list length observed.
    pub peak_pool_size: usize,
}

/// Bounded free list of reusable records.
#[derive(Debug)]
pub struct ObjectPool<T> {
    free: Vec<T>,
    capacity: usize,
    stats: PoolStats,
}

impl<T: Recyclable> ObjectPool<T> {
    /// Creates an empty pool whose free list holds at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
            stats: PoolStats::default(),
        }
    }

    /// Hands out a cleared record initialised by `init`.
    ///
    /// A free record is reused when one is available, otherwise a new one is
    /// created.
    pub fn acquire(&mut self, init: impl FnOnce(&mut T)) -> T {
        let mut record = match self.free.pop() {
            Some(record) => {
                self.stats.reused += 1;
                record
            }
            None => {
                self.stats.created += 1;
                T::default()
            }
        };
        record.clear();
        init(&mut record);

        self.stats.acquired += 1;
        self.stats.in_use += 1;
        self.stats.peak_in_use = self.stats.peak_in_use.max(self.stats.in_use);
        record
    }

    /// Returns a record to the pool.
    ///
    /// `None` is ignored. When the free list is already at capacity the
    /// record is dropped so memory stays bounded.
    pub fn release(&mut self, record: impl Into<Option<T>>) {
        let Some(record) = record.into() else {
            return;
        };

        self.stats.released += 1;
        self.stats.in_use = self.stats.in_use.saturating_sub(1);

        if self.free.len() >= self.capacity {
            self.stats.dropped += 1;
            return;
        }
        self.free.push(record);
        self.stats.peak_pool_size = self.stats.peak_pool_size.max(self.free.len());
    }

    /// Returns the activity counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Returns the number of records waiting on the free list.
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Returns the free-list capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
