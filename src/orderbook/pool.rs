//! Fixed-capacity object pool for order nodes.
//!
//! ## Design
//!
//! The pool is a bounded slab: `capacity` slots are reserved up front and
//! the book never allocates per event after construction. `acquire` hands
//! out a stable `usize` key that remains valid until `release`; the slab's
//! internal free list makes both O(1).
//!
//! The capacity bound is deliberate. A full pool is not a condition to
//! recover from inside the engine: it means the venue sized the book
//! wrong, and the caller decides whether that is fatal.
//!
//! ## Errors
//!
//! All three [`PoolError`] variants indicate caller or implementation
//! bugs, never data-dependent conditions. The book escalates them with a
//! panic rather than threading them through the event path.

use slab::Slab;
use thiserror::Error;

use crate::orderbook::OrderNode;
use crate::types::Order;

/// Misuse of the pool. Every variant is a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No free slot remains; the book was sized too small.
    #[error("order pool exhausted (capacity {capacity})")]
    Exhausted { capacity: usize },

    /// The key does not address a slot of this pool.
    #[error("key {key} is outside the pool (capacity {capacity})")]
    AlienKey { key: usize, capacity: usize },

    /// The slot behind the key is already free (double release).
    #[error("key {key} is already free")]
    AlreadyFree { key: usize },
}

/// Bounded O(1) acquire/release store for [`OrderNode`].
#[derive(Debug)]
pub struct OrderPool {
    slots: Slab<OrderNode>,
    capacity: usize,
}

impl OrderPool {
    /// Create a pool with `capacity` slots, all free.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Slab::with_capacity(capacity),
            capacity,
        }
    }

    /// Take a free slot, initialize it with `order`, and return its key.
    pub fn acquire(&mut self, order: Order) -> Result<usize, PoolError> {
        if self.slots.len() == self.capacity {
            return Err(PoolError::Exhausted {
                capacity: self.capacity,
            });
        }
        Ok(self.slots.insert(OrderNode::new(order)))
    }

    /// Return a slot to the free set, yielding the order it held.
    ///
    /// The slab's occupancy map distinguishes an out-of-range key from a
    /// key whose slot is already free, so double releases are caught.
    pub fn release(&mut self, key: usize) -> Result<Order, PoolError> {
        if key >= self.capacity {
            return Err(PoolError::AlienKey {
                key,
                capacity: self.capacity,
            });
        }
        match self.slots.try_remove(key) {
            Some(node) => Ok(node.order),
            None => Err(PoolError::AlreadyFree { key }),
        }
    }

    #[inline]
    pub fn get(&self, key: usize) -> Option<&OrderNode> {
        self.slots.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: usize) -> Option<&mut OrderNode> {
        self.slots.get_mut(key)
    }

    /// Number of live (acquired) slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total slot count, fixed at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of free slots remaining.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.capacity - self.slots.len()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
