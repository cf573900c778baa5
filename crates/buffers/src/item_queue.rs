//! Bounded in-memory working queue
//!
//! The fast path of an operation buffer: a fixed-capacity FIFO guarded by a
//! single mutex. The front of the queue is always index 0 - removal compacts
//! the remaining items toward the front rather than maintaining a circular
//! index, so `get`/`take` always see items in insertion order.
//!
//! No operation performs I/O or blocks while holding the lock.

use parking_lot::Mutex;

/// Fixed-capacity FIFO of pending items
///
/// The process loop uses the peek-then-confirm protocol: `get` copies the
/// leading items without removing them, and `remove` drops them only after
/// the sink confirms the batch. `take` is the destructive variant used by
/// the shutdown flush.
#[derive(Debug)]
pub struct ItemQueue<T> {
    /// Queue contents, front at index 0
    items: Mutex<Vec<T>>,

    /// Maximum number of resident items
    limit: usize,
}

impl<T> ItemQueue<T> {
    /// Create a queue holding at most `limit` items
    pub fn new(limit: usize) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            limit,
        }
    }

    /// Append one item
    ///
    /// Returns the item back if the queue is full (no mutation).
    pub fn add(&self, item: T) -> Result<(), T> {
        let mut items = self.items.lock();
        if items.len() >= self.limit {
            return Err(item);
        }
        items.push(item);
        Ok(())
    }

    /// Append a batch, all-or-nothing
    ///
    /// Returns the batch back if it does not fit in the spare capacity;
    /// no partial insert occurs.
    pub fn add_all(&self, batch: Vec<T>) -> Result<(), Vec<T>> {
        let mut items = self.items.lock();
        if batch.len() > self.limit - items.len() {
            return Err(batch);
        }
        items.extend(batch);
        Ok(())
    }

    /// Remove and return up to `max` leading items in insertion order
    pub fn take(&self, max: usize) -> Vec<T> {
        let mut items = self.items.lock();
        let count = max.min(items.len());
        items.drain(..count).collect()
    }

    /// Drop up to `count` leading items, returning the number dropped
    ///
    /// Used after a `get` once the caller has confirmed successful
    /// processing of the peeked batch.
    pub fn remove(&self, count: usize) -> usize {
        let mut items = self.items.lock();
        let count = count.min(items.len());
        items.drain(..count);
        count
    }

    /// Number of items currently resident
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Maximum number of resident items
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Remaining capacity
    pub fn spare_capacity(&self) -> usize {
        self.limit - self.items.lock().len()
    }
}

impl<T: Clone> ItemQueue<T> {
    /// Copy up to `max` leading items without removing them (peek)
    pub fn get(&self, max: usize) -> Vec<T> {
        let items = self.items.lock();
        let count = max.min(items.len());
        items[..count].to_vec()
    }
}

#[cfg(test)]
#[path = "item_queue_test.rs"]
mod item_queue_test;
