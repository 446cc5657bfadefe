#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-capacity FIFO used for every message crossing the simulation boundary.
//!
//! Producers never block: pushing into a full queue evicts the oldest entry.
//! Consumers may wait for a bounded amount of time for data to arrive. Each
//! queue instance is meant for one producer and one consumer; separate
//! message categories get separate queues.

use std::{
    collections::VecDeque,
    num::NonZeroUsize,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

/// Bounded, thread-safe FIFO with drop-oldest overflow.
#[derive(Debug)]
pub struct BoundedEventQueue<T> {
    capacity: NonZeroUsize,
    items: Mutex<VecDeque<T>>,
    available: Condvar,
    dropped: AtomicU64,
}

impl<T> BoundedEventQueue<T> {
    /// Creates an empty queue holding at most `capacity` items.
    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity.get())),
            available: Condvar::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Maximum number of items retained by the queue.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Enqueues `item`, evicting the oldest entry when the queue is full.
    pub fn push(&self, item: T) {
        {
            let mut items = self.items.lock();
            if items.len() >= self.capacity.get() {
                let _ = items.pop_front();
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(capacity = self.capacity.get(), total, "evicted oldest entry");
            }
            items.push_back(item);
        }
        let _ = self.available.notify_one();
    }

    /// Dequeues the oldest item, waiting at most `timeout` for one to arrive.
    ///
    /// A zero timeout never blocks.
    pub fn pop(&self, timeout: Duration) -> Option<T> {
        let mut items = self.items.lock();
        if let Some(item) = items.pop_front() {
            return Some(item);
        }
        if timeout.is_zero() {
            return None;
        }

        let deadline = Instant::now() + timeout;
        loop {
            if self.available.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front();
            }
            if let Some(item) = items.pop_front() {
                return Some(item);
            }
        }
    }

    /// Removes every item currently queued without blocking.
    pub fn drain_ready(&self) -> Vec<T> {
        self.items.lock().drain(..).collect()
    }

    /// Instantaneous emptiness check. Not suitable for flow control.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Instantaneous item count. Not suitable for flow control.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Number of entries evicted by overflow since creation.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
