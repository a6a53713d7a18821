/*!
 * Synchronized Queue
 * FIFO queue guarded by a single mutex, baseline for `LockFreeQueue`
 */

use super::super::traits::PickQueue;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Mutex-guarded FIFO queue
///
/// Every operation takes the same lock, so throughput is bounded by lock
/// hand-off under contention. Exposes the same `put`/`pick` surface as the
/// lock-free queue.
pub struct SynchronizedQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> SynchronizedQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    pub fn put(&self, value: T) {
        self.items.lock().push_back(value);
    }

    pub fn pick(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> Default for SynchronizedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> PickQueue<T> for SynchronizedQueue<T> {
    #[inline]
    fn put(&self, value: T) {
        SynchronizedQueue::put(self, value)
    }

    #[inline]
    fn pick(&self) -> Option<T> {
        SynchronizedQueue::pick(self)
    }

    #[inline]
    fn len(&self) -> usize {
        SynchronizedQueue::len(self)
    }

    fn name(&self) -> &'static str {
        "synchronized"
    }
}
