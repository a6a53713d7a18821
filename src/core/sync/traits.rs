/*!
 * Queue Traits
 *
 * Non-blocking FIFO contract implemented by every queue in this module.
 */

use crossbeam_queue::SegQueue;

/// Non-blocking multi-producer multi-consumer FIFO
///
/// Implementations must be:
/// - **Thread-safe**: `put` and `pick` may be called from any number of threads
/// - **Non-blocking**: `pick` returns `None` on an empty queue instead of waiting
/// - **Order-preserving**: items from one producer come out in submission order
pub trait PickQueue<T>: Send + Sync {
    /// Append an item at the tail
    fn put(&self, value: T);

    /// Remove the item at the head, `None` if the queue is empty
    fn pick(&self) -> Option<T>;

    /// Approximate number of queued items
    ///
    /// May be stale the instant it returns under concurrent access.
    fn len(&self) -> usize;

    /// Check if the queue is empty (approximate)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get queue name for benchmarks and diagnostics
    fn name(&self) -> &'static str;
}

/// crossbeam's segmented queue, used as an external reference point in benches
impl<T: Send> PickQueue<T> for SegQueue<T> {
    #[inline]
    fn put(&self, value: T) {
        self.push(value);
    }

    #[inline]
    fn pick(&self) -> Option<T> {
        self.pop()
    }

    #[inline]
    fn len(&self) -> usize {
        SegQueue::len(self)
    }

    fn name(&self) -> &'static str {
        "segqueue"
    }
}
