/*!
 * Lock-Free FIFO Queue
 *
 * Unbounded multi-producer multi-consumer queue built as a singly-linked list
 * with atomic head and tail slots.
 *
 * ## Structure
 *
 * The list always starts with a sentinel node whose value slot is empty.
 * `head` points at the sentinel, `tail` at the last node (or one behind it
 * while an insertion is in flight):
 *
 * ```text
 * head -> [sentinel] -> [a] -> [b] -> [c] <- tail
 * ```
 *
 * - `put` links the new node after the observed tail with a CAS on `next`,
 *   then swings `tail` forward. A thread that finds `tail` lagging helps
 *   advance it before retrying, so the list is always traversable from head.
 * - `pick` CASes `head` from the sentinel to its successor. The successor
 *   becomes the new sentinel and its value is moved out to the winner.
 *
 * ## Memory Reclamation
 *
 * A picked sentinel may still be dereferenced by threads that loaded `head`
 * before the CAS. Nodes are therefore retired through crossbeam-epoch and
 * only freed once every pinned thread has moved past the current epoch.
 *
 * ## Progress
 *
 * Both operations are lock-free, not wait-free: a CAS loop may retry an
 * unbounded number of times under contention, but some thread always makes
 * progress.
 */

use super::super::traits::PickQueue;
use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicIsize, Ordering};

struct Node<T> {
    /// Uninitialized for the sentinel, moved out when the node becomes sentinel
    value: MaybeUninit<T>,
    next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    fn sentinel() -> Self {
        Self {
            value: MaybeUninit::uninit(),
            next: Atomic::null(),
        }
    }

    fn with_value(value: T) -> Self {
        Self {
            value: MaybeUninit::new(value),
            next: Atomic::null(),
        }
    }
}

/// Cache-line aligned atomic slot to keep head and tail off the same line
#[repr(C, align(64))]
struct Slot<T>(Atomic<Node<T>>);

/// Lock-free FIFO queue
///
/// # Performance
///
/// - **put**: one allocation plus two CAS operations when uncontended
/// - **pick**: one CAS plus a deferred free
/// - **len**: relaxed counter, approximate under concurrency
///
/// # Example
///
/// ```
/// use conflux_engine::core::sync::LockFreeQueue;
///
/// let queue = LockFreeQueue::new();
/// queue.put(1);
/// queue.put(2);
///
/// assert_eq!(queue.pick(), Some(1));
/// assert_eq!(queue.pick(), Some(2));
/// assert_eq!(queue.pick(), None);
/// ```
pub struct LockFreeQueue<T> {
    head: Slot<T>,
    tail: Slot<T>,
    len: AtomicIsize,
}

// Safety: values are moved between threads but never shared, and node memory
// is reclaimed through epochs only
unsafe impl<T: Send> Send for LockFreeQueue<T> {}
unsafe impl<T: Send> Sync for LockFreeQueue<T> {}

impl<T> LockFreeQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        // Safety: the queue is not shared yet, no other thread can observe the sentinel
        let sentinel = Owned::new(Node::sentinel()).into_shared(unsafe { epoch::unprotected() });

        Self {
            head: Slot(Atomic::from(sentinel)),
            tail: Slot(Atomic::from(sentinel)),
            len: AtomicIsize::new(0),
        }
    }

    /// Append a value at the tail (lock-free)
    pub fn put(&self, value: T) {
        let guard = &epoch::pin();
        let node = Owned::new(Node::with_value(value)).into_shared(guard);

        loop {
            let tail = self.tail.0.load(Ordering::Acquire, guard);
            // Safety: tail is never null and is protected by the guard
            let tail_ref = unsafe { tail.deref() };
            let next = tail_ref.next.load(Ordering::Acquire, guard);

            if !next.is_null() {
                // Another put linked a node but has not swung tail yet
                let _ = self.tail.0.compare_exchange(
                    tail,
                    next,
                    Ordering::Release,
                    Ordering::Relaxed,
                    guard,
                );
                continue;
            }

            if tail_ref
                .next
                .compare_exchange(
                    Shared::null(),
                    node,
                    Ordering::Release,
                    Ordering::Relaxed,
                    guard,
                )
                .is_ok()
            {
                // Failure means a helper already advanced tail past us
                let _ = self.tail.0.compare_exchange(
                    tail,
                    node,
                    Ordering::Release,
                    Ordering::Relaxed,
                    guard,
                );
                self.len.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
    }

    /// Remove the value at the head without blocking
    ///
    /// Returns `None` when the queue is empty.
    pub fn pick(&self) -> Option<T> {
        let guard = &epoch::pin();
        self.pick_with(guard)
    }

    fn pick_with(&self, guard: &Guard) -> Option<T> {
        loop {
            let head = self.head.0.load(Ordering::Acquire, guard);
            // Safety: head is never null and is protected by the guard
            let head_ref = unsafe { head.deref() };
            let next = head_ref.next.load(Ordering::Acquire, guard);
            // Safety: a non-null next is protected by the same guard
            let next_ref = unsafe { next.as_ref() }?;

            let tail = self.tail.0.load(Ordering::Relaxed, guard);
            if tail == head {
                // Never let head overtake tail
                let _ = self.tail.0.compare_exchange(
                    tail,
                    next,
                    Ordering::Release,
                    Ordering::Relaxed,
                    guard,
                );
            }

            if self
                .head
                .0
                .compare_exchange(head, next, Ordering::Release, Ordering::Relaxed, guard)
                .is_ok()
            {
                // Safety: winning the head CAS grants exclusive ownership of the
                // successor's value; the successor is now the sentinel and its
                // slot is never read again
                let value = unsafe { next_ref.value.assume_init_read() };
                // Safety: head is unreachable from the queue after the CAS
                unsafe { guard.defer_destroy(head) };
                self.len.fetch_sub(1, Ordering::Relaxed);
                return Some(value);
            }
        }
    }

    /// Approximate number of queued values
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed).max(0) as usize
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        let guard = &epoch::pin();
        let head = self.head.0.load(Ordering::Acquire, guard);
        // Safety: head is never null and is protected by the guard
        unsafe { head.deref() }
            .next
            .load(Ordering::Acquire, guard)
            .is_null()
    }
}

impl<T> Default for LockFreeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for LockFreeQueue<T> {
    fn drop(&mut self) {
        // Safety: `&mut self` guarantees no other thread holds a reference
        unsafe {
            let guard = epoch::unprotected();
            while self.pick_with(guard).is_some() {}

            let sentinel = self.head.0.load(Ordering::Relaxed, guard);
            drop(sentinel.into_owned());
        }
    }
}

impl<T: Send> PickQueue<T> for LockFreeQueue<T> {
    #[inline]
    fn put(&self, value: T) {
        LockFreeQueue::put(self, value)
    }

    #[inline]
    fn pick(&self) -> Option<T> {
        LockFreeQueue::pick(self)
    }

    #[inline]
    fn len(&self) -> usize {
        LockFreeQueue::len(self)
    }

    fn is_empty(&self) -> bool {
        LockFreeQueue::is_empty(self)
    }

    fn name(&self) -> &'static str {
        "lockfree"
    }
}
