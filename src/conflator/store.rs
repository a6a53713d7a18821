/*!
 * Pending Store
 *
 * Keyed map of not-yet-delivered values guarded by one coarse mutex.
 *
 * # Invariants
 *
 * - A key is present if and only if it has at least one pending value
 * - At most one cursor token per key is outstanding: a token is emitted on
 *   the 0 -> 1 transition of a key's list, and `drain` re-emits exactly one
 *   token when it leaves a remainder
 *
 * Both rules rely on the check-then-insert in `index` and the
 * remove-merge-reinsert in `drain` each running entirely under the lock.
 *
 * # Throughput Ceiling
 *
 * A single lock serializes every key. Sharding by key would lift that
 * ceiling at the cost of per-shard cursor bookkeeping.
 */

use super::merge::merge_run;
use super::transport::CursorQueue;
use crate::core::limits::{EMPTY_LIST_GRACE, PENDING_LIST_CAPACITY};
use crate::message::Mergeable;
use ahash::AHashMap;
use parking_lot::{Condvar, Mutex};
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Outcome of draining one key
pub(crate) struct Drained<M> {
    pub value: M,
    /// Values folded into `value`
    pub merged: usize,
    /// Whether a remainder was re-inserted with a fresh cursor
    pub republished: bool,
    /// Whether the list was empty on arrival and the consumer had to wait
    pub waited: bool,
}

pub(crate) struct PendingStore<M: Mergeable> {
    entries: Mutex<AHashMap<M::Key, Vec<M>>>,
    /// Signalled after every insertion, waiters check their own key
    filled: Condvar,
    /// Total pending values, maintained under the lock and read without it
    total: AtomicUsize,
}

impl<M: Mergeable> PendingStore<M> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(AHashMap::new()),
            filled: Condvar::new(),
            total: AtomicUsize::new(0),
        }
    }

    /// Append `value` under its key, emitting a cursor on the 0 -> 1 transition
    ///
    /// Returns `true` if a cursor was emitted.
    pub fn index(&self, value: M, cursors: &CursorQueue<M::Key>) -> bool {
        let mut entries = self.entries.lock();

        let emitted = match entries.entry(value.key().clone()) {
            Entry::Occupied(mut list) => {
                list.get_mut().push(value);
                false
            }
            Entry::Vacant(slot) => {
                cursors.push(slot.key().clone());
                let mut list = Vec::with_capacity(PENDING_LIST_CAPACITY);
                list.push(value);
                slot.insert(list);
                true
            }
        };
        self.total.fetch_add(1, Ordering::Relaxed);

        drop(entries);
        self.filled.notify_all();
        emitted
    }

    /// Remove the key's whole list, merge its leading run, re-insert the rest
    ///
    /// The caller must hold the key's cursor token. `index` pushes cursors
    /// under the lock, so the list is always present for a valid token. A
    /// missing list is waited on for `EMPTY_LIST_GRACE` and then treated as a
    /// duplicated token.
    pub fn drain(&self, key: &M::Key, cursors: &CursorQueue<M::Key>) -> Drained<M> {
        let mut entries = self.entries.lock();

        let waited = !entries.contains_key(key);
        if waited {
            warn!(key = ?key, "Cursor arrived before its pending list");
            self.filled.wait_while_for(
                &mut entries,
                |entries| !entries.contains_key(key),
                EMPTY_LIST_GRACE,
            );
        }

        let Some(pending) = entries.remove(key) else {
            panic!("cursor token for {:?} with no pending values", key);
        };
        let taken = pending.len();

        let Some((value, remainder)) = merge_run(pending) else {
            panic!("empty pending list stored for {:?}", key);
        };

        let republished = !remainder.is_empty();
        let delivered = taken - remainder.len();
        if republished {
            entries.insert(key.clone(), remainder);
            cursors.push(key.clone());
        }
        self.total.fetch_sub(delivered, Ordering::Relaxed);

        Drained {
            value,
            merged: delivered - 1,
            republished,
            waited,
        }
    }

    /// Total pending values across all keys (best effort)
    #[inline]
    pub fn len(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Number of keys with pending values
    pub fn key_count(&self) -> usize {
        self.entries.lock().len()
    }
}
