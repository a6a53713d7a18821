/*!
 * Conflator Statistics
 * Relaxed atomic counters with a serializable snapshot
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of engine counters
///
/// Counters are read independently, so a snapshot taken under load is not a
/// consistent cut across fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflatorStats {
    /// Values accepted by `put`
    pub submitted: u64,
    /// Values moved from ingress into the pending store
    pub indexed: u64,
    /// Values returned by `take`
    pub delivered: u64,
    /// Successful folds performed during merge runs
    pub merges: u64,
    /// Takes that left a remainder and re-emitted a cursor
    pub republished: u64,
    /// Takes that found their key's list empty and waited
    ///
    /// Cursors are pushed under the store lock, so this stays 0 unless a
    /// token was duplicated.
    pub empty_wakeups: u64,
    /// Keys with pending values at snapshot time
    pub pending_keys: usize,
    /// Cursor tokens waiting for a consumer at snapshot time
    pub ready_keys: usize,
}

#[derive(Default)]
pub(crate) struct EngineCounters {
    submitted: AtomicU64,
    indexed: AtomicU64,
    delivered: AtomicU64,
    merges: AtomicU64,
    republished: AtomicU64,
    empty_wakeups: AtomicU64,
}

impl EngineCounters {
    #[inline]
    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_indexed(&self) {
        self.indexed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivery(&self, merges: usize, republished: bool, waited: bool) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.merges.fetch_add(merges as u64, Ordering::Relaxed);
        if republished {
            self.republished.fetch_add(1, Ordering::Relaxed);
        }
        if waited {
            self.empty_wakeups.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> ConflatorStats {
        ConflatorStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            indexed: self.indexed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            republished: self.republished.load(Ordering::Relaxed),
            empty_wakeups: self.empty_wakeups.load(Ordering::Relaxed),
            ..ConflatorStats::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_accounting() {
        let counters = EngineCounters::default();
        counters.record_submitted();
        counters.record_submitted();
        counters.record_indexed();
        counters.record_delivery(3, true, false);
        counters.record_delivery(0, false, true);

        let stats = counters.snapshot();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.indexed, 1);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.merges, 3);
        assert_eq!(stats.republished, 1);
        assert_eq!(stats.empty_wakeups, 1);
    }
}
