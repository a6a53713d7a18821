/*!
 * Merge Contract
 *
 * Minimal capability a payload exposes so the engine can coalesce it
 * without knowing its semantics.
 */

use std::fmt::Debug;
use std::hash::Hash;

/// A value that can absorb later values carrying the same key
///
/// Implementations must uphold:
/// - **Stable identity**: `key()` never changes after construction
/// - **All-or-nothing merge**: a failed `merge` leaves `self` untouched
/// - **Counting**: every successful `merge` increments `merge_count()` by one
///
/// The engine only mutates a value through `merge`, and only from the
/// consumer thread that holds the pending-store lock.
pub trait Mergeable: Send + 'static {
    /// Conflation group identifier
    type Key: Eq + Hash + Clone + Debug + Send + Sync + 'static;

    /// Accumulated content
    type Body: ?Sized;

    fn key(&self) -> &Self::Key;

    fn body(&self) -> &Self::Body;

    /// Number of successful folds into this value (starts at 0)
    fn merge_count(&self) -> usize;

    /// Whether at least one value was folded into this one
    #[inline]
    fn is_merged(&self) -> bool {
        self.merge_count() > 0
    }

    /// Payload-specific integrity check of the accumulated content
    fn is_valid(&self) -> bool;

    /// Try to fold `other` into `self`
    ///
    /// Returns `true` and mutates `self` on success, returns `false` and
    /// leaves `self` unchanged on failure. A `false` return is a grouping
    /// boundary, not an error.
    fn merge(&mut self, other: &Self) -> bool;
}
