/*!
 * Merge Run
 *
 * Reduces a key's pending values to one delivered value plus an untouched
 * remainder.
 *
 * The accumulator starts as the first value and absorbs its successors in
 * arrival order. The first failed merge ends the run for good: every value
 * from that point on goes to the remainder, even those that would merge,
 * so per-key order is never violated.
 */

use crate::message::Mergeable;

/// Fold the maximal mergeable prefix of `pending`
///
/// Returns the accumulator and the remainder (in original order), or `None`
/// if `pending` is empty.
pub fn merge_run<M: Mergeable>(pending: Vec<M>) -> Option<(M, Vec<M>)> {
    let mut items = pending.into_iter();
    let mut accumulator = items.next()?;
    let mut remainder = Vec::new();

    for next in items.by_ref() {
        if !accumulator.merge(&next) {
            remainder.push(next);
            break;
        }
    }
    remainder.extend(items);

    Some((accumulator, remainder))
}
