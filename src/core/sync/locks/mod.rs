/*!
 * Lock-Based Primitives
 * Mutex-guarded structures kept as correctness and performance baselines
 */

mod synchronized;

pub use synchronized::SynchronizedQueue;
