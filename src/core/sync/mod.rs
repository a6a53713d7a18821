/*!
 * Synchronization Primitives
 *
 * Building blocks shared by the conflation engine and its benchmarks:
 * - Cancellation tokens that wake blocked waits
 * - Lock-free FIFO queue with epoch-based reclamation
 * - Mutex-guarded FIFO queue used as a baseline
 *
 * # Architecture
 *
 * Both queues implement `PickQueue`, a non-blocking put/pick contract, so
 * they can be swapped behind the same benchmark and test drivers.
 */

mod cancel;
pub mod lockfree;
pub mod locks;
mod traits;

pub use cancel::CancelToken;
pub use lockfree::LockFreeQueue;
pub use locks::SynchronizedQueue;
pub use traits::PickQueue;
