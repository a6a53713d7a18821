/*!
 * Lock-Free Synchronization Primitives
 *
 * Non-blocking data structures for contended hot paths:
 * - Michael-Scott FIFO queue with epoch-based memory reclamation
 */

mod queue;

// Re-export public API
pub use queue::LockFreeQueue;
