/*!
 * Core Module
 * Error handling, limits, and synchronization building blocks
 */

pub mod errors;
pub mod limits;
pub mod sync;

// Re-export for convenience
pub use errors::*;
