/*!
 * Conflux Engine Library
 * Keyed message conflation with blocking and lock-free transports
 */

pub mod conflator;
pub mod core;
pub mod message;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{ConflatorError, ConflatorResult};
pub use crate::core::sync::{CancelToken, LockFreeQueue, PickQueue, SynchronizedQueue};
pub use conflator::{
    merge_run, ChannelIngress, Conflator, ConflatorConfig, ConflatorStats, Ingress, IngressKind,
    LockFreeIngress, Mode,
};
pub use message::{Mergeable, SequentialCharacterMessage, TextMessage, Trade};
pub use monitoring::init_tracing;
