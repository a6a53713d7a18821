/*!
 * Error Types
 * Conflation engine errors with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for engine and transport operations
pub type ConflatorResult<T> = Result<T, ConflatorError>;

/// Errors surfaced on the control and transport paths
///
/// Merge failures are not errors: a failed `merge` only ends a merge run.
/// Protocol corruption (a cursor token with no pending data) panics instead.
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum ConflatorError {
    #[error("Blocking wait was cancelled")]
    #[diagnostic(
        code(conflator::cancelled),
        help("The engine was stopped while a wait was in progress.")
    )]
    Cancelled,

    #[error("Timed out waiting for a pending key")]
    #[diagnostic(
        code(conflator::timeout),
        help("No key became ready within the given duration. Retry or use take().")
    )]
    Timeout,

    #[error("Transport disconnected")]
    #[diagnostic(
        code(conflator::disconnected),
        help("All senders or receivers of a transport were dropped.")
    )]
    Disconnected,

    #[error("Failed to spawn background worker")]
    #[diagnostic(
        code(conflator::worker_spawn),
        help("The OS refused to create a thread. Check process thread limits.")
    )]
    WorkerSpawn,

    #[error("Background worker already running")]
    #[diagnostic(
        code(conflator::already_daemonized),
        help("Call stop() before starting a new worker.")
    )]
    AlreadyDaemonized,
}

impl ConflatorError {
    /// Whether the error only reflects a shutdown request
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConflatorError::Cancelled)
    }
}

impl From<flume::RecvTimeoutError> for ConflatorError {
    fn from(err: flume::RecvTimeoutError) -> Self {
        match err {
            flume::RecvTimeoutError::Timeout => ConflatorError::Timeout,
            flume::RecvTimeoutError::Disconnected => ConflatorError::Disconnected,
        }
    }
}

impl From<flume::RecvError> for ConflatorError {
    fn from(_: flume::RecvError) -> Self {
        ConflatorError::Disconnected
    }
}
