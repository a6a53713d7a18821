/*!
 * Cancellation Token
 *
 * Cooperative shutdown signal that can interrupt blocking waits.
 *
 * # Design: Disconnect-as-Signal
 *
 * The token owns the only sender of a flume channel that never carries a
 * message. Cancelling drops that sender, which disconnects every receiver at
 * once. Any `flume::Selector` that includes the token's receiver therefore
 * wakes immediately, so waits on transports and pause sleeps are both bounded
 * by the cancel call rather than by their own timeouts.
 */

use crate::core::errors::{ConflatorError, ConflatorResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Inner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<flume::Sender<()>>>,
    signal: flume::Receiver<()>,
}

/// Shared cancellation token (cheap to clone)
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    /// Create a live (not yet cancelled) token
    pub fn new() -> Self {
        let (trigger, signal) = flume::bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    /// Fire the token; idempotent
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        // Dropping the sender disconnects all waiters
        self.inner.trigger.lock().take();
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Returns `Err(Cancelled)` if the token has fired
    #[inline]
    pub fn check(&self) -> ConflatorResult<()> {
        if self.is_cancelled() {
            Err(ConflatorError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Receiver to register in a `flume::Selector`
    ///
    /// Becomes disconnected when the token is cancelled.
    #[inline]
    pub(crate) fn signal(&self) -> &flume::Receiver<()> {
        &self.inner.signal
    }

    /// Sleep for `duration` unless cancelled first
    pub fn sleep(&self, duration: Duration) -> ConflatorResult<()> {
        self.check()?;
        if duration.is_zero() {
            return Ok(());
        }

        match self.inner.signal.recv_timeout(duration) {
            Err(flume::RecvTimeoutError::Disconnected) => Err(ConflatorError::Cancelled),
            Err(flume::RecvTimeoutError::Timeout) | Ok(()) => Ok(()),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
