/*!
 * Background Worker
 *
 * Dedicated OS thread running the indexing loop until cancelled.
 *
 * # Shutdown Pattern: Graceful-with-Fallback
 *
 * 1. **Preferred path:** `shutdown()` cancels the token and joins the thread.
 *    The token wakes both the ingress wait and the pause sleep, so shutdown
 *    latency does not depend on the configured pause.
 * 2. **Fallback path:** `Drop` does the same and logs a warning so a missing
 *    `shutdown()` is visible.
 */

use crate::core::errors::{ConflatorError, ConflatorResult};
use crate::core::sync::CancelToken;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// Handle to a running background thread
pub(crate) struct Worker {
    token: CancelToken,
    handle: Option<JoinHandle<()>>,
    name: String,
}

impl Worker {
    /// Spawn `body` on a named thread with a fresh cancellation token
    pub fn spawn<F>(name: &str, body: F) -> ConflatorResult<Self>
    where
        F: FnOnce(CancelToken) + Send + 'static,
    {
        let token = CancelToken::new();
        let worker_token = token.clone();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(worker_token))
            .map_err(|e| {
                error!(worker = name, error = %e, "Failed to spawn worker thread");
                ConflatorError::WorkerSpawn
            })?;

        info!(worker = name, "Worker spawned");
        Ok(Self {
            token,
            handle: Some(handle),
            name: name.to_string(),
        })
    }

    /// Whether the thread is still executing
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel and join
    ///
    /// Consumes self to prevent use-after-shutdown.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(worker = %self.name, "Worker thread panicked");
            } else {
                info!(worker = %self.name, "Worker shutdown complete");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!(
                worker = %self.name,
                "Worker dropped without shutdown() - cancelling and joining"
            );
            self.stop_and_join();
        }
    }
}
