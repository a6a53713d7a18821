/*!
 * Conflator Engine
 *
 * Composes the ingress, pending store, and cursor queue:
 *
 * ```text
 * producer -> put -> ingress -> index step -> pending store + cursor queue
 *                                                      |
 *                       consumer <- take <- merge run <-+
 * ```
 *
 * # Modes
 *
 * - **Daemonized**: a background worker runs the index step in a loop,
 *   pausing between iterations for the configured duration
 * - **Synchronous**: no worker; the owner calls `conflate(n)` to run the
 *   index step `n` times on its own thread
 *
 * # Concurrency
 *
 * Any number of threads may `put` and `take`. Only one thread indexes at a
 * time: the worker, or the single caller of `conflate`. A cursor token gives
 * its consumer exclusive rights to one key's list, so consumers never race on
 * a key while different keys complete in any order.
 */

use super::config::{ConflatorConfig, Mode};
use super::stats::{ConflatorStats, EngineCounters};
use super::store::PendingStore;
use super::transport::{CursorQueue, IngressImpl};
use super::worker::Worker;
use crate::core::errors::{ConflatorError, ConflatorResult};
use crate::core::limits::MAX_PAUSE;
use crate::core::sync::CancelToken;
use crate::message::Mergeable;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

const INDEXER_THREAD: &str = "conflux-indexer";

/// Pause in microseconds, clamped to `MAX_PAUSE` so the conversion never truncates
#[inline]
fn pause_micros(pause: Duration) -> u64 {
    pause.min(MAX_PAUSE).as_micros() as u64
}

/// State shared between the engine handle and its worker
struct Shared<M: Mergeable> {
    ingress: IngressImpl<M>,
    store: PendingStore<M>,
    cursors: CursorQueue<M::Key>,
    counters: EngineCounters,
    /// Daemon pause in microseconds, re-read every iteration
    pause_micros: AtomicU64,
}

impl<M: Mergeable> Shared<M> {
    /// Move one value from ingress into the store (suspends while ingress is empty)
    fn index_next(&self, token: &CancelToken) -> ConflatorResult<()> {
        let value = self.ingress.recv(token)?;
        if self.store.index(value, &self.cursors) {
            trace!("Cursor emitted");
        }
        self.counters.record_indexed();
        Ok(())
    }

    fn deliver(&self, key: M::Key) -> M {
        let drained = self.store.drain(&key, &self.cursors);
        self.counters
            .record_delivery(drained.merged, drained.republished, drained.waited);
        trace!(
            key = ?key,
            merged = drained.merged,
            republished = drained.republished,
            "Value delivered"
        );
        drained.value
    }

    #[inline]
    fn pause(&self) -> Duration {
        Duration::from_micros(self.pause_micros.load(Ordering::Relaxed))
    }
}

/// Indexing loop run by the background worker
///
/// Exits on the first cancellation observed at either suspension point.
fn run_indexer<M: Mergeable>(shared: Arc<Shared<M>>, token: CancelToken) {
    info!(ingress = shared.ingress.name(), "Indexer loop started");

    let exit = loop {
        if let Err(e) = shared.index_next(&token) {
            break e;
        }
        if let Err(e) = token.sleep(shared.pause()) {
            break e;
        }
    };

    match exit {
        ConflatorError::Cancelled => info!("Indexer loop stopped"),
        other => warn!(error = %other, "Indexer loop terminated"),
    }
}

/// Keyed conflation engine
///
/// # Example
///
/// ```
/// use conflux_engine::{Conflator, Mergeable, TextMessage};
///
/// let conflator = Conflator::synchronous();
/// conflator.put(TextMessage::new("1", "a"));
/// conflator.put(TextMessage::new("1", "b"));
/// conflator.conflate(2).unwrap();
///
/// let message = conflator.take();
/// assert_eq!(message.body(), "ab");
/// assert_eq!(message.merge_count(), 1);
/// assert_eq!(conflator.size(), 0);
/// ```
pub struct Conflator<M: Mergeable> {
    shared: Arc<Shared<M>>,
    /// Lifecycle guard: `Some` while a worker is owned
    worker: Mutex<Option<Worker>>,
    /// Never cancelled; used by synchronous `conflate`
    idle: CancelToken,
    config: ConflatorConfig,
}

impl<M: Mergeable> Conflator<M> {
    /// Create an engine; starts the worker when `config.mode` is daemonized
    pub fn new(config: ConflatorConfig) -> ConflatorResult<Self> {
        let conflator = Self::build(config);
        if conflator.config.mode == Mode::Daemonized {
            conflator.daemonize()?;
        }
        Ok(conflator)
    }

    /// Daemonized engine with default settings
    pub fn daemonized() -> ConflatorResult<Self> {
        Self::new(ConflatorConfig::default())
    }

    /// Synchronous engine with default settings (never spawns)
    pub fn synchronous() -> Self {
        Self::build(ConflatorConfig::synchronous())
    }

    fn build(config: ConflatorConfig) -> Self {
        let shared = Arc::new(Shared {
            ingress: IngressImpl::new(config.ingress),
            store: PendingStore::new(),
            cursors: CursorQueue::new(),
            counters: EngineCounters::default(),
            pause_micros: AtomicU64::new(pause_micros(config.pause)),
        });

        debug!(
            mode = ?config.mode,
            ingress = shared.ingress.name(),
            pause_us = pause_micros(config.pause),
            "Conflator created"
        );

        Self {
            shared,
            worker: Mutex::new(None),
            idle: CancelToken::new(),
            config,
        }
    }

    /// Submit a value; never drops or reorders a producer's submissions
    pub fn put(&self, value: M) {
        // Built-in ingress transports own both ends and cannot disconnect
        if let Err(e) = self.shared.ingress.send(value) {
            panic!("ingress rejected a value: {}", e);
        }
        self.shared.counters.record_submitted();
    }

    /// Start the background worker
    ///
    /// Returns `AlreadyDaemonized` if a worker is running. After `stop()` a
    /// new worker may be started.
    pub fn daemonize(&self) -> ConflatorResult<()> {
        let mut slot = self.worker.lock();

        if let Some(existing) = slot.as_ref() {
            if existing.is_running() {
                return Err(ConflatorError::AlreadyDaemonized);
            }
        }
        if let Some(finished) = slot.take() {
            finished.shutdown();
        }

        let shared = self.shared.clone();
        let worker = Worker::spawn(INDEXER_THREAD, move |token| run_indexer(shared, token))?;
        *slot = Some(worker);
        Ok(())
    }

    /// Run the index step `count` times on the calling thread
    ///
    /// Suspends whenever ingress is empty. Ignored while daemonized, returning
    /// `Ok(0)`; otherwise returns the number of values indexed.
    pub fn conflate(&self, count: usize) -> ConflatorResult<usize> {
        if self.is_daemonized() {
            debug!(count, "conflate() ignored while daemonized");
            return Ok(0);
        }

        for _ in 0..count {
            self.shared.index_next(&self.idle)?;
        }
        Ok(count)
    }

    /// Block until a key is ready and return its merged value
    pub fn take(&self) -> M {
        let key = self.shared.cursors.recv();
        self.shared.deliver(key)
    }

    /// Like `take`, giving up with `Timeout` after `timeout`
    pub fn take_timeout(&self, timeout: Duration) -> ConflatorResult<M> {
        let key = self.shared.cursors.recv_timeout(timeout)?;
        Ok(self.shared.deliver(key))
    }

    /// Like `take`, returning `None` if no key is ready right now
    pub fn try_take(&self) -> Option<M> {
        let key = self.shared.cursors.try_recv()?;
        Some(self.shared.deliver(key))
    }

    /// Stop the background worker and wait for it to exit
    ///
    /// Values already submitted stay queued and can be indexed again after
    /// `daemonize()` or, once stopped, via `conflate`.
    pub fn stop(&self) {
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.shutdown();
        }
    }

    /// Set the daemon's delay between index iterations
    ///
    /// A longer pause narrows grouping: a consumer can drain a key before the
    /// next same-key value is indexed. Values above `MAX_PAUSE` are clamped.
    pub fn pause(&self, pause: Duration) {
        self.shared
            .pause_micros
            .store(pause_micros(pause), Ordering::Relaxed);
    }

    /// Ingress length plus pending-store length
    ///
    /// Best effort: both structures move concurrently, so the sum may be stale
    /// by the time it is returned.
    pub fn size(&self) -> usize {
        self.shared.ingress.len() + self.shared.store.len()
    }

    pub fn is_daemonized(&self) -> bool {
        self.worker.lock().as_ref().is_some_and(Worker::is_running)
    }

    pub fn stats(&self) -> ConflatorStats {
        ConflatorStats {
            pending_keys: self.shared.store.key_count(),
            ready_keys: self.shared.cursors.len(),
            ..self.shared.counters.snapshot()
        }
    }

    pub fn config(&self) -> &ConflatorConfig {
        &self.config
    }
}

impl<M: Mergeable> Drop for Conflator<M> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            warn!("Conflator dropped without stop() - shutting down indexer");
            worker.shutdown();
        }
    }
}
