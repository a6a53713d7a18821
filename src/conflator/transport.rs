/*!
 * Transports
 *
 * Blocking FIFOs connecting producers, the indexer, and consumers:
 * - `ChannelIngress`: flume channel carrying raw values
 * - `LockFreeIngress`: `LockFreeQueue` with a doorbell for blocking receives
 * - `CursorQueue`: flume channel of ready keys
 *
 * # Design: Enum Dispatch
 *
 * The engine holds its ingress as `IngressImpl`, an enum over the built-in
 * transports, so the hot path is monomorphized rather than going through a
 * vtable. The `Ingress` trait documents the contract and lets tests drive
 * either transport uniformly.
 */

use crate::core::errors::{ConflatorError, ConflatorResult};
use crate::core::limits::DOORBELL_CAPACITY;
use crate::core::sync::{CancelToken, LockFreeQueue};
use std::time::Duration;

use super::config::IngressKind;

/// Transport from producers to the indexing step
///
/// `recv` suspends the caller (it never spins) until a value arrives or the
/// token is cancelled. One waiting receiver is woken per sent value.
pub trait Ingress<M>: Send + Sync {
    fn send(&self, value: M) -> ConflatorResult<()>;

    /// Block until a value is available, `Err(Cancelled)` once the token fires
    fn recv(&self, token: &CancelToken) -> ConflatorResult<M>;

    fn try_recv(&self) -> Option<M>;

    /// Approximate number of queued values
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn name(&self) -> &'static str;
}

/// Unbounded flume channel ingress
pub struct ChannelIngress<M> {
    tx: flume::Sender<M>,
    rx: flume::Receiver<M>,
}

impl<M> ChannelIngress<M> {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }
}

impl<M> Default for ChannelIngress<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send> Ingress<M> for ChannelIngress<M> {
    #[inline]
    fn send(&self, value: M) -> ConflatorResult<()> {
        self.tx.send(value).map_err(|_| ConflatorError::Disconnected)
    }

    fn recv(&self, token: &CancelToken) -> ConflatorResult<M> {
        token.check()?;
        if let Ok(value) = self.rx.try_recv() {
            return Ok(value);
        }

        flume::Selector::new()
            .recv(&self.rx, |r| r.map_err(ConflatorError::from))
            .recv(token.signal(), |_| Err(ConflatorError::Cancelled))
            .wait()
    }

    #[inline]
    fn try_recv(&self) -> Option<M> {
        self.rx.try_recv().ok()
    }

    #[inline]
    fn len(&self) -> usize {
        self.rx.len()
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

/// Lock-free ingress with a coalescing doorbell
///
/// `send` pushes then rings a single-slot doorbell. A receiver that finds the
/// queue empty waits on the doorbell and re-checks the queue after each ring.
/// Every push that follows a failed pick leaves the doorbell full, so no
/// wakeup is lost.
pub struct LockFreeIngress<M> {
    queue: LockFreeQueue<M>,
    doorbell_tx: flume::Sender<()>,
    doorbell_rx: flume::Receiver<()>,
}

impl<M> LockFreeIngress<M> {
    pub fn new() -> Self {
        let (doorbell_tx, doorbell_rx) = flume::bounded(DOORBELL_CAPACITY);
        Self {
            queue: LockFreeQueue::new(),
            doorbell_tx,
            doorbell_rx,
        }
    }
}

impl<M> Default for LockFreeIngress<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send> Ingress<M> for LockFreeIngress<M> {
    #[inline]
    fn send(&self, value: M) -> ConflatorResult<()> {
        self.queue.put(value);
        // Full doorbell already guarantees a wakeup
        let _ = self.doorbell_tx.try_send(());
        Ok(())
    }

    fn recv(&self, token: &CancelToken) -> ConflatorResult<M> {
        loop {
            token.check()?;
            if let Some(value) = self.queue.pick() {
                return Ok(value);
            }

            flume::Selector::new()
                .recv(&self.doorbell_rx, |r| r.map_err(ConflatorError::from))
                .recv(token.signal(), |_| Err(ConflatorError::Cancelled))
                .wait()?;
        }
    }

    #[inline]
    fn try_recv(&self) -> Option<M> {
        self.queue.pick()
    }

    #[inline]
    fn len(&self) -> usize {
        self.queue.len()
    }

    fn name(&self) -> &'static str {
        "lockfree"
    }
}

/// Ingress implementation (enum dispatch for zero overhead)
pub(crate) enum IngressImpl<M> {
    Channel(ChannelIngress<M>),
    LockFree(LockFreeIngress<M>),
}

impl<M: Send> IngressImpl<M> {
    pub fn new(kind: IngressKind) -> Self {
        match kind {
            IngressKind::Channel => Self::Channel(ChannelIngress::new()),
            IngressKind::LockFree => Self::LockFree(LockFreeIngress::new()),
        }
    }

    #[inline(always)]
    pub fn send(&self, value: M) -> ConflatorResult<()> {
        match self {
            Self::Channel(i) => i.send(value),
            Self::LockFree(i) => i.send(value),
        }
    }

    #[inline(always)]
    pub fn recv(&self, token: &CancelToken) -> ConflatorResult<M> {
        match self {
            Self::Channel(i) => i.recv(token),
            Self::LockFree(i) => i.recv(token),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        match self {
            Self::Channel(i) => i.len(),
            Self::LockFree(i) => i.len(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Channel(i) => i.name(),
            Self::LockFree(i) => i.name(),
        }
    }
}

/// Readiness transport: FIFO of keys that have pending values
///
/// Holds both ends of its channel, so it never disconnects.
pub(crate) struct CursorQueue<K> {
    tx: flume::Sender<K>,
    rx: flume::Receiver<K>,
}

impl<K> CursorQueue<K> {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    #[inline]
    pub fn push(&self, key: K) {
        // Cannot fail: self.rx keeps the channel connected
        let _ = self.tx.send(key);
    }

    /// Block until a key is ready
    pub fn recv(&self) -> K {
        match self.rx.recv() {
            Ok(key) => key,
            Err(_) => panic!("cursor queue disconnected while owning both ends"),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> ConflatorResult<K> {
        Ok(self.rx.recv_timeout(timeout)?)
    }

    #[inline]
    pub fn try_recv(&self) -> Option<K> {
        self.rx.try_recv().ok()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    fn assert_fifo<I: Ingress<u32>>(ingress: &I) {
        let token = CancelToken::new();
        for i in 0..100 {
            ingress.send(i).unwrap();
        }
        assert_eq!(ingress.len(), 100);

        for i in 0..100 {
            assert_eq!(ingress.recv(&token).unwrap(), i);
        }
        assert!(ingress.is_empty());
        assert!(ingress.try_recv().is_none());
    }

    fn assert_cancel_wakes_receiver<I: Ingress<u32> + 'static>(ingress: Arc<I>) {
        let token = CancelToken::new();
        let waiter = {
            let ingress = ingress.clone();
            let token = token.clone();
            thread::spawn(move || {
                let start = Instant::now();
                (ingress.recv(&token), start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(50));
        token.cancel();

        let (result, elapsed) = waiter.join().unwrap();
        assert_eq!(result, Err(ConflatorError::Cancelled));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_channel_ingress_fifo() {
        assert_fifo(&ChannelIngress::new());
    }

    #[test]
    fn test_lockfree_ingress_fifo() {
        assert_fifo(&LockFreeIngress::new());
    }

    #[test]
    fn test_channel_ingress_cancel() {
        assert_cancel_wakes_receiver(Arc::new(ChannelIngress::new()));
    }

    #[test]
    fn test_lockfree_ingress_cancel() {
        assert_cancel_wakes_receiver(Arc::new(LockFreeIngress::new()));
    }

    #[test]
    fn test_lockfree_ingress_wakes_blocked_receiver() {
        let ingress = Arc::new(LockFreeIngress::new());
        let token = CancelToken::new();

        let receiver = {
            let ingress = ingress.clone();
            thread::spawn(move || (0..1_000).map(|_| ingress.recv(&token).unwrap()).collect::<Vec<u32>>())
        };

        for i in 0..1_000 {
            ingress.send(i).unwrap();
            if i % 100 == 0 {
                thread::sleep(Duration::from_millis(1));
            }
        }

        assert_eq!(receiver.join().unwrap(), (0..1_000).collect::<Vec<u32>>());
    }

    #[test]
    fn test_cursor_queue_timeout() {
        let cursors = CursorQueue::<String>::new();
        assert_eq!(
            cursors.recv_timeout(Duration::from_millis(20)),
            Err(ConflatorError::Timeout)
        );

        cursors.push("a".to_string());
        assert_eq!(cursors.len(), 1);
        assert_eq!(cursors.recv(), "a");
        assert!(cursors.try_recv().is_none());
    }
}
