use crate::config::Config;
use crate::error::QueueError;
use crate::handoff::Handoff;
use crate::metrics::{Metrics, MetricsRecorder};
use crate::rendezvous::{rendezvous, Ticket};
use crate::state::SharedState;
use crate::sync::Arc;
use crate::waiter::Waiter;
use std::fmt;
use std::num::NonZeroUsize;
use tracing::trace;

/// Unbounded multi-producer multi-consumer FIFO queue with batched reads.
///
/// Consumers ask for `n` items and receive them contiguously, in insertion
/// order, once `n` are available to them. Requests are served strictly in
/// the order they were made: a request for one item made after a pending
/// request for five waits until the five have been delivered.
///
/// `Queue` is a handle; clones share the same queue.
pub struct Queue<T> {
    inner: Arc<QueueInner<T>>,
}

struct QueueInner<T> {
    state: Handoff<SharedState<T>>,
    metrics: MetricsRecorder,
    config: Config,
}

impl<T> Queue<T> {
    /// Creates an empty queue with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty queue with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Handoff::new(SharedState::with_capacity(config.initial_capacity)),
                metrics: MetricsRecorder::new(config.enable_metrics),
                config,
            }),
        }
    }

    /// Appends an item and serves any waiters it completes.
    ///
    /// Never blocks beyond the brief exclusive-access window.
    pub fn put(&self, item: T) {
        let mut state = self.inner.state.take();
        state.push(item);
        self.inner.metrics.record_put(1);
        self.reconcile(&mut state);
    }

    /// Appends every item in iteration order, then serves waiters once.
    ///
    /// No other operation interleaves with the batch. The iterator is drained
    /// before the state is taken, so it may use this queue itself.
    pub fn put_many<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        let mut state = self.inner.state.take();
        let added = state.extend(items);
        self.inner.metrics.record_put(added);
        self.reconcile(&mut state);
    }

    /// Removes the oldest item, blocking until one is available to this caller.
    pub fn get(&self) -> Result<T, QueueError> {
        let mut batch = self.get_many(1)?;
        batch.pop().ok_or(QueueError::Disconnected)
    }

    /// Removes the next `n` items, blocking until all `n` are available to this
    /// caller.
    ///
    /// Returns [`QueueError::InvalidCount`] for `n == 0` without touching the
    /// queue.
    ///
    /// # Example
    ///
    /// ```
    /// use batchq_rs::Queue;
    ///
    /// let queue = Queue::new();
    /// queue.put_many(["a", "b", "c"]);
    /// assert_eq!(queue.get_many(2), Ok(vec!["a", "b"]));
    /// assert_eq!(queue.get(), Ok("c"));
    /// ```
    pub fn get_many(&self, n: usize) -> Result<Vec<T>, QueueError> {
        self.request(n)?.wait()
    }

    /// Removes the next `n` items only if that needs no waiting.
    ///
    /// Returns `Ok(None)` when fewer than `n` items are buffered or an earlier
    /// request is still pending; no place in line is taken.
    pub fn try_get_many(&self, n: usize) -> Result<Option<Vec<T>>, QueueError> {
        let n = validate_count(n)?;
        let mut state = self.inner.state.take();
        let batch = state.take_ready(n);
        if let Some(ref batch) = batch {
            self.inner.metrics.record_fast_path(batch.len());
        }
        Ok(batch)
    }

    /// Claims the next `n` items without blocking.
    ///
    /// The returned [`Ticket`] is already fulfilled if the items were buffered
    /// and no earlier request was pending; otherwise it holds this caller's
    /// place in line until enough items arrive.
    pub fn request(&self, n: usize) -> Result<Ticket<T>, QueueError> {
        let n = validate_count(n)?;
        let mut state = self.inner.state.take();

        if let Some(batch) = state.take_ready(n) {
            self.inner.metrics.record_fast_path(batch.len());
            trace!(n = n.get(), buffered = state.len(), "request served immediately");
            return Ok(Ticket::ready(batch));
        }

        let (deliverer, ticket) = rendezvous(n.get());
        state.enqueue_waiter(Waiter::new(n, deliverer));
        self.inner.metrics.record_registered();
        trace!(
            n = n.get(),
            buffered = state.len(),
            waiters = state.waiter_count(),
            "request registered as waiter"
        );
        Ok(ticket)
    }

    /// Number of buffered items not yet claimed by any request.
    pub fn len(&self) -> usize {
        self.inner.state.take().len()
    }

    /// Returns `true` if no items are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of requests registered and still waiting for items.
    pub fn pending_waiters(&self) -> usize {
        self.inner.state.take().waiter_count()
    }

    /// Returns a snapshot of the queue counters.
    ///
    /// All zeros unless the queue was built with metrics enabled.
    pub fn metrics(&self) -> Metrics {
        self.inner.metrics.snapshot()
    }

    /// Returns the configuration this queue was built with.
    pub fn config(&self) -> Config {
        self.inner.config
    }

    fn reconcile(&self, state: &mut SharedState<T>) {
        let served = state.reconcile();
        self.inner.metrics.record_served(served.waiters, served.items);
    }
}

fn validate_count(n: usize) -> Result<NonZeroUsize, QueueError> {
    NonZeroUsize::new(n).ok_or(QueueError::InvalidCount { requested: n })
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
