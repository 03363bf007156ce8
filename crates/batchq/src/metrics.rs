use crate::sync::{AtomicU64, Ordering};
use crossbeam_utils::CachePadded;

/// Snapshot of queue counters, see [`Queue::metrics`](crate::Queue::metrics).
///
/// All counters stay at zero unless [`Config::enable_metrics`](crate::Config) is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Items accepted by `put`/`put_many`.
    pub items_put: u64,
    /// Items handed to consumers, through either path.
    pub items_delivered: u64,
    /// Requests served immediately without registering a waiter.
    pub fast_path_hits: u64,
    /// Requests that had to register a waiter.
    pub waiters_registered: u64,
    /// Registered waiters that have been served.
    pub waiters_served: u64,
}

impl Metrics {
    /// Creates an all-zero snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items put but not yet delivered to any consumer.
    pub fn undelivered(&self) -> u64 {
        self.items_put.saturating_sub(self.items_delivered)
    }

    /// Waiters registered but not yet served.
    pub fn outstanding_waiters(&self) -> u64 {
        self.waiters_registered.saturating_sub(self.waiters_served)
    }
}

/// Live counters behind [`Metrics`].
///
/// Writes happen inside the state critical section; reads do not take the
/// state, so snapshots taken under concurrent traffic may be mid-update.
#[derive(Debug)]
pub(crate) struct MetricsRecorder {
    enabled: bool,
    items_put: CachePadded<AtomicU64>,
    items_delivered: CachePadded<AtomicU64>,
    fast_path_hits: CachePadded<AtomicU64>,
    waiters_registered: CachePadded<AtomicU64>,
    waiters_served: CachePadded<AtomicU64>,
}

impl MetricsRecorder {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            items_put: CachePadded::new(AtomicU64::new(0)),
            items_delivered: CachePadded::new(AtomicU64::new(0)),
            fast_path_hits: CachePadded::new(AtomicU64::new(0)),
            waiters_registered: CachePadded::new(AtomicU64::new(0)),
            waiters_served: CachePadded::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    pub(crate) fn record_put(&self, items: usize) {
        if self.enabled {
            self.items_put.fetch_add(items as u64, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_fast_path(&self, items: usize) {
        if self.enabled {
            self.fast_path_hits.fetch_add(1, Ordering::Relaxed);
            self.items_delivered.fetch_add(items as u64, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_registered(&self) {
        if self.enabled {
            self.waiters_registered.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_served(&self, waiters: usize, items: usize) {
        if self.enabled && waiters > 0 {
            self.waiters_served.fetch_add(waiters as u64, Ordering::Relaxed);
            self.items_delivered.fetch_add(items as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> Metrics {
        Metrics {
            items_put: self.items_put.load(Ordering::Relaxed),
            items_delivered: self.items_delivered.load(Ordering::Relaxed),
            fast_path_hits: self.fast_path_hits.load(Ordering::Relaxed),
            waiters_registered: self.waiters_registered.load(Ordering::Relaxed),
            waiters_served: self.waiters_served.load(Ordering::Relaxed),
        }
    }
}
