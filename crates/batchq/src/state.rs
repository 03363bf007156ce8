//! The shared state record and the reconciliation step.

#[cfg(debug_assertions)]
use crate::invariants::{
    debug_assert_batch_exact, debug_assert_head_blocked, debug_assert_no_older_waiter,
};
use crate::waiter::Waiter;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use tracing::trace;

/// Buffered items and pending waiters, both oldest first.
///
/// Only ever reached through the queue's handoff, so every method here runs
/// with exclusive ownership.
pub(crate) struct SharedState<T> {
    items: VecDeque<T>,
    waiters: VecDeque<Waiter<T>>,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Served {
    pub(crate) waiters: usize,
    pub(crate) items: usize,
}

impl<T> SharedState<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            waiters: VecDeque::new(),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Appends already collected items in order, returning how many were added.
    ///
    /// Takes a `Vec` so no caller iterator runs while the state is owned.
    pub(crate) fn extend(&mut self, items: Vec<T>) -> usize {
        let added = items.len();
        self.items.extend(items);
        added
    }

    /// Fast path: removes the first `n` items if no waiter is ahead.
    pub(crate) fn take_ready(&mut self, n: NonZeroUsize) -> Option<Vec<T>> {
        if !self.waiters.is_empty() || self.items.len() < n.get() {
            return None;
        }
        #[cfg(debug_assertions)]
        debug_assert_no_older_waiter!(self.waiters.len());

        let batch = self.drain_front(n.get());
        #[cfg(debug_assertions)]
        debug_assert_batch_exact!(batch.len(), n.get());
        Some(batch)
    }

    /// Registers a waiter behind every existing one.
    ///
    /// Never needs a reconciliation pass: `take_ready` just failed, so either
    /// an older waiter is blocked or there are fewer than `n` items.
    pub(crate) fn enqueue_waiter(&mut self, waiter: Waiter<T>) {
        self.waiters.push_back(waiter);
        #[cfg(debug_assertions)]
        debug_assert_head_blocked!(self.items.len(), self.head_count());
    }

    /// Serves the oldest waiters while the head one can be satisfied.
    ///
    /// Stops at the first waiter that needs more than is buffered, even if a
    /// later waiter needs less.
    pub(crate) fn reconcile(&mut self) -> Served {
        let mut served = Served::default();

        while let Some(n) = self.head_count() {
            if self.items.len() < n {
                break;
            }
            let batch = self.drain_front(n);
            if let Some(waiter) = self.waiters.pop_front() {
                waiter.serve(batch);
            }
            served.waiters += 1;
            served.items += n;
            trace!(
                n,
                buffered = self.items.len(),
                waiters = self.waiters.len(),
                "served waiter"
            );
        }

        #[cfg(debug_assertions)]
        debug_assert_head_blocked!(self.items.len(), self.head_count());
        served
    }

    /// Number of buffered items.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of pending waiters.
    #[inline]
    pub(crate) fn waiter_count(&self) -> usize {
        self.waiters.len()
    }

    #[inline]
    fn head_count(&self) -> Option<usize> {
        self.waiters.front().map(Waiter::count)
    }

    fn drain_front(&mut self, n: usize) -> Vec<T> {
        self.items.drain(..n).collect()
    }
}
