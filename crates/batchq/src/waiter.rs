#[cfg(debug_assertions)]
use crate::invariants::debug_assert_batch_exact;
use crate::rendezvous::Deliverer;
use std::num::NonZeroUsize;

/// A pending request for `n` items, served exactly once.
pub(crate) struct Waiter<T> {
    n: NonZeroUsize,
    deliverer: Deliverer<T>,
}

impl<T> Waiter<T> {
    pub(crate) fn new(n: NonZeroUsize, deliverer: Deliverer<T>) -> Self {
        Self { n, deliverer }
    }

    /// Items this waiter needs.
    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.n.get()
    }

    /// Consumes the waiter, handing it its batch.
    pub(crate) fn serve(self, batch: Vec<T>) {
        #[cfg(debug_assertions)]
        debug_assert_batch_exact!(batch.len(), self.n.get());
        self.deliverer.deliver(batch);
    }
}
