//! Single-use delivery slot between reconciliation and one consumer.
//!
//! The producing half ([`Deliverer`]) is stored in a waiter record and
//! consumed by its one delivery; the consuming half ([`Ticket`]) is handed to
//! the caller, who either blocks on it or awaits it.

use crate::error::QueueError;
use crate::sync::{lock, wait, Arc, Condvar, Mutex};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use tracing::debug;

struct Rendezvous<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

struct Slot<T> {
    batch: Option<Vec<T>>,
    waker: Option<Waker>,
    /// Set when the deliverer went away without delivering.
    closed: bool,
}

impl<T> Rendezvous<T> {
    fn fulfil(&self, batch: Option<Vec<T>>) {
        let mut slot = lock(&self.slot);
        match batch {
            Some(batch) => slot.batch = Some(batch),
            None => slot.closed = true,
        }
        let waker = slot.waker.take();
        drop(slot);

        self.ready.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    fn block(&self) -> Result<Vec<T>, QueueError> {
        let mut slot = lock(&self.slot);
        loop {
            if let Some(batch) = slot.batch.take() {
                return Ok(batch);
            }
            if slot.closed {
                debug!("rendezvous closed before delivery");
                return Err(QueueError::Disconnected);
            }
            slot = wait(&self.ready, slot);
        }
    }

    fn poll_slot(&self, waker: Option<&Waker>) -> Poll<Result<Vec<T>, QueueError>> {
        let mut slot = lock(&self.slot);
        if let Some(batch) = slot.batch.take() {
            return Poll::Ready(Ok(batch));
        }
        if slot.closed {
            debug!("rendezvous closed before delivery");
            return Poll::Ready(Err(QueueError::Disconnected));
        }
        if let Some(waker) = waker {
            match slot.waker {
                Some(ref stored) if stored.will_wake(waker) => {}
                _ => slot.waker = Some(waker.clone()),
            }
        }
        Poll::Pending
    }

    fn has_batch(&self) -> bool {
        lock(&self.slot).batch.is_some()
    }
}

/// Creates a connected deliverer/ticket pair for a request of `n` items.
pub(crate) fn rendezvous<T>(n: usize) -> (Deliverer<T>, Ticket<T>) {
    let shared = Arc::new(Rendezvous {
        slot: Mutex::new(Slot {
            batch: None,
            waker: None,
            closed: false,
        }),
        ready: Condvar::new(),
    });

    let deliverer = Deliverer {
        shared: Some(Arc::clone(&shared)),
    };
    let ticket = Ticket {
        n,
        state: TicketState::Waiting(shared),
    };
    (deliverer, ticket)
}

/// Producing half of a rendezvous. Delivers exactly once.
pub(crate) struct Deliverer<T> {
    shared: Option<Arc<Rendezvous<T>>>,
}

impl<T> Deliverer<T> {
    /// Hands `batch` to the ticket in a single send.
    pub(crate) fn deliver(mut self, batch: Vec<T>) {
        if let Some(shared) = self.shared.take() {
            shared.fulfil(Some(batch));
        }
    }
}

impl<T> Drop for Deliverer<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.fulfil(None);
        }
    }
}

enum TicketState<T> {
    Ready(Vec<T>),
    Waiting(Arc<Rendezvous<T>>),
    Taken,
}

/// A claim on the next `n` items of a [`Queue`](crate::Queue).
///
/// Returned by [`Queue::request`](crate::Queue::request). The claim holds the
/// requester's place in line: it is served after every earlier request and
/// before every later one, whichever way it is consumed.
///
/// - [`wait`](Ticket::wait) blocks the current thread.
/// - `.await` suspends the current task (`Ticket` is a [`Future`]).
/// - [`try_take`](Ticket::try_take) checks without blocking.
///
/// # Dropping
///
/// Dropping a pending ticket does not withdraw the request. Its batch is still
/// carved out of the queue once enough items arrive, and is then dropped.
///
/// Once the batch has been taken, the ticket is spent: further polls and
/// `wait` report [`QueueError::Disconnected`].
#[must_use = "a ticket holds a place in line; dropping it discards its batch"]
pub struct Ticket<T> {
    n: usize,
    state: TicketState<T>,
}

impl<T> Ticket<T> {
    pub(crate) fn ready(batch: Vec<T>) -> Self {
        Self {
            n: batch.len(),
            state: TicketState::Ready(batch),
        }
    }

    /// Number of items this ticket will deliver.
    #[inline]
    pub fn count(&self) -> usize {
        self.n
    }

    /// Returns `true` if the batch can be taken without blocking.
    pub fn is_ready(&self) -> bool {
        match &self.state {
            TicketState::Ready(_) => true,
            TicketState::Waiting(shared) => shared.has_batch(),
            TicketState::Taken => false,
        }
    }

    /// Blocks the current thread until the batch is delivered.
    pub fn wait(self) -> Result<Vec<T>, QueueError> {
        match self.state {
            TicketState::Ready(batch) => Ok(batch),
            TicketState::Waiting(shared) => shared.block(),
            TicketState::Taken => Err(QueueError::Disconnected),
        }
    }

    /// Takes the batch if it has been delivered.
    ///
    /// Returns `None` while the request is still pending.
    pub fn try_take(&mut self) -> Option<Result<Vec<T>, QueueError>> {
        match self.poll_state(None) {
            Poll::Ready(result) => Some(result),
            Poll::Pending => None,
        }
    }

    fn poll_state(&mut self, waker: Option<&Waker>) -> Poll<Result<Vec<T>, QueueError>> {
        let result = match &self.state {
            TicketState::Ready(_) => None,
            TicketState::Waiting(shared) => match shared.poll_slot(waker) {
                Poll::Ready(result) => Some(result),
                Poll::Pending => return Poll::Pending,
            },
            TicketState::Taken => return Poll::Ready(Err(QueueError::Disconnected)),
        };

        match std::mem::replace(&mut self.state, TicketState::Taken) {
            TicketState::Ready(batch) => Poll::Ready(Ok(batch)),
            _ => Poll::Ready(result.unwrap_or(Err(QueueError::Disconnected))),
        }
    }
}

// Never pin-projected: the batch is only moved out by value.
impl<T> Unpin for Ticket<T> {}

impl<T> Future for Ticket<T> {
    type Output = Result<Vec<T>, QueueError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().poll_state(Some(cx.waker()))
    }
}

impl<T> fmt::Debug for Ticket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            TicketState::Ready(_) => "ready",
            TicketState::Waiting(_) => "waiting",
            TicketState::Taken => "taken",
        };
        f.debug_struct("Ticket")
            .field("n", &self.n)
            .field("state", &state)
            .finish()
    }
}
