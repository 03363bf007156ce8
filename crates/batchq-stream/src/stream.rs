//! Async receivers implementing `futures::Stream`.

use crate::config::StreamConfig;
use crate::error::StreamError;
use batchq_rs::{Queue, Ticket};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

use futures_core::Stream;
use pin_project_lite::pin_project;

/// Creates a stream of `batch_size`-item batches from `queue`.
pub fn batches<T>(queue: Queue<T>, batch_size: usize) -> Result<BatchStream<T>, StreamError> {
    BatchStream::new(queue, StreamConfig::default().with_batch_size(batch_size))
}

/// Creates a stream of single items from `queue`.
pub fn items<T>(queue: Queue<T>) -> ItemStream<T> {
    ItemStream {
        inner: BatchStream {
            queue,
            batch_size: 1,
            pending: None,
            done: false,
        },
        buffer: VecDeque::new(),
    }
}

/// Async stream of fixed-size batches taken from a [`Queue`].
///
/// Each batch is served like a `get_many(batch_size)` call: in line with every
/// other consumer of the queue, blocking or async, in request order.
///
/// The stream never ends on its own while it holds its queue handle; bound it
/// with combinators such as `take` or `take_until`.
///
/// # Dropping
///
/// A request is registered on the first poll after each yielded batch. If the
/// stream is dropped while that request is pending, the request is not
/// withdrawn: its batch is still carved out of the queue and discarded. Use
/// [`has_pending`](BatchStream::has_pending) to check before dropping.
pub struct BatchStream<T> {
    queue: Queue<T>,
    batch_size: usize,
    pending: Option<Ticket<T>>,
    done: bool,
}

impl<T> BatchStream<T> {
    /// Creates a batch stream over `queue`.
    pub fn new(queue: Queue<T>, config: StreamConfig) -> Result<Self, StreamError> {
        config.validate()?;
        Ok(Self {
            queue,
            batch_size: config.batch_size,
            pending: None,
            done: false,
        })
    }

    /// Items per yielded batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns `true` if a request is registered and not yet yielded.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the queue this stream consumes from.
    pub fn queue(&self) -> &Queue<T> {
        &self.queue
    }
}

impl<T> Stream for BatchStream<T> {
    type Item = Vec<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.done {
            return Poll::Ready(None);
        }

        if this.pending.is_none() {
            match this.queue.request(this.batch_size) {
                Ok(ticket) => this.pending = Some(ticket),
                Err(err) => {
                    debug!(%err, "batch request rejected, ending stream");
                    this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
        let Some(ticket) = this.pending.as_mut() else {
            return Poll::Ready(None);
        };

        match Pin::new(ticket).poll(cx) {
            Poll::Ready(Ok(batch)) => {
                this.pending = None;
                Poll::Ready(Some(batch))
            }
            Poll::Ready(Err(err)) => {
                debug!(%err, "batch request failed, ending stream");
                this.pending = None;
                this.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

pin_project! {
    /// Async stream of single items taken from a [`Queue`].
    ///
    /// Equivalent to a [`BatchStream`] of size one, flattened. The same
    /// dropping caveat applies.
    pub struct ItemStream<T> {
        #[pin]
        inner: BatchStream<T>,
        buffer: VecDeque<T>,
    }
}

impl<T> ItemStream<T> {
    /// Returns `true` if a request is registered and not yet yielded.
    pub fn has_pending(&self) -> bool {
        self.inner.has_pending() || !self.buffer.is_empty()
    }
}

impl<T> Stream for ItemStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if let Some(item) = this.buffer.pop_front() {
            return Poll::Ready(Some(item));
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(batch)) => {
                this.buffer.extend(batch);
                Poll::Ready(this.buffer.pop_front())
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
