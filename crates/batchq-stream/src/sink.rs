//! Async sender implementing `futures::Sink`.

use crate::error::StreamError;
use batchq_rs::Queue;
use futures_sink::Sink;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Sink that puts every item into a [`Queue`].
///
/// The queue is unbounded, so the sink is always ready and flushing is a
/// no-op: an item is in the queue as soon as `start_send` returns. Closing
/// affects only this sink; other handles keep working.
#[derive(Debug)]
pub struct QueueSink<T> {
    queue: Queue<T>,
    closed: bool,
}

impl<T> QueueSink<T> {
    /// Creates a sink feeding `queue`.
    pub fn new(queue: Queue<T>) -> Self {
        Self {
            queue,
            closed: false,
        }
    }

    /// Puts an item directly, without going through the `Sink` protocol.
    pub fn send_now(&self, item: T) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.queue.put(item);
        Ok(())
    }

    /// Returns `true` once the sink has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T> Sink<T> for QueueSink<T> {
    type Error = StreamError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.closed {
            return Poll::Ready(Err(StreamError::Closed));
        }
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, item: T) -> Result<(), Self::Error> {
        self.send_now(item)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.get_mut().closed = true;
        Poll::Ready(Ok(()))
    }
}
