//! Error types for batchq-stream operations.

use batchq_rs::QueueError;
use thiserror::Error;

/// Errors that can occur in stream operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The configured batch size was zero.
    #[error("invalid batch size {batch_size}: batches must hold at least one item")]
    InvalidBatchSize {
        /// The rejected batch size.
        batch_size: usize,
    },

    /// The sink has been closed.
    #[error("sink is closed")]
    Closed,

    /// The underlying queue rejected a request.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

impl StreamError {
    /// Returns `true` if this error indicates the adapter is permanently unusable.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Closed => true,
            Self::Queue(err) => err.is_terminal(),
            Self::InvalidBatchSize { .. } => false,
        }
    }
}
