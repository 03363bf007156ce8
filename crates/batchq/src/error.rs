use thiserror::Error;

/// Error types for queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// A request asked for zero items.
    #[error("invalid item count {requested}: a request must ask for at least one item")]
    InvalidCount {
        /// The count that was passed in.
        requested: usize,
    },
    /// Every queue handle was dropped before the request was served.
    #[error("queue was dropped before the request was served")]
    Disconnected,
}

impl QueueError {
    /// Returns `true` if the caller passed a bad argument; nothing was changed.
    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidCount { .. })
    }

    /// Returns `true` if the request can never be served.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}
