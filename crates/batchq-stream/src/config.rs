//! Configuration for stream behavior.

use crate::error::StreamError;

/// Configuration for async stream behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Items per yielded batch.
    ///
    /// Each poll of an idle [`BatchStream`](crate::BatchStream) registers one
    /// request for exactly this many items.
    ///
    /// Default: 1
    pub batch_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { batch_size: 1 }
    }
}

impl StreamConfig {
    /// Sets the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Rejects configurations no queue request could satisfy.
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.batch_size == 0 {
            return Err(StreamError::InvalidBatchSize {
                batch_size: self.batch_size,
            });
        }
        Ok(())
    }
}
