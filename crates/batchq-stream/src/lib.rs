//! Async Stream/Sink Adapters for batchq
//!
//! This crate provides [`futures_core::Stream`] and [`futures_sink::Sink`]
//! implementations over a [`batchq_rs::Queue`], so tasks on an async runtime
//! can consume fixed-size batches and produce items without blocking a thread.
//!
//! # Features
//!
//! - **Batched streams**: [`BatchStream`] yields `Vec<T>` batches of exactly
//!   the configured size, in queue order
//! - **Item streams**: [`ItemStream`] yields one item at a time
//! - **Sink**: [`QueueSink`] forwards items into the queue (never pends)
//! - **Shared ordering**: async and blocking consumers of the same queue line
//!   up in one FIFO; a task's request holds its place like a thread's does
//!
//! # Example
//!
//! ```ignore
//! use batchq_rs::Queue;
//! use batchq_stream::{batches, StreamExt};
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = Queue::new();
//!     let mut rx = batches(queue.clone(), 2).unwrap();
//!
//!     queue.put_many([1, 2, 3, 4]);
//!
//!     assert_eq!(rx.next().await, Some(vec![1, 2]));
//!     assert_eq!(rx.next().await, Some(vec![3, 4]));
//! }
//! ```

mod config;
mod error;
mod sink;
mod stream;

pub use config::StreamConfig;
pub use error::StreamError;
pub use sink::QueueSink;
pub use stream::{batches, items, BatchStream, ItemStream};

// Re-export useful stream combinators
pub use tokio_stream::StreamExt;
