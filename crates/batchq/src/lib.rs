//! batchq - Concurrent FIFO Queue with Batched Blocking Reads
//!
//! An unbounded multi-producer multi-consumer queue where a consumer asks for
//! `n` items and blocks until all `n` can be handed over at once, contiguous
//! and in insertion order.
//!
//! # Key Features
//!
//! - Strict FIFO for items and for requests (head-of-line blocking: a later,
//!   smaller request never overtakes an earlier, larger one)
//! - Atomic batch delivery (a request gets exactly `n` items or nothing)
//! - State passed between callers through a single-slot handoff, so owning
//!   the state and holding the lock are the same action
//! - Blocking ([`Queue::get_many`]) and async ([`Ticket`] is a `Future`) waits
//!
//! # Example
//!
//! ```
//! use batchq_rs::Queue;
//! use std::thread;
//!
//! let queue = Queue::new();
//!
//! let consumer = {
//!     let queue = queue.clone();
//!     thread::spawn(move || queue.get_many(3))
//! };
//!
//! queue.put(1);
//! queue.put_many([2, 3]);
//!
//! assert_eq!(consumer.join().unwrap(), Ok(vec![1, 2, 3]));
//! ```

mod config;
mod error;
mod handoff;
mod invariants;
mod metrics;
mod queue;
mod rendezvous;
mod state;
mod sync;
mod waiter;

pub use config::{Config, INSTRUMENTED_CONFIG, LOW_OVERHEAD_CONFIG};
pub use error::QueueError;
pub use metrics::Metrics;
pub use queue::Queue;
pub use rendezvous::Ticket;
