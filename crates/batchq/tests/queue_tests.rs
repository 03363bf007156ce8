use batchq_rs::{Config, Queue, QueueError, INSTRUMENTED_CONFIG};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// Spins until `cond` holds, failing the test after a generous deadline.
fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Runs `get_many(n)` on a new thread, reporting the result over a channel.
fn spawn_get_many(
    queue: &Queue<u64>,
    n: usize,
) -> mpsc::Receiver<Result<Vec<u64>, QueueError>> {
    let (tx, rx) = mpsc::channel();
    let q = queue.clone();
    thread::spawn(move || {
        let _ = tx.send(q.get_many(n));
    });
    rx
}

#[test]
fn test_put_then_get() {
    let q = Queue::new();
    q.put(1u64);
    assert_eq!(q.get(), Ok(1));
}

#[test]
fn test_put_multiple_keeps_order() {
    let q = Queue::new();
    q.put(1u64);
    q.put(2);
    assert_eq!(q.get(), Ok(1));
    assert_eq!(q.get(), Ok(2));
}

#[test]
fn test_fifo_ordering_single_producer() {
    const N: u64 = 10_000;
    let q = Queue::new();
    for i in 0..N {
        q.put(i);
    }
    for expected in 0..N {
        assert_eq!(q.get(), Ok(expected), "FIFO violation at {}", expected);
    }
    assert!(q.is_empty());
}

#[test]
fn test_empty_get_blocks() {
    let q = Queue::<u64>::new();
    let rx = spawn_get_many(&q, 1);

    assert!(
        rx.recv_timeout(Duration::from_millis(1)).is_err(),
        "get on an empty queue should block"
    );

    // Release the blocked thread.
    q.put(9);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(vec![9]));
}

#[test]
fn test_get_returns_promptly_after_put() {
    let q = Queue::<u64>::new();
    let rx = spawn_get_many(&q, 1);
    wait_until(|| q.pending_waiters() == 1);

    let start = Instant::now();
    q.put(42);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(vec![42]));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_get_many_blocks_until_enough_items() {
    let q = Queue::<u64>::new();
    q.put(1);

    let first = spawn_get_many(&q, 2);
    assert!(
        first.recv_timeout(Duration::from_millis(1)).is_err(),
        "get_many should block if not enough items in queue"
    );

    // Completes the first request and empties the queue.
    q.put(2);
    assert_eq!(first.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(vec![1, 2]));
    assert!(q.is_empty());

    // Enough items are buffered, so the second request does not block.
    q.put(3);
    q.put(4);
    let second = spawn_get_many(&q, 2);
    assert_eq!(second.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(vec![3, 4]));
}

#[test]
fn test_get_many_exact_batch_size() {
    let q = Queue::new();
    q.put_many(0u64..10);

    let batch = q.get_many(7).unwrap();
    assert_eq!(batch.len(), 7);
    assert_eq!(batch, (0..7).collect::<Vec<_>>());
    assert_eq!(q.len(), 3);
}

#[test]
fn test_zero_count_fails_fast() {
    let q = Queue::<u64>::with_config(INSTRUMENTED_CONFIG);
    assert_eq!(q.get_many(0), Err(QueueError::InvalidCount { requested: 0 }));
    assert_eq!(q.pending_waiters(), 0);
    assert_eq!(q.metrics().waiters_registered, 0);
}

#[test]
fn test_head_of_line_blocking_with_tickets() {
    let q = Queue::<u64>::new();
    let mut a = q.request(5).unwrap();
    let mut b = q.request(1).unwrap();

    q.put(100);
    // B could be satisfied by the single item, but A registered first.
    assert_eq!(b.try_take(), None);
    assert_eq!(a.try_take(), None);
    assert_eq!(q.pending_waiters(), 2);

    q.put_many([101, 102, 103, 104]);
    assert_eq!(a.try_take(), Some(Ok(vec![100, 101, 102, 103, 104])));
    assert_eq!(b.try_take(), None);

    q.put(105);
    assert_eq!(b.try_take(), Some(Ok(vec![105])));
}

#[test]
fn test_head_of_line_blocking_with_threads() {
    let q = Queue::<u64>::new();

    let a = spawn_get_many(&q, 5);
    wait_until(|| q.pending_waiters() == 1);
    let b = spawn_get_many(&q, 1);
    wait_until(|| q.pending_waiters() == 2);

    q.put(0);
    assert!(b.recv_timeout(Duration::from_millis(20)).is_err());

    for i in 1..6 {
        q.put(i);
    }
    assert_eq!(a.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(vec![0, 1, 2, 3, 4]));
    assert_eq!(b.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(vec![5]));
}

#[test]
fn test_fast_path_refused_while_waiter_pending() {
    let q = Queue::<u64>::new();
    let _big = q.request(3).unwrap();
    q.put(1);
    q.put(2);

    // Two items buffered, but they are claimed by the earlier request.
    assert_eq!(q.try_get_many(1), Ok(None));
    let mut late = q.request(1).unwrap();
    q.put(3);
    assert_eq!(late.try_take(), None);
    q.put(4);
    assert_eq!(late.try_take(), Some(Ok(vec![4])));
}

#[test]
fn test_concurrent_puts_and_gets() {
    const N: u64 = 1000;
    let q = Queue::<u64>::new();
    let sum = AtomicU64::new(0);
    let (tx, rx) = mpsc::channel();

    thread::scope(|s| {
        for i in 0..N {
            let q = &q;
            s.spawn(move || q.put(i));
        }
        for _ in 0..N {
            let q = &q;
            let sum = &sum;
            let tx = tx.clone();
            s.spawn(move || {
                let v = q.get().unwrap();
                sum.fetch_add(v, Ordering::Relaxed);
                tx.send(v).unwrap();
            });
        }
    });
    drop(tx);

    assert_eq!(sum.load(Ordering::Relaxed), N * (N - 1) / 2, "data race");
    let mut seen: Vec<u64> = rx.iter().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..N).collect::<Vec<_>>(), "each item exactly once");
    assert!(q.is_empty());
    assert_eq!(q.pending_waiters(), 0);
}

#[test]
fn test_concurrent_batches_are_contiguous() {
    const PRODUCERS: u64 = 4;
    const PER_PRODUCER: u64 = 2_000;
    const BATCH: usize = 8;
    const CONSUMERS: usize = 4;

    let q = Arc::new(Queue::<(u64, u64)>::with_config(INSTRUMENTED_CONFIG));
    let total = (PRODUCERS * PER_PRODUCER) as usize;
    let batches_per_consumer = total / BATCH / CONSUMERS;
    let barrier = Arc::new(Barrier::new(PRODUCERS as usize + CONSUMERS));

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let q = Arc::clone(&q);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut batches = Vec::with_capacity(batches_per_consumer);
                for _ in 0..batches_per_consumer {
                    let batch = q.get_many(BATCH).unwrap();
                    assert_eq!(batch.len(), BATCH);
                    batches.push(batch);
                }
                batches
            })
        })
        .collect();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let q = Arc::clone(&q);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for seq in 0..PER_PRODUCER {
                    q.put((id, seq));
                }
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }

    let mut last_seen = vec![None::<u64>; PRODUCERS as usize];
    let mut received = 0usize;
    for c in consumers {
        for batch in c.join().unwrap() {
            // Within one batch, each producer's items keep their send order.
            let mut within = vec![None::<u64>; PRODUCERS as usize];
            for (id, seq) in batch {
                if let Some(prev) = within[id as usize] {
                    assert!(seq > prev, "batch reordered producer {}", id);
                }
                within[id as usize] = Some(seq);
                last_seen[id as usize] = Some(last_seen[id as usize].map_or(seq, |s| s.max(seq)));
                received += 1;
            }
        }
    }

    assert_eq!(received, total);
    assert!(q.is_empty());
    let m = q.metrics();
    assert_eq!(m.items_put, total as u64);
    assert_eq!(m.items_delivered, total as u64);
    assert_eq!(m.outstanding_waiters(), 0);
    for seen in last_seen {
        assert_eq!(seen, Some(PER_PRODUCER - 1));
    }
}

#[test]
fn test_metrics_fast_and_slow_paths() {
    let q = Queue::<u64>::with_config(Config::default().with_metrics(true));
    q.put_many([1, 2, 3]);
    assert_eq!(q.get_many(2), Ok(vec![1, 2]));

    let ticket = q.request(2).unwrap();
    q.put(4);
    assert_eq!(ticket.wait(), Ok(vec![3, 4]));

    let m = q.metrics();
    assert_eq!(m.items_put, 4);
    assert_eq!(m.items_delivered, 4);
    assert_eq!(m.fast_path_hits, 1);
    assert_eq!(m.waiters_registered, 1);
    assert_eq!(m.waiters_served, 1);
    assert_eq!(m.undelivered(), 0);
}

#[test]
fn test_metrics_disabled_by_default() {
    let q = Queue::<u64>::new();
    q.put(1);
    let _ = q.get();
    assert_eq!(q.metrics(), batchq_rs::Metrics::default());
}

#[test]
fn test_dropped_ticket_keeps_its_place() {
    let q = Queue::<u64>::new();
    drop(q.request(2).unwrap());
    let survivor = q.request(1).unwrap();

    q.put_many([1, 2, 3]);
    // The abandoned request still consumed the first two items.
    assert_eq!(survivor.wait(), Ok(vec![3]));
    assert!(q.is_empty());
}

#[test]
fn test_put_many_iterator_may_use_queue() {
    let q = Queue::<u64>::new();
    let (tx, rx) = mpsc::channel();

    let producer = q.clone();
    thread::spawn(move || {
        let observer = producer.clone();
        let mut next = 0u64;
        producer.put_many(std::iter::from_fn(|| {
            // Reads and writes the same queue while put_many is pulling items.
            let _ = observer.len();
            observer.put(100 + next);
            next += 1;
            (next <= 3).then_some(next)
        }));
        let _ = tx.send(());
    });

    rx.recv_timeout(Duration::from_secs(5))
        .expect("put_many blocked on an iterator using its own queue");
    // Items put from inside the iterator land before the batch itself.
    assert_eq!(q.get_many(7), Ok(vec![100, 101, 102, 103, 1, 2, 3]));
}

#[test]
fn test_put_many_panicking_iterator_leaves_queue_usable() {
    let q = Queue::<u64>::new();
    let mut pending = q.request(1).unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut count = 0u64;
        q.put_many(std::iter::from_fn(|| {
            count += 1;
            assert!(count < 2, "iterator failed");
            Some(count)
        }));
    }));
    assert!(result.is_err());

    // Nothing from the failed batch was appended.
    assert!(q.is_empty());
    assert_eq!(q.pending_waiters(), 1);
    assert_eq!(pending.try_take(), None);

    let later = q.request(1).unwrap();
    q.put_many([5, 6]);
    assert_eq!(pending.try_take(), Some(Ok(vec![5])));
    assert_eq!(later.wait(), Ok(vec![6]));
}
