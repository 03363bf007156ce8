//! Demonstration of batchq-stream features.
//!
//! Run with: `RUST_LOG=trace cargo run -p batchq-stream --bin demo`

use batchq_rs::{Queue, INSTRUMENTED_CONFIG};
use batchq_stream::{batches, items, QueueSink, StreamExt};
use futures_sink::Sink;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== batchq-stream Demo ===\n");

    demo_item_stream().await?;
    demo_batches().await?;
    demo_head_of_line().await?;
    demo_sink().await?;

    println!("\n=== All demos completed successfully! ===");
    Ok(())
}

/// Demo 1: items stream fed by a producer task
async fn demo_item_stream() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 1: Item Stream ---");

    let queue = Queue::new();
    let mut rx = items(queue.clone());

    let producer = {
        let queue = queue.clone();
        tokio::spawn(async move {
            for i in 0..5u64 {
                queue.put(i);
                println!("  Put: {}", i);
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
    };

    for _ in 0..5 {
        if let Some(item) = rx.next().await {
            println!("  Received: {}", item);
        }
    }

    producer.await?;
    println!();
    Ok(())
}

/// Demo 2: fixed-size batches
async fn demo_batches() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 2: Batches ---");

    let queue = Queue::with_config(INSTRUMENTED_CONFIG);
    let mut rx = batches(queue.clone(), 4)?;

    queue.put_many(0..10u64);
    for _ in 0..2 {
        let batch = rx.next().await.ok_or("stream ended")?;
        println!("  Batch: {:?}", batch);
    }

    // Two items remain; the next batch of four is not available yet.
    let blocked = timeout(Duration::from_millis(10), rx.next()).await.is_err();
    println!("  Third batch blocked with 2 items buffered: {}", blocked);

    queue.put_many([10, 11]);
    println!("  Batch: {:?}", rx.next().await.ok_or("stream ended")?);

    let m = queue.metrics();
    println!(
        "  Metrics: put={} delivered={} waiters={}/{}",
        m.items_put, m.items_delivered, m.waiters_served, m.waiters_registered
    );
    println!();
    Ok(())
}

/// Demo 3: a small request waits behind a larger, earlier one
async fn demo_head_of_line() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 3: Head-of-Line Ordering ---");

    let queue = Queue::<u64>::new();
    let big = tokio::spawn(queue.request(3)?);
    let small = tokio::spawn(queue.request(1)?);

    queue.put(1);
    tokio::time::sleep(Duration::from_millis(5)).await;
    println!("  After 1 item: small served = {}", small.is_finished());

    queue.put_many([2, 3, 4]);
    println!("  Big request got:   {:?}", big.await??);
    println!("  Small request got: {:?}", small.await??);
    println!();
    Ok(())
}

/// Demo 4: Sink trait
async fn demo_sink() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 4: Sink Trait ---");

    let queue = Queue::new();
    let mut tx = QueueSink::new(queue.clone());
    let mut rx = batches(queue.clone(), 3)?;

    for i in 100..103u64 {
        wait_ready(&mut tx).await?;
        Pin::new(&mut tx).start_send(i)?;
        println!("  Sent via Sink: {}", i);
    }

    println!("  Batch: {:?}", rx.next().await.ok_or("stream ended")?);
    println!();
    Ok(())
}

/// Waits until the sink is ready, without pulling in `futures::SinkExt`.
async fn wait_ready(
    tx: &mut QueueSink<u64>,
) -> Result<(), batchq_stream::StreamError> {
    std::future::poll_fn(|cx| Pin::new(&mut *tx).poll_ready(cx)).await
}
