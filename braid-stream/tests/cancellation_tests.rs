// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use braid_core::StreamItem;
use braid_stream::{combine_latest_all, CombineLatestExt, ZipWithExt};
use braid_test_utils::helpers::collect_values;
use braid_test_utils::{test_channel, unwrap_stream, StreamCounters, TrackedStream};
use futures::{stream, StreamExt};
use std::time::Duration;
use tokio::time::sleep;

async fn wait_for_drops(counters: &StreamCounters, expected: usize) {
    for _ in 0..50 {
        if counters.dropped() == expected {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_cancel_stops_every_listener() -> anyhow::Result<()> {
    // Arrange
    let counters = StreamCounters::new();
    let mut senders = Vec::new();
    let mut sources = Vec::new();
    for _ in 0..4 {
        let (tx, rx) = test_channel::<i32>();
        senders.push(tx);
        sources.push(TrackedStream::new(rx, &counters));
    }
    let mut combined = combine_latest_all(sources, |values: &[i32]| values.iter().sum::<i32>());

    for (index, tx) in senders.iter().enumerate() {
        tx.send(i32::try_from(index)?)?;
    }
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 6);
    assert_eq!(combined.live_listeners(), 4);
    assert!(!combined.is_cancelled());

    // Act
    combined.cancel().await;

    // Assert
    assert_eq!(counters.dropped(), 4);
    Ok(())
}

#[tokio::test]
async fn test_drop_cancels_listeners_without_waiting() -> anyhow::Result<()> {
    // Arrange
    let counters = StreamCounters::new();
    let (tx_a, a) = test_channel::<i32>();
    let (tx_b, b) = test_channel::<i32>();
    let mut combined =
        TrackedStream::new(a, &counters).combine_latest(TrackedStream::new(b, &counters), |a, b| a + b);

    tx_a.send(1)?;
    tx_b.send(2)?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 3);

    // Act
    drop(combined);
    wait_for_drops(&counters, 2).await;

    // Assert
    assert_eq!(counters.dropped(), 2);
    Ok(())
}

#[tokio::test]
async fn test_sources_are_not_pulled_before_first_poll() {
    // Arrange
    let counters = StreamCounters::new();
    let left = TrackedStream::new(stream::iter(0..).map(StreamItem::Value), &counters);
    let right = TrackedStream::new(stream::iter(0..).map(StreamItem::Value), &counters);

    // Act
    let zipped = left.zip_with(right, |a: i32, b: i32| a + b);
    sleep(Duration::from_millis(50)).await;

    // Assert
    assert_eq!(counters.pulled(), 0);
    drop(zipped);
    assert_eq!(counters.dropped(), 2);
}

#[tokio::test]
async fn test_fast_source_is_held_back_by_slow_consumer() -> anyhow::Result<()> {
    // Arrange
    let fast_counters = StreamCounters::new();
    let fast = TrackedStream::new(stream::iter(0u64..).map(StreamItem::Value), &fast_counters);
    let (tx_slow, slow) = test_channel::<u64>();
    let mut combined = fast.combine_latest(slow, |fast, slow| fast + slow);

    tx_slow.send(1000)?;
    unwrap_stream(&mut combined, 500).await?;
    let pulled_at_first_output = fast_counters.pulled();

    // Act
    for _ in 0..4 {
        unwrap_stream(&mut combined, 500).await?;
    }
    let pulled_after_five = fast_counters.pulled();
    sleep(Duration::from_millis(50)).await;

    // Assert: one pull per output, and nothing while the consumer is idle
    assert!(pulled_after_five - pulled_at_first_output <= 5);
    assert_eq!(fast_counters.pulled(), pulled_after_five);

    combined.cancel().await;
    assert_eq!(fast_counters.dropped(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_combine_latest_all_on_multi_thread_runtime() {
    // Arrange
    let sources: Vec<_> = (0..4)
        .map(|_| stream::iter((1..=100).map(StreamItem::Value)))
        .collect();

    // Act
    let mut combined = combine_latest_all(sources, |values: &[i32]| values.iter().sum::<i32>());
    let (sums, error) = collect_values(&mut combined, 1000).await;

    // Assert
    assert!(error.is_none());
    assert!(sums.len() <= 400);
    assert_eq!(sums.last(), Some(&400));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_on_multi_thread_runtime_joins_every_listener() {
    // Arrange
    let counters = StreamCounters::new();
    let sources: Vec<_> = (0..8)
        .map(|_| TrackedStream::new(stream::iter(0..).map(StreamItem::Value), &counters))
        .collect();
    let mut combined = combine_latest_all(sources, |values: &[i64]| values.len());

    // Act
    for _ in 0..10 {
        let _ = combined.next().await;
    }
    combined.cancel().await;

    // Assert
    assert_eq!(counters.dropped(), 8);
}
