// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use braid_core::StreamItem;
use braid_stream::{
    combine_latest, combine_latest3, combine_latest4, combine_latest5, combine_latest_all,
    combine_transform3, combine_transform_all, BoxedSource, CombineLatestExt, Emitter,
};
use braid_test_utils::helpers::{assert_stream_ended, collect_values};
use braid_test_utils::{assert_no_element_emitted, test_channel, unwrap_stream};
use futures::{stream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_combine_latest_emits_on_every_update_once_all_have_produced() -> anyhow::Result<()> {
    // Arrange
    let (tx_a, a) = test_channel::<i32>();
    let (tx_b, b) = test_channel::<char>();
    let mut combined = a.combine_latest(b, |a, b| (*a, *b));

    // Act & Assert
    tx_a.send(1)?;
    assert_no_element_emitted(&mut combined, 100).await;

    tx_b.send('a')?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, (1, 'a'));

    tx_a.send(2)?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, (2, 'a'));

    tx_b.send('b')?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, (2, 'b'));

    tx_b.send('c')?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, (2, 'c'));

    Ok(())
}

#[tokio::test]
async fn test_combine_latest_completes_when_every_source_completed() -> anyhow::Result<()> {
    // Arrange
    let (tx_a, a) = test_channel::<i32>();
    let (tx_b, b) = test_channel::<i32>();
    let mut combined = a.combine_latest(b, |a, b| a + b);

    tx_a.send(1)?;
    tx_b.send(10)?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 11);

    // Act
    drop(tx_a);
    assert_no_element_emitted(&mut combined, 100).await;

    // Completed source keeps its last value
    tx_b.send(20)?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 21);

    drop(tx_b);

    // Assert
    assert_stream_ended(&mut combined, 500).await;
    Ok(())
}

#[tokio::test]
async fn test_combine_latest_with_finite_sources_emits_once_per_value_after_first() {
    // Arrange
    let a = stream::iter(vec![1, 2].into_iter().map(StreamItem::Value));
    let b = stream::iter(vec![10, 20, 30].into_iter().map(StreamItem::Value));
    let invocations = Arc::new(AtomicUsize::new(0));
    let counter = invocations.clone();

    // Act
    let mut combined = a.combine_latest(b, move |a, b| {
        counter.fetch_add(1, Ordering::SeqCst);
        (*a, *b)
    });
    let (outputs, error) = collect_values(&mut combined, 500).await;

    // Assert
    assert!(error.is_none());
    assert_eq!(outputs.len(), invocations.load(Ordering::SeqCst));

    // Values consumed before the first output are folded into it; every
    // later value triggers exactly one output
    let first = outputs[0];
    let consumed_before_first = usize::try_from(first.0 + first.1 / 10).unwrap_or_default();
    assert_eq!(outputs.len(), 5 - consumed_before_first + 1);

    // Each output reflects exactly one new source value
    for pair in outputs.windows(2) {
        let changed = usize::from(pair[0].0 != pair[1].0) + usize::from(pair[0].1 != pair[1].1);
        assert_eq!(changed, 1, "{:?} -> {:?}", pair[0], pair[1]);
    }
    assert_eq!(outputs.last(), Some(&(2, 30)));
}

#[tokio::test]
async fn test_combine_latest3_keeps_each_source_type() -> anyhow::Result<()> {
    // Arrange
    let (tx_name, names) = test_channel::<String>();
    let (tx_age, ages) = test_channel::<u32>();
    let (tx_active, active) = test_channel::<bool>();
    let mut combined = combine_latest3(names, ages, active, |name, age, active| {
        format!("{name}:{age}:{active}")
    });

    // Act
    tx_name.send("alice".to_string())?;
    tx_age.send(30)?;
    assert_no_element_emitted(&mut combined, 100).await;
    tx_active.send(true)?;

    // Assert
    assert_eq!(unwrap_stream(&mut combined, 500).await?, "alice:30:true");

    tx_age.send(31)?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, "alice:31:true");
    Ok(())
}

#[tokio::test]
async fn test_combine_latest4_and_5_emit_once_per_update() -> anyhow::Result<()> {
    // Arrange
    let (tx1, s1) = test_channel::<u8>();
    let (tx2, s2) = test_channel::<u16>();
    let (tx3, s3) = test_channel::<u32>();
    let (tx4, s4) = test_channel::<u64>();
    let mut four = combine_latest4(s1, s2, s3, s4, |a, b, c, d| {
        u64::from(*a) + u64::from(*b) + u64::from(*c) + d
    });

    let five = combine_latest5(
        stream::iter(vec![StreamItem::Value(1)]),
        stream::iter(vec![StreamItem::Value("two")]),
        stream::iter(vec![StreamItem::Value(3.0)]),
        stream::iter(vec![StreamItem::Value('4')]),
        stream::iter(vec![StreamItem::Value(5u8)]),
        |a, b, c, d, e| format!("{a} {b} {c} {d} {e}"),
    );

    // Act
    tx1.send(1)?;
    tx2.send(2)?;
    tx3.send(3)?;
    tx4.send(4)?;

    // Assert
    assert_eq!(unwrap_stream(&mut four, 500).await?, 10);
    tx3.send(30)?;
    assert_eq!(unwrap_stream(&mut four, 500).await?, 37);

    let five: Vec<_> = five.collect().await;
    assert_eq!(five, vec![StreamItem::Value("1 two 3 4 5".to_string())]);
    Ok(())
}

#[tokio::test]
async fn test_combine_latest_all_hands_latest_values_in_source_order() -> anyhow::Result<()> {
    // Arrange
    let (tx_a, a) = test_channel::<i32>();
    let (tx_b, b) = test_channel::<i32>();
    let (tx_c, c) = test_channel::<i32>();
    let mut combined = combine_latest_all(vec![a, b, c], |values: &[i32]| values.to_vec());

    // Act
    tx_c.send(3)?;
    tx_a.send(1)?;
    assert_no_element_emitted(&mut combined, 100).await;
    tx_b.send(2)?;

    // Assert
    assert_eq!(unwrap_stream(&mut combined, 500).await?, vec![1, 2, 3]);

    tx_b.send(20)?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, vec![1, 20, 3]);
    Ok(())
}

#[tokio::test]
async fn test_combine_latest_all_without_sources_completes_immediately() {
    // Arrange
    let sources: Vec<BoxedSource<i32>> = Vec::new();

    // Act
    let mut combined = combine_latest_all(sources, |values: &[i32]| values.len());

    // Assert
    assert_stream_ended(&mut combined, 500).await;
}

#[tokio::test]
async fn test_combine_latest_macro_accepts_mixed_stream_types() -> anyhow::Result<()> {
    // Arrange
    let (tx, channel) = test_channel::<i32>();
    let fixed = stream::iter(vec![StreamItem::Value(100)]);
    let mut combined = combine_latest!(channel, fixed => |values: &[i32]| values.iter().sum::<i32>());

    // Act
    tx.send(1)?;

    // Assert
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 101);
    tx.send(2)?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 102);
    Ok(())
}

#[tokio::test]
async fn test_combine_transform_emits_zero_or_many_values_per_update() -> anyhow::Result<()> {
    // Arrange
    let (tx_a, a) = test_channel::<i32>();
    let (tx_b, b) = test_channel::<i32>();
    let mut combined = a.combine_transform(b, |out: &mut Emitter<i32>, a, b| {
        if a % 2 == 1 {
            out.emit(*a);
            out.emit(a * b);
        }
        Ok(())
    });

    // Act
    tx_b.send(10)?;
    tx_a.send(1)?;

    // Assert
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 1);
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 10);

    tx_a.send(2)?;
    assert_no_element_emitted(&mut combined, 100).await;

    tx_a.send(3)?;
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 3);
    assert_eq!(unwrap_stream(&mut combined, 500).await?, 30);
    Ok(())
}

#[tokio::test]
async fn test_combine_transform3_and_all_share_semantics() -> anyhow::Result<()> {
    // Arrange
    let (tx1, s1) = test_channel::<i32>();
    let (tx2, s2) = test_channel::<i32>();
    let (tx3, s3) = test_channel::<i32>();
    let mut typed = combine_transform3(s1, s2, s3, |out, a, b, c| {
        out.emit(a + b + c);
        Ok(())
    });

    let (tx4, s4) = test_channel::<i32>();
    let (tx5, s5) = test_channel::<i32>();
    let (tx6, s6) = test_channel::<i32>();
    let mut all = combine_transform_all(vec![s4, s5, s6], |out, values: &[i32]| {
        out.emit(values.iter().sum::<i32>());
        Ok(())
    });

    // Act
    for (value, tx) in [(1, &tx1), (2, &tx2), (3, &tx3)] {
        tx.send(value)?;
    }
    for (value, tx) in [(1, &tx4), (2, &tx5), (3, &tx6)] {
        tx.send(value)?;
    }

    // Assert
    assert_eq!(unwrap_stream(&mut typed, 500).await?, 6);
    assert_eq!(unwrap_stream(&mut all, 500).await?, 6);
    Ok(())
}
