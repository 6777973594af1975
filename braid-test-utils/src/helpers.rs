// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use braid_core::{BraidError, Result, StreamItem};
use futures::stream::StreamExt;
use futures::Stream;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Wait up to `timeout_ms` for the next item of `stream`.
///
/// Returns the value, the error the stream yielded, or a stream error when
/// the stream ended or nothing arrived in time.
pub async fn unwrap_stream<S, T>(stream: &mut S, timeout_ms: u64) -> Result<T>
where
    S: Stream<Item = StreamItem<T>> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(Some(StreamItem::Value(value))) => Ok(value),
        Ok(Some(StreamItem::Error(error))) => Err(error),
        Ok(None) => Err(BraidError::stream_error("Stream ended")),
        Err(_) => Err(BraidError::stream_error(format!(
            "No item within {timeout_ms}ms"
        ))),
    }
}

/// Unwraps a value from an optional stream item, panicking on errors and end of stream.
pub fn unwrap_value<T>(item: Option<StreamItem<T>>) -> T {
    match item {
        Some(StreamItem::Value(value)) => value,
        Some(StreamItem::Error(error)) => panic!("Expected a value, got error: {error}"),
        None => panic!("Expected a value, stream ended"),
    }
}

pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        _item = stream.next() => {
            panic!("Unexpected item emitted, expected no output.");
        }
        _ = sleep(Duration::from_millis(timeout_ms)) => {
        }
    }
}

/// Assert that `stream` ends within `timeout_ms` without yielding anything else.
pub async fn assert_stream_ended<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = StreamItem<T>> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(None) => {}
        Ok(Some(StreamItem::Value(_))) => panic!("Expected end of stream, got a value"),
        Ok(Some(StreamItem::Error(error))) => {
            panic!("Expected end of stream, got error: {error}")
        }
        Err(_) => panic!("Stream did not end within {timeout_ms}ms"),
    }
}

/// Drain `stream` until it ends, returning its values and the error it ended
/// with, if any. Panics if the stream stalls for longer than `timeout_ms`.
pub async fn collect_values<S, T>(stream: &mut S, timeout_ms: u64) -> (Vec<T>, Option<BraidError>)
where
    S: Stream<Item = StreamItem<T>> + Unpin,
{
    let mut values = Vec::new();
    loop {
        match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
            Ok(Some(StreamItem::Value(value))) => values.push(value),
            Ok(Some(StreamItem::Error(error))) => return (values, Some(error)),
            Ok(None) => return (values, None),
            Err(_) => panic!(
                "Stream stalled for {timeout_ms}ms after {} value(s)",
                values.len()
            ),
        }
    }
}
