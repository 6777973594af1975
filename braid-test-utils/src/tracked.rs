// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Source wrappers that record how an operator drives its upstream.
//!
//! A [`TrackedStream`] counts every item pulled from the wrapped stream and
//! records when the stream is dropped. Operators drop a source when its
//! listener exits, so the drop count of a set of tracked streams tells how many
//! listeners have stopped.

use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Counters shared by one or more tracked streams.
#[derive(Clone, Debug, Default)]
pub struct StreamCounters {
    pulled: Arc<AtomicUsize>,
    dropped: Arc<AtomicUsize>,
}

impl StreamCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items pulled so far, across every stream sharing these counters.
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    /// Tracked streams dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// Stream wrapper counting pulls and drops.
///
/// # Example
///
/// ```rust
/// use braid_test_utils::{StreamCounters, TrackedStream};
/// use futures::{stream, StreamExt};
///
/// # #[tokio::main]
/// # async fn main() {
/// let counters = StreamCounters::new();
/// let mut tracked = TrackedStream::new(stream::iter(vec![1, 2, 3]), &counters);
///
/// tracked.next().await;
/// assert_eq!(counters.pulled(), 1);
///
/// drop(tracked);
/// assert_eq!(counters.dropped(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct TrackedStream<S> {
    inner: S,
    counters: StreamCounters,
}

impl<S> TrackedStream<S> {
    /// Wrap `inner`, recording into `counters`.
    pub fn new(inner: S, counters: &StreamCounters) -> Self {
        Self {
            inner,
            counters: counters.clone(),
        }
    }
}

impl<S> Stream for TrackedStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.inner).poll_next(cx);
        if let Poll::Ready(Some(_)) = &polled {
            self.counters.pulled.fetch_add(1, Ordering::SeqCst);
        }
        polled
    }
}

impl<S> Drop for TrackedStream<S> {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}
