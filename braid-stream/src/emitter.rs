// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::collections::VecDeque;

/// Emission context handed to transform functions.
///
/// A transform may call [`emit`](Self::emit) any number of times per trigger,
/// including zero. Emitted values reach the consumer in call order, and the
/// sources that caused the trigger stay parked until all of them have been
/// taken downstream.
///
/// # Example
///
/// ```
/// use braid_stream::CombineLatestExt;
/// use braid_core::StreamItem;
/// use futures::{stream, StreamExt};
///
/// # #[tokio::main]
/// # async fn main() {
/// let temperatures = stream::iter(vec![StreamItem::Value(21)]);
/// let thresholds = stream::iter(vec![StreamItem::Value(20)]);
///
/// let alerts: Vec<_> = temperatures
///     .combine_transform(thresholds, |out, temp: &i32, limit: &i32| {
///         if temp > limit {
///             out.emit(format!("too warm: {temp}"));
///             out.emit(format!("limit: {limit}"));
///         }
///         Ok(())
///     })
///     .collect()
///     .await;
///
/// assert_eq!(alerts.len(), 2);
/// # }
/// ```
#[derive(Debug)]
pub struct Emitter<R> {
    buffer: VecDeque<R>,
}

impl<R> Emitter<R> {
    pub(crate) fn new() -> Self {
        Self {
            buffer: VecDeque::new(),
        }
    }

    /// Queue `value` for delivery downstream.
    pub fn emit(&mut self, value: R) {
        self.buffer.push_back(value);
    }

    /// Number of values emitted and not yet taken by the consumer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if nothing is waiting for the consumer.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub(crate) fn take_next(&mut self) -> Option<R> {
        self.buffer.pop_front()
    }
}
