// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Extension trait providing the `zip_with` operator.
//!
//! Pairs the values of two sources strictly by position: the n-th output is
//! built from the n-th value of each side, and every value is used exactly once.
//!
//! # Behavior
//!
//! - Emits only when both sides hold a fresh, unconsumed value
//! - A side that runs ahead is parked until the other side catches up
//! - The output completes as soon as either side completes; the other listener
//!   is cancelled even if it is holding a value, so the output has
//!   `min(len(left), len(right))` items
//! - The first error cancels the other side and is emitted as the last item
//!
//! # Example
//!
//! ```rust
//! use braid_stream::ZipWithExt;
//! use braid_core::StreamItem;
//! use futures::{stream, StreamExt};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let letters = stream::iter(vec!['a', 'b', 'c'].into_iter().map(StreamItem::Value));
//! let numbers = stream::iter(vec![1, 2].into_iter().map(StreamItem::Value));
//!
//! let pairs: Vec<_> = letters
//!     .zip_with(numbers, |letter, number| format!("{letter}{number}"))
//!     .collect()
//!     .await;
//!
//! assert_eq!(
//!     pairs,
//!     vec![StreamItem::Value("a1".to_string()), StreamItem::Value("b2".to_string())]
//! );
//! # }
//! ```

mod implementation;

use crate::braided::Braided;
use crate::emitter::Emitter;
use braid_core::{Result, StreamItem};
use futures::Stream;
use implementation::launch_zip;

pub trait ZipWithExt<A>: Stream<Item = StreamItem<A>> + Sized {
    /// Pair each value of `self` with the value at the same position in
    /// `other`, producing `zip(a, b)`.
    fn zip_with<S2, B, R, F>(self, other: S2, zip: F) -> Braided<R>
    where
        S2: Stream<Item = StreamItem<B>> + Send + 'static,
        B: Send + 'static,
        R: Send + 'static,
        F: FnMut(A, B) -> R + Send + 'static;

    /// Like [`zip_with`](Self::zip_with), but `transform` takes ownership of
    /// each pair and may emit any number of values for it.
    ///
    /// Returning `Err` fails the output after the values already emitted for
    /// that pair.
    fn zip_transform<S2, B, R, F>(self, other: S2, transform: F) -> Braided<R>
    where
        S2: Stream<Item = StreamItem<B>> + Send + 'static,
        B: Send + 'static,
        R: Send + 'static,
        F: FnMut(&mut Emitter<R>, A, B) -> Result<()> + Send + 'static;
}

impl<S, A> ZipWithExt<A> for S
where
    S: Stream<Item = StreamItem<A>> + Send + 'static,
    A: Send + 'static,
{
    fn zip_with<S2, B, R, F>(self, other: S2, mut zip: F) -> Braided<R>
    where
        S2: Stream<Item = StreamItem<B>> + Send + 'static,
        B: Send + 'static,
        R: Send + 'static,
        F: FnMut(A, B) -> R + Send + 'static,
    {
        launch_zip(self, other, move |emitter: &mut Emitter<R>, a: A, b: B| {
            emitter.emit(zip(a, b));
            Ok(())
        })
    }

    fn zip_transform<S2, B, R, F>(self, other: S2, transform: F) -> Braided<R>
    where
        S2: Stream<Item = StreamItem<B>> + Send + 'static,
        B: Send + 'static,
        R: Send + 'static,
        F: FnMut(&mut Emitter<R>, A, B) -> Result<()> + Send + 'static,
    {
        launch_zip(self, other, transform)
    }
}
