// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The `combine_latest` family of operators.
//!
//! Every form attaches one listener task per source and emits from the latest
//! value of each source whenever any of them produces, once all of them have
//! produced at least once.
//!
//! # Behavior
//!
//! - Nothing is emitted until every source has produced a value
//! - After that, every value from any source triggers the combining function
//! - A source that completes without ever producing completes the output
//! - A source that completes after producing keeps its last value; the output
//!   completes once every source has completed
//! - The first error (from a source or from the combining function) cancels the
//!   other listeners, waits for them to stop, and is then emitted as the last item
//! - Each source is parked after every value until the outputs that value
//!   triggered have been taken downstream
//!
//! # Forms
//!
//! - [`CombineLatestExt`]: two sources, method syntax
//! - [`combine_latest2`] .. [`combine_latest5`]: two to five sources of
//!   different item types
//! - [`combine_latest_all`] and the [`combine_latest!`](crate::combine_latest!)
//!   macro: any number of sources of one item type
//!
//! Each form has a `combine_transform` counterpart whose function receives an
//! [`Emitter`] and may emit any number of values per trigger.
//!
//! # Example
//!
//! ```rust
//! use braid_stream::CombineLatestExt;
//! use braid_test_utils::{helpers::unwrap_stream, test_channel};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (tx_name, names) = test_channel::<&str>();
//! let (tx_age, ages) = test_channel::<u32>();
//!
//! let mut combined = names.combine_latest(ages, |name, age| format!("{name} is {age}"));
//!
//! tx_name.send("alice").unwrap();
//! tx_age.send(30).unwrap();
//! assert_eq!(unwrap_stream(&mut combined, 500).await.unwrap(), "alice is 30");
//!
//! tx_age.send(31).unwrap();
//! assert_eq!(unwrap_stream(&mut combined, 500).await.unwrap(), "alice is 31");
//! # }
//! ```

mod arity;
mod implementation;
mod slots;

pub use arity::{
    combine_latest2, combine_latest3, combine_latest4, combine_latest5, combine_transform2,
    combine_transform3, combine_transform4, combine_transform5,
};

use crate::braided::Braided;
use crate::emitter::Emitter;
use crate::listener::{spawn_listener, SignalSender};
use braid_core::{BraidError, Result, StreamItem, TaskGroup};
use core::convert::identity;
use core::pin::Pin;
use futures::Stream;
use implementation::launch_combine;
use slots::VecSlots;

const OPERATOR: &str = "combine_latest";

/// A type-erased source, for collecting differently built streams of one item
/// type into a single collection.
pub type BoxedSource<T> = Pin<Box<dyn Stream<Item = StreamItem<T>> + Send>>;

/// Box `source` as a [`BoxedSource`].
pub fn box_source<S, T>(source: S) -> BoxedSource<T>
where
    S: Stream<Item = StreamItem<T>> + Send + 'static,
{
    Box::pin(source)
}

/// Extension trait providing `combine_latest` over two sources.
pub trait CombineLatestExt<T>: Stream<Item = StreamItem<T>> + Sized {
    /// Combine the latest values of `self` and `other` with `combine`.
    fn combine_latest<S2, T2, R, F>(self, other: S2, combine: F) -> Braided<R>
    where
        S2: Stream<Item = StreamItem<T2>> + Send + 'static,
        T2: Send + 'static,
        R: Send + 'static,
        F: FnMut(&T, &T2) -> R + Send + 'static;

    /// Like [`combine_latest`](Self::combine_latest), but `transform` decides
    /// how many values each update produces.
    fn combine_transform<S2, T2, R, F>(self, other: S2, transform: F) -> Braided<R>
    where
        S2: Stream<Item = StreamItem<T2>> + Send + 'static,
        T2: Send + 'static,
        R: Send + 'static,
        F: FnMut(&mut Emitter<R>, &T, &T2) -> Result<()> + Send + 'static;
}

impl<S, T> CombineLatestExt<T> for S
where
    S: Stream<Item = StreamItem<T>> + Send + 'static,
    T: Send + 'static,
{
    fn combine_latest<S2, T2, R, F>(self, other: S2, combine: F) -> Braided<R>
    where
        S2: Stream<Item = StreamItem<T2>> + Send + 'static,
        T2: Send + 'static,
        R: Send + 'static,
        F: FnMut(&T, &T2) -> R + Send + 'static,
    {
        combine_latest2(self, other, combine)
    }

    fn combine_transform<S2, T2, R, F>(self, other: S2, transform: F) -> Braided<R>
    where
        S2: Stream<Item = StreamItem<T2>> + Send + 'static,
        T2: Send + 'static,
        R: Send + 'static,
        F: FnMut(&mut Emitter<R>, &T, &T2) -> Result<()> + Send + 'static,
    {
        combine_transform2(self, other, transform)
    }
}

/// Combine the latest values of any number of same-typed sources, letting
/// `transform` emit any number of values per update.
///
/// `transform` sees the latest values as a slice in source order. With no
/// sources at all the output completes immediately.
pub fn combine_transform_all<I, S, T, R, F>(sources: I, mut transform: F) -> Braided<R>
where
    I: IntoIterator<Item = S>,
    S: Stream<Item = StreamItem<T>> + Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
    F: FnMut(&mut Emitter<R>, &[T]) -> Result<()> + Send + 'static,
{
    let sources: Vec<S> = sources.into_iter().collect();

    launch_combine(
        VecSlots::new(sources.len()),
        move |slots: &VecSlots<T>, emitter: &mut Emitter<R>| {
            let latest = slots.latest().ok_or_else(|| {
                BraidError::stream_error("combine_latest: a source has no value yet")
            })?;
            transform(emitter, latest)
        },
        move |group: &TaskGroup, signals: SignalSender<T>| {
            for (index, source) in sources.into_iter().enumerate() {
                spawn_listener(group, OPERATOR, index, source, signals.clone(), identity);
            }
        },
    )
}

/// Combine the latest values of any number of same-typed sources into one
/// value per update.
///
/// # Example
///
/// ```rust
/// use braid_stream::combine_latest_all;
/// use braid_test_utils::{helpers::unwrap_stream, test_channel};
///
/// # #[tokio::main]
/// # async fn main() {
/// let (tx_a, a) = test_channel::<i32>();
/// let (tx_b, b) = test_channel::<i32>();
/// let (tx_c, c) = test_channel::<i32>();
///
/// let mut sums = combine_latest_all(vec![a, b, c], |values: &[i32]| values.iter().sum::<i32>());
///
/// tx_a.send(1).unwrap();
/// tx_b.send(2).unwrap();
/// tx_c.send(3).unwrap();
/// assert_eq!(unwrap_stream(&mut sums, 500).await.unwrap(), 6);
/// # }
/// ```
pub fn combine_latest_all<I, S, T, R, F>(sources: I, mut combine: F) -> Braided<R>
where
    I: IntoIterator<Item = S>,
    S: Stream<Item = StreamItem<T>> + Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
    F: FnMut(&[T]) -> R + Send + 'static,
{
    combine_transform_all(sources, move |emitter: &mut Emitter<R>, latest: &[T]| {
        emitter.emit(combine(latest));
        Ok(())
    })
}

/// Combine the latest values of a fixed list of same-typed sources.
///
/// The sources may be streams of different concrete types; each is boxed
/// before being handed to [`combine_latest_all`].
///
/// ```rust
/// use braid_core::StreamItem;
/// use futures::{stream, StreamExt};
///
/// # #[tokio::main]
/// # async fn main() {
/// let a = stream::iter(vec![StreamItem::Value(1)]);
/// let b = stream::once(async { StreamItem::Value(10) });
///
/// let sums: Vec<_> = braid_stream::combine_latest!(a, b => |values: &[i32]| values[0] + values[1])
///     .collect()
///     .await;
///
/// assert_eq!(sums, vec![StreamItem::Value(11)]);
/// # }
/// ```
#[macro_export]
macro_rules! combine_latest {
    ($($source:expr),+ $(,)? => $combine:expr) => {
        $crate::combine_latest_all(
            ::std::vec![$($crate::combine_latest::box_source($source)),+],
            $combine,
        )
    };
}
