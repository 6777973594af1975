// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Stream combinators that merge several independently progressing streams.
//!
//! Every operator attaches one listener task per upstream source. A listener
//! pulls one item, hands it to the operator's engine, and waits for an
//! acknowledgement before pulling again. The engine runs as the poll loop of
//! the returned [`Braided`] stream and decides after each signal whether to
//! emit.
//!
//! # Operators
//!
//! - **[`combine_latest`](CombineLatestExt::combine_latest)**: emits the latest
//!   value of every source whenever any source produces, once all have produced.
//!   Also available for two to five typed sources ([`combine_latest3`], ...) and
//!   for any number of same-typed sources ([`combine_latest_all`],
//!   [`combine_latest!`]).
//! - **[`zip_with`](ZipWithExt::zip_with)**: pairs two sources by position,
//!   using every value exactly once and stopping at the shorter side.
//!
//! Each operator has a `*_transform` variant whose function receives an
//! [`Emitter`] and may emit zero, one or many values per trigger.
//!
//! # Backpressure
//!
//! A source is never pulled more than one value ahead of the engine. After a
//! value triggers output, its listener stays parked until all of that output
//! has been taken by the consumer, so a slow consumer slows every source.
//!
//! # Termination
//!
//! - A source error, or an `Err` returned from a transform, cancels every
//!   listener, waits for all of them to stop, and is then emitted as the final
//!   [`StreamItem::Error`]
//! - Dropping a [`Braided`] cancels its listeners without waiting;
//!   [`Braided::cancel`] cancels and waits
//!
//! # Runtime
//!
//! Listener tasks are spawned on tokio (`runtime-tokio`, default) or smol
//! (`runtime-smol`). Logging goes through `tracing` when the `tracing` feature
//! is enabled.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;
mod listener;

pub mod braided;
pub mod combine_latest;
pub mod emitter;
pub mod zip;

// Re-export commonly used types
pub use braid_core::{BraidError, Result, StreamItem};
pub use braided::Braided;
pub use combine_latest::{
    box_source, combine_latest2, combine_latest3, combine_latest4, combine_latest5,
    combine_latest_all, combine_transform2, combine_transform3, combine_transform4,
    combine_transform5, combine_transform_all, BoxedSource, CombineLatestExt,
};
pub use emitter::Emitter;
pub use zip::ZipWithExt;
