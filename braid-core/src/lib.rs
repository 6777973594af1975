// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core types shared by the braid stream operators.
//!
//! - [`StreamItem`]: a value-or-error item flowing through operator streams
//! - [`BraidError`]: the error taxonomy surfaced to consumers
//! - [`TaskGroup`]: a set of spawned tasks that is cancelled and joined as a unit
//! - [`TaskScope`]: a child's handle on its group, used to observe cancellation

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod error;
pub mod stream_item;
pub mod task_group;

pub use self::error::{BraidError, IntoBraidError, Result, ResultExt};
pub use self::stream_item::StreamItem;
pub use self::task_group::{TaskGroup, TaskScope};
