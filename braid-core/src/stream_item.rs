// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::BraidError;

/// An item of a braid source or output: a value, or the error that ends it.
///
/// An operator stops right after emitting an `Error`.
#[derive(Debug, Clone)]
pub enum StreamItem<T> {
    Value(T),
    Error(BraidError),
}

// Errors never compare equal, so tests can only match them by pattern
impl<T: PartialEq> PartialEq for StreamItem<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StreamItem::Value(a), StreamItem::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> StreamItem<T> {
    /// Transform a value, passing an error through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StreamItem<U> {
        match self {
            StreamItem::Value(value) => StreamItem::Value(f(value)),
            StreamItem::Error(error) => StreamItem::Error(error),
        }
    }

    /// The value of this item.
    ///
    /// # Panics
    ///
    /// Panics with the error if this is an `Error`.
    pub fn unwrap(self) -> T {
        match self {
            StreamItem::Value(value) => value,
            StreamItem::Error(error) => panic!("StreamItem::unwrap on an error: {error}"),
        }
    }
}
