// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the braid operators.
//!
//! Two kinds of failure terminate an operator's output: an upstream source
//! yielding [`StreamItem::Error`](crate::StreamItem::Error), and a combining or
//! transform function returning `Err`. Both surface as a [`BraidError`].
//! Cancellation is never an error and has no variant here.
//!
//! # Examples
//!
//! ```
//! use braid_core::{BraidError, Result};
//!
//! fn pair(left: i32, right: i32) -> Result<i32> {
//!     left.checked_add(right)
//!         .ok_or_else(|| BraidError::stream_error("sum overflowed"))
//! }
//!
//! assert!(pair(i32::MAX, 1).is_err());
//! ```

/// Root error type for all braid operations.
#[derive(Debug, thiserror::Error)]
pub enum BraidError {
    /// Stream processing encountered an error
    ///
    /// This is a general error for stream operations that don't fit
    /// other specific categories.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// Custom error from user code
    ///
    /// Wraps errors produced by user-provided sources and combining functions.
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A listener task stopped without reporting completion or failure.
    ///
    /// This happens when the task driving a source panics or is torn down by
    /// the runtime while the operator is still running.
    #[error("Listener for source {index} terminated unexpectedly")]
    ListenerLost {
        /// Position of the source whose listener was lost
        index: usize,
    },
}

impl BraidError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Create a lost-listener error for the source at `index`
    pub const fn listener_lost(index: usize) -> Self {
        Self::ListenerLost { index }
    }

    /// Check if this error originated in user code.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::UserError(_))
    }
}

/// Specialized Result type for braid operations
pub type Result<T> = std::result::Result<T, BraidError>;

/// Extension trait for converting errors into `BraidError`
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`, so
/// combining functions can use `map_err(IntoBraidError::into_braid)`.
pub trait IntoBraidError {
    /// Convert this error into a `BraidError` with additional context
    fn into_braid_error(self, context: &str) -> BraidError;

    /// Convert this error into a `BraidError` without additional context
    fn into_braid(self) -> BraidError
    where
        Self: Sized,
    {
        self.into_braid_error("")
    }
}

impl<E: std::error::Error + Send + Sync + 'static> IntoBraidError for E {
    fn into_braid_error(self, context: &str) -> BraidError {
        if context.is_empty() {
            BraidError::user_error(self)
        } else {
            BraidError::stream_error(format!("{context}: {self}"))
        }
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(BraidError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(BraidError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<BraidError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        let context = context.into();
        self.with_context(|| context)
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            BraidError::UserError(inner) => BraidError::StreamProcessingError {
                context: format!("{}: {inner}", f()),
            },
            other => other,
        })
    }
}

impl Clone for BraidError {
    fn clone(&self) -> Self {
        match self {
            Self::StreamProcessingError { context } => Self::StreamProcessingError {
                context: context.clone(),
            },
            // The boxed source cannot be cloned, keep its rendering
            Self::UserError(e) => Self::StreamProcessingError {
                context: format!("User error: {e}"),
            },
            Self::ListenerLost { index } => Self::ListenerLost { index: *index },
        }
    }
}
