// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Structured groups of background tasks with cooperative cancellation.
//!
//! A [`TaskGroup`] spawns children on the configured runtime. Each child gets
//! a [`TaskScope`], its view of the group: it can observe cancellation but
//! not trigger it. Cancelling the group wakes every child waiting in
//! [`TaskScope::cancelled`]; [`TaskGroup::join`] waits until the last child
//! has finished.
//!
//! Both waits run on one `Event`, notified whenever the group changes state
//! (cancelled, or emptied).
//!
//! # Runtime Support
//!
//! - **Tokio**: `tokio::spawn` (default, feature `runtime-tokio`)
//! - **smol**: `smol::spawn` (feature `runtime-smol`)
//!
//! When both features are enabled, tokio is used.

use core::future::Future;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use event_listener::Event;
use std::sync::Arc;

#[cfg(not(any(feature = "runtime-tokio", feature = "runtime-smol")))]
compile_error!("braid-core needs a runtime: enable `runtime-tokio` or `runtime-smol`");

/// Handle to a group of spawned tasks.
///
/// Clones refer to the same group. Dropping a handle neither cancels nor
/// detaches anything; owners that want cancel-on-drop (such as the operator
/// streams) call [`cancel`](Self::cancel) from their own `Drop`.
///
/// # Example
///
/// ```rust
/// use braid_core::TaskGroup;
///
/// # #[tokio::main]
/// # async fn main() {
/// let group = TaskGroup::new();
///
/// for _ in 0..3 {
///     group.spawn(|scope| async move {
///         scope.cancelled().await;
///     });
/// }
///
/// assert_eq!(group.live_tasks(), 3);
/// group.shutdown().await;
/// assert_eq!(group.live_tasks(), 0);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TaskGroup {
    inner: Arc<Inner>,
}

/// A child's view of its [`TaskGroup`].
#[derive(Clone, Debug)]
pub struct TaskScope {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    live: AtomicUsize,
    changed: Event,
}

impl Inner {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn is_idle(&self) -> bool {
        self.live.load(Ordering::Acquire) == 0
    }

    async fn wait_until(&self, reached: fn(&Inner) -> bool) {
        loop {
            if reached(self) {
                return;
            }

            let listener = self.changed.listen();

            // The state may have changed before listen() registered
            if reached(self) {
                return;
            }

            listener.await;
        }
    }
}

/// Counts a child as live for as long as its future exists.
///
/// Held inside the spawned future so the count drops whether the child
/// returns, panics, or is discarded by the runtime.
struct LiveGuard {
    inner: Arc<Inner>,
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        if self.inner.live.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.changed.notify(usize::MAX);
        }
    }
}

impl TaskGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                live: AtomicUsize::new(0),
                changed: Event::new(),
            }),
        }
    }

    /// Spawn a child task bound to this group.
    ///
    /// The closure receives the child's [`TaskScope`]; the future it returns
    /// should race its suspension points against [`TaskScope::cancelled`] so
    /// it stops promptly once the group is cancelled. Children spawned after
    /// cancellation still start, and see an already cancelled scope.
    pub fn spawn<F, Fut>(&self, f: F)
    where
        F: FnOnce(TaskScope) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.live.fetch_add(1, Ordering::AcqRel);
        let guard = LiveGuard {
            inner: Arc::clone(&self.inner),
        };
        let child = f(self.scope());

        spawn_detached(async move {
            let _guard = guard;
            child.await;
        });
    }

    /// Signal cancellation to every child. Does not wait.
    ///
    /// Idempotent: only the first call wakes anyone.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.changed.notify(usize::MAX);
        }
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// A scope bound to this group, as handed to spawned children.
    pub fn scope(&self) -> TaskScope {
        TaskScope {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of children that have not finished yet.
    pub fn live_tasks(&self) -> usize {
        self.inner.live.load(Ordering::Acquire)
    }

    /// Wait until every child spawned so far has finished.
    pub async fn join(&self) {
        self.inner.wait_until(Inner::is_idle).await;
    }

    /// Cancel every child and wait for all of them to finish.
    pub async fn shutdown(&self) {
        self.cancel();
        self.join().await;
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScope {
    /// Returns `true` once the group has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Wait until the group is cancelled. Resolves immediately if it already is.
    pub async fn cancelled(&self) {
        self.inner.wait_until(Inner::is_cancelled).await;
    }
}

#[cfg(feature = "runtime-tokio")]
fn spawn_detached<Fut>(future: Fut)
where
    Fut: Future<Output = ()> + Send + 'static,
{
    // Detached: completion is tracked by LiveGuard, not the JoinHandle
    drop(tokio::spawn(future));
}

#[cfg(all(feature = "runtime-smol", not(feature = "runtime-tokio")))]
fn spawn_detached<Fut>(future: Fut)
where
    Fut: Future<Output = ()> + Send + 'static,
{
    smol::spawn(future).detach();
}
