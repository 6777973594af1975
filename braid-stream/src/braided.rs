// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use braid_core::{BraidError, StreamItem, TaskGroup};
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::future::BoxFuture;
use futures::{Future, Stream};
use pin_project::{pin_project, pinned_drop};

/// Starts the listener tasks of an operator on first poll.
pub(crate) type Launch = Box<dyn FnOnce(&TaskGroup) + Send>;

/// Output stream of every braid operator.
///
/// Owns the operator's listener tasks. Nothing is pulled from the sources
/// until the stream is polled for the first time.
///
/// Dropping a `Braided` signals cancellation to every listener without
/// waiting; [`cancel`](Self::cancel) signals and then waits until each of
/// them has stopped and released its source.
#[pin_project(PinnedDrop)]
pub struct Braided<R> {
    engine: Pin<Box<dyn Stream<Item = StreamItem<R>> + Send>>,
    launch: Option<Launch>,
    group: TaskGroup,
}

impl<R> Braided<R> {
    pub(crate) fn new<E>(engine: E, group: TaskGroup, launch: Launch) -> Self
    where
        E: Stream<Item = StreamItem<R>> + Send + 'static,
    {
        Self {
            engine: Box::pin(engine),
            launch: Some(launch),
            group,
        }
    }

    /// Cancel the operator and wait for every listener task to terminate.
    ///
    /// Cancellation is not reported as an error: the stream is simply gone.
    pub async fn cancel(self) {
        let group = self.group.clone();
        drop(self);
        group.join().await;
    }

    /// Returns `true` once the listeners have been told to stop, either by
    /// cancellation or because the operator terminated early.
    pub fn is_cancelled(&self) -> bool {
        self.group.is_cancelled()
    }

    /// Number of listener tasks still running.
    pub fn live_listeners(&self) -> usize {
        self.group.live_tasks()
    }
}

impl<R> Stream for Braided<R> {
    type Item = StreamItem<R>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if let Some(launch) = this.launch.take() {
            launch(&*this.group);
        }
        this.engine.as_mut().poll_next(cx)
    }
}

#[pinned_drop]
impl<R> PinnedDrop for Braided<R> {
    fn drop(self: Pin<&mut Self>) {
        if !self.group.is_cancelled() {
            debug!(
                "output dropped, cancelling {} listener(s)",
                self.group.live_tasks()
            );
        }
        self.group.cancel();
    }
}

/// Termination state shared by the combine and zip engines.
pub(crate) enum Phase {
    Running,
    /// Listeners were cancelled; waiting for them to stop before emitting
    /// `outcome` (an error) or ending the stream.
    Draining {
        join: BoxFuture<'static, ()>,
        outcome: Option<BraidError>,
    },
    Done,
}

impl Phase {
    pub(crate) fn drain(group: &TaskGroup, outcome: Option<BraidError>) -> Self {
        group.cancel();
        let group = group.clone();
        Phase::Draining {
            join: Box::pin(async move { group.join().await }),
            outcome,
        }
    }

    /// Drive a terminating engine. Returns `None` while still running.
    pub(crate) fn poll_terminal<R>(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Option<Poll<Option<StreamItem<R>>>> {
        match self {
            Phase::Running => None,
            Phase::Draining { join, outcome } => match join.as_mut().poll(cx) {
                Poll::Pending => Some(Poll::Pending),
                Poll::Ready(()) => {
                    let outcome = outcome.take();
                    *self = Phase::Done;
                    Some(Poll::Ready(outcome.map(StreamItem::Error)))
                }
            },
            Phase::Done => Some(Poll::Ready(None)),
        }
    }
}
