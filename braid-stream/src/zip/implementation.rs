// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::braided::{Braided, Launch, Phase};
use crate::emitter::Emitter;
use crate::listener::{signal_channel, spawn_listener, Ack, Signal, SignalReceiver};
use braid_core::{BraidError, Result, StreamItem, TaskGroup};
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::{Stream, StreamExt};

const OPERATOR: &str = "zip";

/// Which side of the zip a value came from.
pub(crate) enum Side<A, B> {
    Left(A),
    Right(B),
}

/// Two-sided rendezvous engine.
///
/// Each side has a single slot holding at most one unconsumed value together
/// with the ack of its listener. The listener stays parked until its value
/// has been paired and everything the pair produced has been taken.
pub(crate) struct ZipEngine<A, B, R, F> {
    transform: F,
    signals: SignalReceiver<Side<A, B>>,
    group: TaskGroup,
    emitter: Emitter<R>,
    left: Option<(A, Ack)>,
    right: Option<(B, Ack)>,
    held_acks: Vec<Ack>,
    phase: Phase,
}

impl<A, B, R, F> ZipEngine<A, B, R, F>
where
    F: FnMut(&mut Emitter<R>, A, B) -> Result<()>,
{
    fn new(transform: F, signals: SignalReceiver<Side<A, B>>, group: TaskGroup) -> Self {
        Self {
            transform,
            signals,
            group,
            emitter: Emitter::new(),
            left: None,
            right: None,
            held_acks: Vec::with_capacity(2),
            phase: Phase::Running,
        }
    }

    fn shut_down(&mut self, outcome: Option<BraidError>) {
        // Dropping the acks releases any listener still parked on one
        self.left = None;
        self.right = None;
        self.held_acks.clear();
        self.signals.close();
        self.phase = Phase::drain(&self.group, outcome);
    }

    /// Consume both slots if they are full. Returns `false` otherwise.
    fn pair(&mut self) -> bool {
        if self.left.is_none() || self.right.is_none() {
            return false;
        }

        if let (Some((a, left_ack)), Some((b, right_ack))) = (self.left.take(), self.right.take())
        {
            self.held_acks.push(left_ack);
            self.held_acks.push(right_ack);
            if let Err(error) = (self.transform)(&mut self.emitter, a, b) {
                error!("{}: transform failed: {}", OPERATOR, error);
                self.shut_down(Some(error));
            }
        }
        true
    }

    fn on_signal(&mut self, signal: Option<Signal<Side<A, B>>>) {
        match signal {
            Some(Signal::Value { value, ack, .. }) => match value {
                Side::Left(a) => self.left = Some((a, ack)),
                Side::Right(b) => self.right = Some((b, ack)),
            },
            Some(Signal::Completed { index }) => {
                debug!("{}: side {} completed, cancelling the other", OPERATOR, index);
                self.shut_down(None);
            }
            Some(Signal::Failed { index, error }) => {
                error!("{}: side {} failed: {}", OPERATOR, index, error);
                self.shut_down(Some(error));
            }
            // Both listeners are gone without an outcome. A side holding a
            // pending value was parked on its ack, so blame the other one.
            None => {
                let index = if self.left.is_none() { 0 } else { 1 };
                self.shut_down(Some(BraidError::listener_lost(index)));
            }
        }
    }
}

// Fields are never pinned, so the engine can move freely
impl<A, B, R, F> Unpin for ZipEngine<A, B, R, F> {}

impl<A, B, R, F> Stream for ZipEngine<A, B, R, F>
where
    F: FnMut(&mut Emitter<R>, A, B) -> Result<()>,
{
    type Item = StreamItem<R>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let engine = self.get_mut();

        loop {
            if let Some(value) = engine.emitter.take_next() {
                return Poll::Ready(Some(StreamItem::Value(value)));
            }

            if let Some(terminal) = engine.phase.poll_terminal(cx) {
                return terminal;
            }

            for ack in engine.held_acks.drain(..) {
                let _ = ack.send(());
            }

            if engine.pair() {
                continue;
            }

            let signal = futures::ready!(engine.signals.poll_next_unpin(cx));
            engine.on_signal(signal);
        }
    }
}

/// Build the output stream of a zip operator over `left` and `right`.
pub(crate) fn launch_zip<SA, SB, A, B, R, F>(left: SA, right: SB, transform: F) -> Braided<R>
where
    SA: Stream<Item = StreamItem<A>> + Send + 'static,
    SB: Stream<Item = StreamItem<B>> + Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: FnMut(&mut Emitter<R>, A, B) -> Result<()> + Send + 'static,
{
    let group = TaskGroup::new();
    let (sender, signals) = signal_channel();
    let engine = ZipEngine::new(transform, signals, group.clone());
    let launch: Launch = Box::new(move |group: &TaskGroup| {
        spawn_listener(group, OPERATOR, 0, left, sender.clone(), Side::Left);
        spawn_listener(group, OPERATOR, 1, right, sender, Side::Right);
    });

    Braided::new(engine, group, launch)
}
