// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::braided::{Braided, Launch, Phase};
use crate::emitter::Emitter;
use crate::listener::{signal_channel, Ack, Signal, SignalReceiver, SignalSender};
use braid_core::{BraidError, Result, StreamItem, TaskGroup};
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::{Stream, StreamExt};

const OPERATOR: &str = "combine_latest";

/// Latest-value storage for the sources of one combine operator.
///
/// Implementations are written to only by the engine, one update at a time.
pub(crate) trait LatestSlots: Send + 'static {
    /// What a listener sends for one value of its source.
    type Update: Send + 'static;

    fn arity(&self) -> usize;

    fn has_value(&self, index: usize) -> bool;

    /// Overwrite the latest value of source `index`.
    fn store(&mut self, index: usize, update: Self::Update);
}

/// N-way combine engine.
///
/// Runs as the poll loop of the output stream. Each signal is handled in
/// full before the next is read: store the value, invoke the combiner once
/// every slot is filled, and hold the sender's ack until everything the
/// combiner emitted has been taken downstream.
pub(crate) struct CombineEngine<S, R, F>
where
    S: LatestSlots,
{
    slots: S,
    combiner: F,
    signals: SignalReceiver<S::Update>,
    group: TaskGroup,
    emitter: Emitter<R>,
    held_ack: Option<Ack>,
    filled: usize,
    completed: Vec<bool>,
    phase: Phase,
}

impl<S, R, F> CombineEngine<S, R, F>
where
    S: LatestSlots,
    F: FnMut(&S, &mut Emitter<R>) -> Result<()>,
{
    fn new(slots: S, combiner: F, signals: SignalReceiver<S::Update>, group: TaskGroup) -> Self {
        let arity = slots.arity();
        Self {
            slots,
            combiner,
            signals,
            group,
            emitter: Emitter::new(),
            held_ack: None,
            filled: 0,
            completed: vec![false; arity],
            phase: Phase::Running,
        }
    }

    fn shut_down(&mut self, outcome: Option<BraidError>) {
        self.held_ack = None;
        self.signals.close();
        self.phase = Phase::drain(&self.group, outcome);
    }

    fn on_value(&mut self, index: usize, update: S::Update, ack: Ack) {
        if !self.slots.has_value(index) {
            self.filled += 1;
        }
        self.slots.store(index, update);
        self.held_ack = Some(ack);

        if self.filled == self.slots.arity() {
            if let Err(error) = (self.combiner)(&self.slots, &mut self.emitter) {
                error!("{}: combining function failed: {}", OPERATOR, error);
                self.shut_down(Some(error));
            }
        }
    }

    fn on_completed(&mut self, index: usize) {
        self.completed[index] = true;

        if !self.slots.has_value(index) {
            debug!(
                "{}: source {} completed without a value, completing early",
                OPERATOR, index
            );
            self.shut_down(None);
        } else if self.completed.iter().all(|done| *done) {
            debug!("{}: all sources completed", OPERATOR);
            self.shut_down(None);
        }
    }

    fn on_closed(&mut self) {
        match self.completed.iter().position(|done| !done) {
            Some(index) => self.shut_down(Some(BraidError::listener_lost(index))),
            None => self.shut_down(None),
        }
    }
}

// Fields are never pinned, so the engine can move freely
impl<S: LatestSlots, R, F> Unpin for CombineEngine<S, R, F> {}

impl<S, R, F> Stream for CombineEngine<S, R, F>
where
    S: LatestSlots,
    F: FnMut(&S, &mut Emitter<R>) -> Result<()>,
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

            // Everything from the last trigger was taken: unpark its source
            if let Some(ack) = engine.held_ack.take() {
                let _ = ack.send(());
            }

            match futures::ready!(engine.signals.poll_next_unpin(cx)) {
                Some(Signal::Value { index, value, ack }) => engine.on_value(index, value, ack),
                Some(Signal::Completed { index }) => engine.on_completed(index),
                Some(Signal::Failed { index, error }) => {
                    error!("{}: source {} failed: {}", OPERATOR, index, error);
                    engine.shut_down(Some(error));
                }
                None => engine.on_closed(),
            }
        }
    }
}

/// Build the output stream of a combine operator.
///
/// `spawn` runs on first poll and must start one listener per source, each
/// with its own clone of the signal sender.
pub(crate) fn launch_combine<S, R, F, P>(slots: S, combiner: F, spawn: P) -> Braided<R>
where
    S: LatestSlots,
    R: Send + 'static,
    F: FnMut(&S, &mut Emitter<R>) -> Result<()> + Send + 'static,
    P: FnOnce(&TaskGroup, SignalSender<S::Update>) + Send + 'static,
{
    let group = TaskGroup::new();
    let (sender, signals) = signal_channel();
    let engine = CombineEngine::new(slots, combiner, signals, group.clone());
    let launch: Launch = Box::new(move |group: &TaskGroup| spawn(group, sender));

    Braided::new(engine, group, launch)
}
