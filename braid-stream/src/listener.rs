// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Listener tasks: one per upstream source, each pulling in a loop and
//! handing values to the operator engine over a signal channel.

use braid_core::{BraidError, StreamItem, TaskGroup};
use futures::channel::{mpsc, oneshot};
use futures::future::{select, Either};
use futures::{Stream, StreamExt};

/// Acknowledgement a listener waits on before pulling its next value.
pub(crate) type Ack = oneshot::Sender<()>;

pub(crate) type SignalSender<U> = mpsc::UnboundedSender<Signal<U>>;
pub(crate) type SignalReceiver<U> = mpsc::UnboundedReceiver<Signal<U>>;

/// Event sent from a listener to its engine.
pub(crate) enum Signal<U> {
    /// The source produced a value. The listener is parked until `ack` fires.
    Value { index: usize, value: U, ack: Ack },
    /// The source ended normally.
    Completed { index: usize },
    /// The source yielded an error, or its listener died.
    Failed { index: usize, error: BraidError },
}

pub(crate) fn signal_channel<U>() -> (SignalSender<U>, SignalReceiver<U>) {
    mpsc::unbounded()
}

/// Reports a lost listener if the task unwinds before reaching a normal exit.
struct ExitGuard<U> {
    index: usize,
    signals: Option<SignalSender<U>>,
}

impl<U> ExitGuard<U> {
    fn disarm(mut self) {
        self.signals = None;
    }
}

impl<U> Drop for ExitGuard<U> {
    fn drop(&mut self) {
        if let Some(signals) = self.signals.take() {
            warn!("listener {} stopped without reporting an outcome", self.index);
            let _ = signals.unbounded_send(Signal::Failed {
                index: self.index,
                error: BraidError::listener_lost(self.index),
            });
        }
    }
}

/// Spawn the listener for source `index` into `group`.
///
/// `wrap` turns each source value into the engine's update type. The listener
/// pulls one value, sends it, and waits for the acknowledgement; every wait is
/// raced against cancellation of the group. The source is dropped when
/// the listener exits.
pub(crate) fn spawn_listener<S, T, U, W>(
    group: &TaskGroup,
    operator: &'static str,
    index: usize,
    source: S,
    signals: SignalSender<U>,
    wrap: W,
) where
    S: Stream<Item = StreamItem<T>> + Send + 'static,
    T: Send + 'static,
    U: Send + 'static,
    W: Fn(T) -> U + Send + 'static,
{
    group.spawn(move |scope| async move {
        let guard = ExitGuard {
            index,
            signals: Some(signals.clone()),
        };
        let mut source = Box::pin(source);
        let cancelled = scope.cancelled();
        futures::pin_mut!(cancelled);
        debug!("{}: listener {} started", operator, index);

        loop {
            let next = match select(source.next(), cancelled.as_mut()).await {
                Either::Left((next, _)) => next,
                Either::Right(_) => {
                    debug!("{}: listener {} cancelled while pulling", operator, index);
                    break;
                }
            };

            match next {
                Some(StreamItem::Value(value)) => {
                    let (ack, acked) = oneshot::channel();
                    let signal = Signal::Value {
                        index,
                        value: wrap(value),
                        ack,
                    };
                    if signals.unbounded_send(signal).is_err() {
                        break;
                    }

                    match select(acked, cancelled.as_mut()).await {
                        Either::Left((Ok(()), _)) => {}
                        // Engine dropped the ack: it is shutting down
                        Either::Left((Err(_), _)) => break,
                        Either::Right(_) => {
                            debug!("{}: listener {} cancelled awaiting ack", operator, index);
                            break;
                        }
                    }
                }
                Some(StreamItem::Error(error)) => {
                    debug!("{}: source {} failed: {}", operator, index, error);
                    let _ = signals.unbounded_send(Signal::Failed { index, error });
                    break;
                }
                None => {
                    debug!("{}: source {} completed", operator, index);
                    let _ = signals.unbounded_send(Signal::Completed { index });
                    break;
                }
            }
        }

        guard.disarm();
    });
}
