// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fixed-arity combine operators for two to five differently typed sources.

use super::implementation::{launch_combine, LatestSlots};
use crate::braided::Braided;
use crate::emitter::Emitter;
use crate::listener::{spawn_listener, SignalSender};
use braid_core::{BraidError, Result, StreamItem, TaskGroup};
use futures::Stream;

/// Macro that generates one fixed-arity combine operator pair.
///
/// Each arity gets its own slot tuple and update enum, so every source keeps
/// its own item type and values are handed to the combining function as
/// positional arguments.
macro_rules! define_combine_arity {
    (
        $count:literal, $combine:ident, $transform:ident, $Slots:ident, $Update:ident;
        $($source:ident: $S:ident => $T:ident, $Variant:ident @ $idx:tt;)+
    ) => {
        pub(crate) enum $Update<$($T),+> {
            $($Variant($T)),+
        }

        pub(crate) struct $Slots<$($T),+> {
            latest: ($(Option<$T>,)+),
        }

        impl<$($T),+> $Slots<$($T),+> {
            fn new() -> Self {
                Self {
                    latest: ($(None::<$T>,)+),
                }
            }

            fn view(&self) -> Option<($(&$T,)+)> {
                Some(($(self.latest.$idx.as_ref()?,)+))
            }
        }

        impl<$($T: Send + 'static),+> LatestSlots for $Slots<$($T),+> {
            type Update = $Update<$($T),+>;

            fn arity(&self) -> usize {
                [$($idx),+].len()
            }

            fn has_value(&self, index: usize) -> bool {
                match index {
                    $($idx => self.latest.$idx.is_some(),)+
                    _ => false,
                }
            }

            fn store(&mut self, _index: usize, update: Self::Update) {
                match update {
                    $($Update::$Variant(value) => self.latest.$idx = Some(value),)+
                }
            }
        }

        #[doc = concat!("Combine the latest values of ", $count, " sources, letting `transform` emit any number of values per update.")]
        ///
        /// `transform` runs on every value from any source once each source has
        /// produced at least one, and receives the latest value of every source.
        /// Returning `Err` fails the output and cancels the remaining sources.
        pub fn $transform<$($S, $T,)+ R, F>($($source: $S,)+ mut transform: F) -> Braided<R>
        where
            $(
                $S: Stream<Item = StreamItem<$T>> + Send + 'static,
                $T: Send + 'static,
            )+
            R: Send + 'static,
            F: FnMut(&mut Emitter<R>, $(&$T),+) -> Result<()> + Send + 'static,
        {
            launch_combine(
                $Slots::new(),
                move |slots: &$Slots<$($T),+>, emitter: &mut Emitter<R>| {
                    let ($($source,)+) = slots.view().ok_or_else(|| {
                        BraidError::stream_error("combine_latest: a source has no value yet")
                    })?;
                    transform(emitter, $($source),+)
                },
                move |group: &TaskGroup, signals: SignalSender<$Update<$($T),+>>| {
                    $(
                        spawn_listener(
                            group,
                            "combine_latest",
                            $idx,
                            $source,
                            signals.clone(),
                            $Update::$Variant,
                        );
                    )+
                },
            )
        }

        #[doc = concat!("Combine the latest values of ", $count, " sources into one value per update.")]
        ///
        /// Nothing is emitted until every source has produced a value. After
        /// that, every value from any source yields `combine` of the latest
        /// value of each source.
        pub fn $combine<$($S, $T,)+ R, F>($($source: $S,)+ mut combine: F) -> Braided<R>
        where
            $(
                $S: Stream<Item = StreamItem<$T>> + Send + 'static,
                $T: Send + 'static,
            )+
            R: Send + 'static,
            F: FnMut($(&$T),+) -> R + Send + 'static,
        {
            $transform($($source,)+ move |emitter: &mut Emitter<R>, $($source: &$T),+| {
                emitter.emit(combine($($source),+));
                Ok(())
            })
        }
    };
}

define_combine_arity! {
    "two", combine_latest2, combine_transform2, Slots2, Update2;
    first: S1 => T1, First @ 0;
    second: S2 => T2, Second @ 1;
}

define_combine_arity! {
    "three", combine_latest3, combine_transform3, Slots3, Update3;
    first: S1 => T1, First @ 0;
    second: S2 => T2, Second @ 1;
    third: S3 => T3, Third @ 2;
}

define_combine_arity! {
    "four", combine_latest4, combine_transform4, Slots4, Update4;
    first: S1 => T1, First @ 0;
    second: S2 => T2, Second @ 1;
    third: S3 => T3, Third @ 2;
    fourth: S4 => T4, Fourth @ 3;
}

define_combine_arity! {
    "five", combine_latest5, combine_transform5, Slots5, Update5;
    first: S1 => T1, First @ 0;
    second: S2 => T2, Second @ 1;
    third: S3 => T3, Third @ 2;
    fourth: S4 => T4, Fourth @ 3;
    fifth: S5 => T5, Fifth @ 4;
}
