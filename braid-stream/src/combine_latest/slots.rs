// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::implementation::LatestSlots;

/// Slots for any number of same-typed sources.
///
/// Values wait in `pending` until every source has produced once; they are
/// then moved into `latest`, which is overwritten in place from then on and
/// handed to the combiner as a slice.
pub(crate) struct VecSlots<T> {
    arity: usize,
    pending: Vec<Option<T>>,
    missing: usize,
    latest: Vec<T>,
}

impl<T> VecSlots<T> {
    pub(crate) fn new(arity: usize) -> Self {
        Self {
            arity,
            pending: (0..arity).map(|_| None).collect(),
            missing: arity,
            latest: Vec::with_capacity(arity),
        }
    }

    /// The latest value of every source, once all of them have one.
    pub(crate) fn latest(&self) -> Option<&[T]> {
        (self.missing == 0).then_some(self.latest.as_slice())
    }
}

impl<T: Send + 'static> LatestSlots for VecSlots<T> {
    type Update = T;

    fn arity(&self) -> usize {
        self.arity
    }

    fn has_value(&self, index: usize) -> bool {
        if self.missing == 0 {
            index < self.latest.len()
        } else {
            self.pending.get(index).is_some_and(Option::is_some)
        }
    }

    fn store(&mut self, index: usize, update: T) {
        if self.missing == 0 {
            self.latest[index] = update;
            return;
        }

        if self.pending[index].replace(update).is_none() {
            self.missing -= 1;
        }
        if self.missing == 0 {
            self.latest.extend(self.pending.drain(..).flatten());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_is_hidden_until_every_slot_is_filled() {
        let mut slots = VecSlots::new(3);

        slots.store(0, "a0");
        slots.store(2, "c0");

        assert!(slots.latest().is_none());
        assert!(slots.has_value(0));
        assert!(!slots.has_value(1));
        assert!(slots.has_value(2));
    }

    #[test]
    fn test_refill_before_ready_keeps_missing_count() {
        let mut slots = VecSlots::new(2);

        slots.store(0, 1);
        slots.store(0, 2);
        assert!(slots.latest().is_none());

        slots.store(1, 10);
        assert_eq!(slots.latest(), Some(&[2, 10][..]));
    }

    #[test]
    fn test_updates_after_ready_overwrite_in_place() {
        let mut slots = VecSlots::new(2);
        slots.store(0, 1);
        slots.store(1, 10);
        let buffer = slots.latest().map(<[i32]>::as_ptr);

        slots.store(1, 11);
        slots.store(0, 2);

        assert_eq!(slots.latest(), Some(&[2, 11][..]));
        assert_eq!(slots.latest().map(<[i32]>::as_ptr), buffer);
        assert_eq!(slots.arity(), 2);
    }
}
