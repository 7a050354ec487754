//! Authoritative pressed/released state per matrix position.
//!
//! The tracker turns raw readings into press and release events. It is the
//! only writer of the pressed state; the rollover queue and modifier mask are
//! derived from the events it emits.

use crate::debounce::{Debounce, Immediate};
use crate::layout::KeyPosition;
use crate::NKEY;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Release,
}

/// A single accepted transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub position: KeyPosition,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub const fn press(position: KeyPosition) -> Self {
        Self {
            position,
            kind: KeyEventKind::Press,
        }
    }

    pub const fn release(position: KeyPosition) -> Self {
        Self {
            position,
            kind: KeyEventKind::Release,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Tracker<D = Immediate> {
    pressed: [bool; NKEY],
    debounce: D,
}

impl<D: Debounce> Tracker<D> {
    pub fn new(debounce: D) -> Self {
        Self {
            pressed: [false; NKEY],
            debounce,
        }
    }

    /// Feed one raw reading (`true` = switch closed). Returns the event if
    /// the debounced state changed.
    pub fn observe(&mut self, position: KeyPosition, raw: bool) -> Option<KeyEvent> {
        let was = self.pressed[position.index()];
        let now = self.debounce.filter(position, raw, was);
        self.set(position, now)
    }

    /// Force a position to a state, bypassing the debouncer. Returns the
    /// event if this was a transition; repeating the current state is a no-op.
    pub fn set(&mut self, position: KeyPosition, pressed: bool) -> Option<KeyEvent> {
        let slot = &mut self.pressed[position.index()];
        if *slot == pressed {
            return None;
        }
        *slot = pressed;

        let event = if pressed {
            KeyEvent::press(position)
        } else {
            KeyEvent::release(position)
        };
        kb_trace!("{:?} {}", event.kind, position);
        Some(event)
    }

    pub fn is_pressed(&self, position: KeyPosition) -> bool {
        self.pressed[position.index()]
    }

    /// Currently pressed positions in scan order.
    pub fn pressed(&self) -> impl Iterator<Item = KeyPosition> + '_ {
        KeyPosition::all().filter(move |p| self.is_pressed(*p))
    }
}

impl<D: Debounce + Default> Default for Tracker<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::Filtered;

    fn key(index: usize) -> KeyPosition {
        KeyPosition::from_index(index).unwrap()
    }

    #[test]
    fn edges_raise_events() {
        let mut tracker = Tracker::new(Immediate);
        assert_eq!(tracker.observe(key(3), false), None);
        assert_eq!(tracker.observe(key(3), true), Some(KeyEvent::press(key(3))));
        assert!(tracker.is_pressed(key(3)));
        assert_eq!(tracker.observe(key(3), true), None);
        assert_eq!(
            tracker.observe(key(3), false),
            Some(KeyEvent::release(key(3)))
        );
        assert!(!tracker.is_pressed(key(3)));
    }

    #[test]
    fn set_ignores_repeats() {
        let mut tracker: Tracker = Tracker::default();
        assert!(tracker.set(key(1), true).is_some());
        assert!(tracker.set(key(1), true).is_none());
        assert!(tracker.set(key(2), false).is_none());
    }

    #[test]
    fn pressed_lists_positions_in_scan_order() {
        let mut tracker: Tracker = Tracker::default();
        tracker.set(key(50), true);
        tracker.set(key(4), true);
        let pressed: Vec<_> = tracker.pressed().collect();
        assert_eq!(pressed, vec![key(4), key(50)]);
    }

    #[test]
    fn filtered_tracker_delays_the_event() {
        let mut tracker = Tracker::new(Filtered::<2>::new());
        assert_eq!(tracker.observe(key(0), true), None);
        assert_eq!(tracker.observe(key(0), true), Some(KeyEvent::press(key(0))));
    }
}
