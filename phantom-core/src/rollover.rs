//! Ordered set of the non-modifier keys that make it into the report.
//!
//! The newest press sits at the front. A release closes its gap by shifting
//! later entries forward, so survivors keep their relative order. Once six
//! keys are held, further presses are dropped: they stay pressed in the
//! tracker but never reach the host.

use heapless::Vec;

use crate::layout::KeyPosition;
use crate::ROLLOVER_SLOTS;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RolloverQueue {
    keys: Vec<KeyPosition, ROLLOVER_SLOTS>,
}

impl RolloverQueue {
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Put a newly pressed key at the front. Returns `false` when the key was
    /// dropped because the queue is full or already holds it.
    pub fn press(&mut self, position: KeyPosition) -> bool {
        if self.contains(position) {
            return false;
        }
        if self.keys.insert(0, position).is_err() {
            kb_debug!("rollover full, dropping {}", position);
            return false;
        }
        true
    }

    /// Remove a released key, compacting the entries behind it. Returns
    /// `false` if the key was never queued (e.g. it overflowed on press).
    pub fn release(&mut self, position: KeyPosition) -> bool {
        match self.keys.iter().position(|&p| p == position) {
            Some(slot) => {
                self.keys.remove(slot);
                true
            }
            None => {
                kb_debug!("release of unqueued {}", position);
                false
            }
        }
    }

    pub fn contains(&self, position: KeyPosition) -> bool {
        self.keys.contains(&position)
    }

    /// Queued keys, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = KeyPosition> + '_ {
        self.keys.iter().copied()
    }

    pub fn as_slice(&self) -> &[KeyPosition] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.keys.is_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(index: usize) -> KeyPosition {
        KeyPosition::from_index(index).unwrap()
    }

    #[test]
    fn newest_press_goes_first() {
        let mut queue = RolloverQueue::new();
        assert!(queue.press(key(10)));
        assert!(queue.press(key(20)));
        assert!(queue.press(key(30)));
        assert_eq!(queue.as_slice(), &[key(30), key(20), key(10)]);
    }

    #[test]
    fn seventh_key_is_dropped() {
        let mut queue = RolloverQueue::new();
        for i in 1..=6 {
            assert!(queue.press(key(i)));
        }
        assert!(queue.is_full());
        assert!(!queue.press(key(7)));
        assert!(!queue.contains(key(7)));
        assert_eq!(
            queue.as_slice(),
            &[key(6), key(5), key(4), key(3), key(2), key(1)]
        );
    }

    #[test]
    fn release_compacts_without_reordering() {
        let mut queue = RolloverQueue::new();
        queue.press(key(1));
        queue.press(key(2));
        queue.press(key(3));
        assert!(queue.release(key(2)));
        assert_eq!(queue.as_slice(), &[key(3), key(1)]);
    }

    #[test]
    fn releasing_unqueued_key_is_a_no_op() {
        let mut queue = RolloverQueue::new();
        queue.press(key(1));
        assert!(!queue.release(key(9)));
        assert_eq!(queue.as_slice(), &[key(1)]);
    }

    #[test]
    fn duplicate_press_is_ignored() {
        let mut queue = RolloverQueue::new();
        queue.press(key(1));
        queue.press(key(2));
        assert!(!queue.press(key(1)));
        assert_eq!(queue.as_slice(), &[key(2), key(1)]);
    }

    #[test]
    fn slot_frees_up_after_release() {
        let mut queue = RolloverQueue::new();
        for i in 1..=6 {
            queue.press(key(i));
        }
        queue.release(key(3));
        assert!(queue.press(key(8)));
        assert_eq!(queue.iter().next(), Some(key(8)));
        assert_eq!(queue.len(), 6);
    }
}
