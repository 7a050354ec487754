//! Debounce strategies for the state tracker.
//!
//! The scan loop already waits a few milliseconds between full scans, so the
//! default strategy takes every transition at face value. [`Filtered`] adds
//! a per-key counter for switches that chatter longer than one scan period.

use crate::layout::KeyPosition;
use crate::NKEY;

/// Decides which level a key is considered to be at after a raw reading.
pub trait Debounce {
    /// `raw` is this scan's reading, `pressed` the currently tracked state.
    /// Returns the state to track from now on.
    fn filter(&mut self, position: KeyPosition, raw: bool, pressed: bool) -> bool;
}

/// Accept every transition on the scan where it is first seen.
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate;

impl Debounce for Immediate {
    #[inline]
    fn filter(&mut self, _position: KeyPosition, raw: bool, _pressed: bool) -> bool {
        raw
    }
}

/// Require `THRESHOLD` consecutive readings that disagree with the tracked
/// state before accepting a change. At a 5ms scan rate, a threshold of 5
/// gives roughly 25ms of debounce.
#[derive(Clone, Debug)]
pub struct Filtered<const THRESHOLD: u8> {
    /// Per-key counters of consecutive readings that differ from the tracked state.
    counters: [u8; NKEY],
}

impl<const THRESHOLD: u8> Filtered<THRESHOLD> {
    pub const fn new() -> Self {
        Self {
            counters: [0; NKEY],
        }
    }
}

impl<const THRESHOLD: u8> Default for Filtered<THRESHOLD> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const THRESHOLD: u8> Debounce for Filtered<THRESHOLD> {
    fn filter(&mut self, position: KeyPosition, raw: bool, pressed: bool) -> bool {
        let counter = &mut self.counters[position.index()];

        if raw == pressed {
            // Reading agrees with the tracked state, start over
            *counter = 0;
            return pressed;
        }

        *counter = counter.saturating_add(1);
        if *counter >= THRESHOLD {
            *counter = 0;
            raw
        } else {
            pressed
        }
    }
}
