//! The keyboard state machine: pressed state, rollover queue and modifier
//! mask in one owning struct, so every mutation goes through the scan task.

use crate::debounce::{Debounce, Immediate};
use crate::layout::{KeyPosition, LayoutEntry};
use crate::matrix::MatrixState;
use crate::report::{HidTransport, KeyboardReport, Modifiers};
use crate::rollover::RolloverQueue;
use crate::tracker::{KeyEvent, KeyEventKind, Tracker};

#[derive(Clone, Debug)]
pub struct Keyboard<D = Immediate> {
    tracker: Tracker<D>,
    rollover: RolloverQueue,
    modifiers: Modifiers,
}

impl<D: Debounce> Keyboard<D> {
    pub fn new(debounce: D) -> Self {
        Self {
            tracker: Tracker::new(debounce),
            rollover: RolloverQueue::new(),
            modifiers: Modifiers::empty(),
        }
    }

    /// Run edge detection over a full scan, in scan order, sending a fresh
    /// report after every event that affects it. Returns the number of
    /// events raised.
    pub fn process<T: HidTransport>(&mut self, scan: &MatrixState, transport: &mut T) -> usize {
        let mut events = 0;
        for position in KeyPosition::all() {
            if let Some(event) = self.tracker.observe(position, scan.is_asserted(position)) {
                events += 1;
                if self.dispatch(event) {
                    transport.send_report(&self.render());
                }
            }
        }
        events
    }

    /// Mark a key pressed without going through the debouncer. Returns
    /// `false` if it was already pressed.
    pub fn press(&mut self, position: KeyPosition) -> bool {
        match self.tracker.set(position, true) {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Mark a key released without going through the debouncer. Returns
    /// `false` if it was not pressed.
    pub fn release(&mut self, position: KeyPosition) -> bool {
        match self.tracker.set(position, false) {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Route an event to the modifier mask or the rollover queue. Returns
    /// `false` for unpopulated positions, which have no effect on the report.
    fn dispatch(&mut self, event: KeyEvent) -> bool {
        match (event.position.entry(), event.kind) {
            (LayoutEntry::Absent, _) => {
                kb_debug!("ignoring noise at unpopulated {}", event.position);
                false
            }
            (LayoutEntry::Modifier(bit), KeyEventKind::Press) => {
                self.modifiers.insert(bit);
                true
            }
            (LayoutEntry::Modifier(bit), KeyEventKind::Release) => {
                self.modifiers.remove(bit);
                true
            }
            (LayoutEntry::Key(_), KeyEventKind::Press) => {
                self.rollover.press(event.position);
                true
            }
            (LayoutEntry::Key(_), KeyEventKind::Release) => {
                self.rollover.release(event.position);
                true
            }
        }
    }

    /// Render the current state. Queue entries fill the key slots front to
    /// back; unused slots are 0.
    pub fn render(&self) -> KeyboardReport {
        let mut report = KeyboardReport::empty();
        for (slot, position) in report.keys.iter_mut().zip(self.rollover.iter()) {
            *slot = position.entry().output_code();
        }
        report.modifiers = self.modifiers.bits();
        report
    }

    pub fn is_pressed(&self, position: KeyPosition) -> bool {
        self.tracker.is_pressed(position)
    }

    pub fn tracker(&self) -> &Tracker<D> {
        &self.tracker
    }

    pub fn rollover(&self) -> &RolloverQueue {
        &self.rollover
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl<D: Debounce + Default> Default for Keyboard<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::Keycode;
    use crate::layout::{Col, Row};

    fn pos(row: u8, col: u8) -> KeyPosition {
        KeyPosition::new(Row::new(row).unwrap(), Col::new(col).unwrap())
    }

    #[derive(Default)]
    struct Recorder {
        reports: Vec<KeyboardReport>,
    }

    impl HidTransport for Recorder {
        fn is_configured(&self) -> bool {
            true
        }

        fn send_report(&mut self, report: &KeyboardReport) {
            self.reports.push(*report);
        }
    }

    const LCTRL: (u8, u8) = (0, 0);
    const LSHIFT: (u8, u8) = (1, 0);
    const KEY_A: (u8, u8) = (2, 1);
    const KEY_S: (u8, u8) = (2, 2);
    const UNPOPULATED: (u8, u8) = (0, 3);

    fn at((row, col): (u8, u8)) -> KeyPosition {
        pos(row, col)
    }

    #[test]
    fn modifiers_go_to_the_mask() {
        let mut kb: Keyboard = Keyboard::default();
        kb.press(at(LCTRL));
        kb.press(at(LSHIFT));
        kb.press(at(KEY_A));
        kb.release(at(LCTRL));
        assert_eq!(kb.modifiers(), Modifiers::LEFT_SHIFT);
        assert!(kb.rollover().iter().all(|p| !p.entry().is_modifier()));
    }

    #[test]
    fn render_fills_slots_front_to_back() {
        let mut kb: Keyboard = Keyboard::default();
        kb.press(at(KEY_A));
        kb.press(at(KEY_S));
        kb.press(at(LSHIFT));
        let report = kb.render();
        assert_eq!(report.modifiers, Modifiers::LEFT_SHIFT.bits());
        assert_eq!(
            report.keys,
            [Keycode::S as u8, Keycode::A as u8, 0, 0, 0, 0]
        );
    }

    #[test]
    fn render_twice_is_identical() {
        let mut kb: Keyboard = Keyboard::default();
        kb.press(at(KEY_A));
        assert_eq!(kb.render(), kb.render());
    }

    #[test]
    fn double_press_and_double_release_are_ignored() {
        let mut kb: Keyboard = Keyboard::default();
        assert!(kb.press(at(KEY_A)));
        assert!(!kb.press(at(KEY_A)));
        assert_eq!(kb.rollover().len(), 1);
        assert!(kb.release(at(KEY_A)));
        assert!(!kb.release(at(KEY_A)));
        assert!(kb.rollover().is_empty());
    }

    #[test]
    fn process_sends_a_report_per_event() {
        let mut kb: Keyboard = Keyboard::default();
        let mut usb = Recorder::default();

        let mut scan = MatrixState::new();
        scan.set(at(KEY_A), true);
        scan.set(at(LCTRL), true);
        assert_eq!(kb.process(&scan, &mut usb), 2);

        // LCtrl (index 0) comes before A (index 8) in scan order
        assert_eq!(usb.reports.len(), 2);
        assert_eq!(usb.reports[0].modifiers, 0x01);
        assert_eq!(usb.reports[0].keys, [0; 6]);
        assert_eq!(usb.reports[1].keys[0], Keycode::A as u8);

        // Same scan again: no change, nothing sent
        assert_eq!(kb.process(&scan, &mut usb), 0);
        assert_eq!(usb.reports.len(), 2);

        scan.set(at(KEY_A), false);
        assert_eq!(kb.process(&scan, &mut usb), 1);
        assert_eq!(usb.reports[2].keys, [0; 6]);
        assert_eq!(usb.reports[2].modifiers, 0x01);
    }

    #[test]
    fn unpopulated_positions_are_tracked_but_inert() {
        let mut kb: Keyboard = Keyboard::default();
        let mut usb = Recorder::default();

        let mut scan = MatrixState::new();
        scan.set(at(UNPOPULATED), true);
        assert_eq!(kb.process(&scan, &mut usb), 1);
        assert!(kb.is_pressed(at(UNPOPULATED)));
        assert!(usb.reports.is_empty());
        assert!(kb.rollover().is_empty());
    }

    #[test]
    fn overflow_press_still_reports() {
        let mut kb: Keyboard = Keyboard::default();
        let keys = [(2, 1), (2, 2), (2, 3), (2, 4), (2, 5), (2, 6), (2, 7)];
        for &k in &keys[..6] {
            kb.press(at(k));
        }
        let before = kb.render();

        let mut usb = Recorder::default();
        let mut scan = MatrixState::new();
        for &k in &keys {
            scan.set(at(k), true);
        }
        assert_eq!(kb.process(&scan, &mut usb), 1);
        assert!(kb.is_pressed(at(keys[6])));
        assert_eq!(usb.reports, vec![before]);
    }
}
