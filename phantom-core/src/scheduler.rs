//! The main loop: wait for the host, then scan forever at a fixed cadence.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::debounce::{Debounce, Immediate};
use crate::keyboard::Keyboard;
use crate::matrix::{self, MatrixLines};
use crate::report::HidTransport;

/// Timing of the scan loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Pause before every full scan. This is the only debouncing the
    /// [`Immediate`] strategy gets.
    pub scan_interval_ms: u16,
    /// Settle time between driving a column and sampling the rows.
    pub settle_us: u16,
    /// Wait after the host configures the device before the first scan.
    pub startup_delay_ms: u16,
}

impl ScanConfig {
    pub const DEFAULT: Self = Self {
        scan_interval_ms: 5,
        settle_us: 1,
        startup_delay_ms: 1000,
    };
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Owns everything the scan loop touches. Nothing outside this struct can
/// mutate key state, which keeps the scan task the single writer.
pub struct Scheduler<L, T, Dl, D = Immediate> {
    lines: L,
    transport: T,
    delay: Dl,
    keyboard: Keyboard<D>,
    config: ScanConfig,
}

impl<L, T, Dl, D> Scheduler<L, T, Dl, D>
where
    L: MatrixLines,
    T: HidTransport,
    Dl: DelayMs<u16> + DelayUs<u16>,
    D: Debounce,
{
    pub fn new(lines: L, transport: T, delay: Dl, debounce: D, config: ScanConfig) -> Self {
        Self {
            lines,
            transport,
            delay,
            keyboard: Keyboard::new(debounce),
            config,
        }
    }

    /// Block until the host has configured the device, then let things
    /// settle and park every column at idle.
    pub fn init(&mut self) {
        while !self.transport.is_configured() {
            self.transport.poll();
        }
        kb_info!("usb configured, scanning starts in {}ms", self.config.startup_delay_ms);

        self.delay.delay_ms(self.config.startup_delay_ms);
        self.lines.release_all();
    }

    /// One pass of the scan loop. Returns the number of key events raised.
    pub fn cycle(&mut self) -> usize {
        self.delay.delay_ms(self.config.scan_interval_ms);
        self.transport.poll();

        let state = matrix::scan(&mut self.lines, &mut self.delay, self.config.settle_us);
        self.keyboard.process(&state, &mut self.transport)
    }

    /// Initialise, then scan forever.
    pub fn run(mut self) -> ! {
        self.init();
        loop {
            self.cycle();
        }
    }

    pub fn keyboard(&self) -> &Keyboard<D> {
        &self.keyboard
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn lines_mut(&mut self) -> &mut L {
        &mut self.lines
    }

    pub fn delay(&self) -> &Dl {
        &self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::Filtered;
    use crate::keycode::Keycode;
    use crate::layout::{Col, KeyPosition, Row};
    use crate::matrix::tests::{FakeDelay, FakeMatrix};
    use crate::report::KeyboardReport;
    use core::cell::Cell;

    fn pos(row: u8, col: u8) -> KeyPosition {
        KeyPosition::new(Row::new(row).unwrap(), Col::new(col).unwrap())
    }

    /// Becomes configured after a few polls.
    #[derive(Default)]
    struct FakeUsb {
        polls: Cell<u32>,
        configure_after: u32,
        reports: Vec<KeyboardReport>,
    }

    impl HidTransport for FakeUsb {
        fn poll(&mut self) {
            self.polls.set(self.polls.get() + 1);
        }

        fn is_configured(&self) -> bool {
            self.polls.get() >= self.configure_after
        }

        fn send_report(&mut self, report: &KeyboardReport) {
            self.reports.push(*report);
        }
    }

    fn scheduler<D: Debounce>(debounce: D) -> Scheduler<FakeMatrix, FakeUsb, FakeDelay, D> {
        let usb = FakeUsb {
            configure_after: 3,
            ..Default::default()
        };
        Scheduler::new(
            FakeMatrix::default(),
            usb,
            FakeDelay::default(),
            debounce,
            ScanConfig::DEFAULT,
        )
    }

    #[test]
    fn init_waits_for_configuration() {
        let mut s = scheduler(Immediate);
        s.init();
        assert_eq!(s.transport().polls.get(), 3);
        assert_eq!(s.delay().ms, 1000);
        assert_eq!(s.lines_mut().driven, None);
    }

    #[test]
    fn cycle_scans_and_reports() {
        let mut s = scheduler(Immediate);
        s.init();

        s.lines_mut().closed.push(pos(2, 1)); // A
        assert_eq!(s.cycle(), 1);
        assert_eq!(s.delay().ms, 1005);
        assert_eq!(s.transport().reports.len(), 1);
        assert_eq!(s.transport().reports[0].keys[0], Keycode::A as u8);

        // Held: no further reports
        assert_eq!(s.cycle(), 0);
        assert_eq!(s.transport().reports.len(), 1);

        s.lines_mut().closed.clear();
        assert_eq!(s.cycle(), 1);
        assert_eq!(s.transport().reports[1], KeyboardReport::empty());
    }

    #[test]
    fn same_scan_events_follow_scan_order() {
        let mut s = scheduler(Immediate);
        s.init();

        // A (col 1) is scanned before S (col 2), so S ends up most recent
        s.lines_mut().closed.extend([pos(2, 2), pos(2, 1)]);
        assert_eq!(s.cycle(), 2);
        assert_eq!(
            s.keyboard().rollover().as_slice(),
            &[pos(2, 2), pos(2, 1)]
        );
    }

    #[test]
    fn filtered_debounce_needs_repeated_scans() {
        let mut s = scheduler(Filtered::<3>::new());
        s.init();

        s.lines_mut().closed.push(pos(2, 1));
        assert_eq!(s.cycle(), 0);
        assert_eq!(s.cycle(), 0);
        assert_eq!(s.cycle(), 1);
        assert!(s.keyboard().is_pressed(pos(2, 1)));
    }
}
