//! HID keyboard report shape and the transport it is handed to.

use bitflags::bitflags;

use crate::ROLLOVER_SLOTS;

bitflags! {
    /// The modifier byte of a boot-protocol keyboard report.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const LEFT_CTRL = 0x01;
        const LEFT_SHIFT = 0x02;
        const LEFT_ALT = 0x04;
        const LEFT_GUI = 0x08;
        const RIGHT_CTRL = 0x10;
        const RIGHT_SHIFT = 0x20;
        const RIGHT_ALT = 0x40;
        const RIGHT_GUI = 0x80;
    }
}

/// Standard USB HID keyboard report (8 bytes).
/// Byte 0: modifier keys bitmask
/// Byte 1: reserved (0x00)
/// Bytes 2-7: up to 6 simultaneous keycodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; ROLLOVER_SLOTS],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; ROLLOVER_SLOTS],
        }
    }

    /// The report as it goes on the wire.
    pub fn as_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0] = self.modifiers;
        bytes[1] = self.reserved;
        bytes[2..].copy_from_slice(&self.keys);
        bytes
    }
}

impl Default for KeyboardReport {
    fn default() -> Self {
        Self::empty()
    }
}

/// The USB side of the keyboard, as seen from the scan loop.
///
/// Sending has no error channel: a transport that cannot deliver a report
/// drops it.
pub trait HidTransport {
    /// Service pending bus traffic (enumeration, class requests).
    fn poll(&mut self) {}

    /// Whether the host has selected a configuration.
    fn is_configured(&self) -> bool;

    /// Transmit a keyboard report.
    fn send_report(&mut self, report: &KeyboardReport);
}

impl<T: HidTransport + ?Sized> HidTransport for &mut T {
    fn poll(&mut self) {
        (**self).poll()
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }

    fn send_report(&mut self, report: &KeyboardReport) {
        (**self).send_report(report)
    }
}
