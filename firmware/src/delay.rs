//! Busy-wait delays for a 16MHz ATmega32U4.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

/// Calibrated by instruction count, not a timer. Close enough for scan
/// cadence and pin settling.
pub struct BusyDelay;

impl DelayUs<u16> for BusyDelay {
    fn delay_us(&mut self, us: u16) {
        // ~16 cycles per microsecond: 4 iterations of nop + loop overhead
        for _ in 0..us {
            for _ in 0..4u8 {
                avr_device::asm::nop();
            }
        }
    }
}

impl DelayMs<u16> for BusyDelay {
    fn delay_ms(&mut self, ms: u16) {
        for _ in 0..ms {
            // ~1ms at 16MHz: 16000 cycles / 4 cycles per loop iteration
            for _ in 0..4000u16 {
                avr_device::asm::nop();
            }
        }
    }
}
