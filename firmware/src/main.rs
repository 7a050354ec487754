//! Phantom keyboard firmware for ATmega32U4 (Teensy 2.0).
//!
//! Wires the board-specific pieces into the scan loop from `phantom-core`:
//! - Matrix lines on ports B-F (6 rows, 17 columns)
//! - USB HID keyboard reports (6KRO) straight from the USB controller
//! - Busy-wait delays for scan cadence and pin settling

#![no_std]
#![no_main]

mod delay;
mod descriptors;
mod hid;
mod matrix;

use avr_device::atmega32u4::Peripherals;
use phantom_core::{ScanConfig, Scheduler};

use delay::BusyDelay;
use hid::UsbKeyboard;

#[cfg(not(feature = "debounce-filter"))]
type Debouncer = phantom_core::Immediate;
#[cfg(feature = "debounce-filter")]
type Debouncer = phantom_core::Filtered<5>;

/// Nothing to report a panic to; park the CPU.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Disable clock prescaler (CLKPR): run at the full 16MHz
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    let mut usb = UsbKeyboard::new(&dp);
    usb.init();

    let lines = matrix::init_gpio(&dp);

    Scheduler::new(lines, usb, BusyDelay, Debouncer::default(), ScanConfig::DEFAULT).run()
}
