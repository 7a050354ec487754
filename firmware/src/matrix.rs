//! Phantom matrix wiring on the Teensy 2.0 (ATmega32U4).
//!
//! Rows are inputs with pull-ups on PB0-PB5. Columns are outputs that idle
//! high and are pulled low one at a time while scanning. The tables below
//! follow the board wiring column for column; columns 7/9 (PF1) and 0/14
//! (PD1) share a pin.

use core::convert::Infallible;

use avr_device::atmega32u4::Peripherals;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use phantom_core::{PinMatrix, NCOL, NROW};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Port {
    B,
    C,
    D,
    E,
    F,
}

/// Row pins (read, active low).
const ROW_PINS: [(Port, u8); NROW] = [
    (Port::B, 0),
    (Port::B, 1),
    (Port::B, 2),
    (Port::B, 3),
    (Port::B, 4),
    (Port::B, 5),
];

/// Column pins (driven, active low).
const COL_PINS: [(Port, u8); NCOL] = [
    (Port::D, 1),
    (Port::C, 7),
    (Port::C, 6),
    (Port::D, 4),
    (Port::D, 0),
    (Port::E, 6),
    (Port::F, 0),
    (Port::F, 1),
    (Port::F, 4),
    (Port::F, 1),
    (Port::F, 6),
    (Port::F, 7),
    (Port::D, 7),
    (Port::D, 6),
    (Port::D, 1),
    (Port::D, 2),
    (Port::D, 3),
];

/// Run `$body` with `$pin`, `$ddr` and `$out` bound to the PINx, DDRx and
/// PORTx registers of `$port`.
macro_rules! with_port {
    ($dp:expr, $port:expr, |$pin:ident, $ddr:ident, $out:ident| $body:expr) => {
        match $port {
            Port::B => {
                let ($pin, $ddr, $out) = (&$dp.PORTB.pinb, &$dp.PORTB.ddrb, &$dp.PORTB.portb);
                $body
            }
            Port::C => {
                let ($pin, $ddr, $out) = (&$dp.PORTC.pinc, &$dp.PORTC.ddrc, &$dp.PORTC.portc);
                $body
            }
            Port::D => {
                let ($pin, $ddr, $out) = (&$dp.PORTD.pind, &$dp.PORTD.ddrd, &$dp.PORTD.portd);
                $body
            }
            Port::E => {
                let ($pin, $ddr, $out) = (&$dp.PORTE.pine, &$dp.PORTE.ddre, &$dp.PORTE.porte);
                $body
            }
            Port::F => {
                let ($pin, $ddr, $out) = (&$dp.PORTF.pinf, &$dp.PORTF.ddrf, &$dp.PORTF.portf);
                $body
            }
        }
    };
}

/// One GPIO line, addressed by port and bit.
pub struct PortPin<'a> {
    dp: &'a Peripherals,
    port: Port,
    mask: u8,
}

impl<'a> PortPin<'a> {
    fn new(dp: &'a Peripherals, (port, bit): (Port, u8)) -> Self {
        Self {
            dp,
            port,
            mask: 1 << bit,
        }
    }

    /// Input with the internal pull-up enabled.
    fn into_pull_up_input(self) -> Self {
        let mask = self.mask;
        with_port!(self.dp, self.port, |_pin, ddr, out| {
            ddr.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
            out.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
        });
        self
    }

    /// Output, initially driven high (inactive).
    fn into_output_high(self) -> Self {
        let mask = self.mask;
        with_port!(self.dp, self.port, |_pin, ddr, out| {
            out.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
            ddr.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
        });
        self
    }
}

impl OutputPin for PortPin<'_> {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        let mask = self.mask;
        with_port!(self.dp, self.port, |_pin, _ddr, out| {
            out.modify(|r, w| unsafe { w.bits(r.bits() & !mask) })
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mask = self.mask;
        with_port!(self.dp, self.port, |_pin, _ddr, out| {
            out.modify(|r, w| unsafe { w.bits(r.bits() | mask) })
        });
        Ok(())
    }
}

impl InputPin for PortPin<'_> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        let bits = with_port!(self.dp, self.port, |pin, _ddr, _out| pin.read().bits());
        Ok(bits & self.mask != 0)
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

pub type PhantomMatrix<'a> = PinMatrix<PortPin<'a>, PortPin<'a>>;

/// Configure every row and column line and hand them over as a matrix.
pub fn init_gpio(dp: &Peripherals) -> PhantomMatrix<'_> {
    let rows = ROW_PINS.map(|pin| PortPin::new(dp, pin).into_pull_up_input());
    let cols = COL_PINS.map(|pin| PortPin::new(dp, pin).into_output_high());
    PinMatrix::new(rows, cols)
}
