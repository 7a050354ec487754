//! Key matrix scanning.
//!
//! Columns are driven one at a time; after a short settle delay every row
//! line is sampled. Lines are active-low on the Phantom: a driven column is
//! pulled low, and a closed switch pulls its row low against the pull-up.
//! No debouncing happens here.

use core::convert::Infallible;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::layout::{Col, KeyPosition, Row};
use crate::{NCOL, NKEY, NROW};

/// Physical access to the row and column lines.
pub trait MatrixLines {
    /// Drive a column line active or back to its idle level.
    fn set_column(&mut self, col: Col, active: bool);

    /// Whether a row line currently reads as asserted.
    fn row_asserted(&mut self, row: Row) -> bool;

    /// Put every column back to idle.
    fn release_all(&mut self) {
        for col in Col::all() {
            self.set_column(col, false);
        }
    }
}

impl<L: MatrixLines + ?Sized> MatrixLines for &mut L {
    fn set_column(&mut self, col: Col, active: bool) {
        (**self).set_column(col, active)
    }

    fn row_asserted(&mut self, row: Row) -> bool {
        (**self).row_asserted(row)
    }
}

/// [`MatrixLines`] over `embedded-hal` pins whose operations cannot fail.
pub struct PinMatrix<R, C> {
    rows: [R; NROW],
    cols: [C; NCOL],
}

impl<R, C> PinMatrix<R, C>
where
    R: InputPin<Error = Infallible>,
    C: OutputPin<Error = Infallible>,
{
    pub fn new(rows: [R; NROW], cols: [C; NCOL]) -> Self {
        Self { rows, cols }
    }

    pub fn free(self) -> ([R; NROW], [C; NCOL]) {
        (self.rows, self.cols)
    }
}

impl<R, C> MatrixLines for PinMatrix<R, C>
where
    R: InputPin<Error = Infallible>,
    C: OutputPin<Error = Infallible>,
{
    fn set_column(&mut self, col: Col, active: bool) {
        let pin = &mut self.cols[col.index()];
        let result = if active { pin.set_low() } else { pin.set_high() };
        infallible(result)
    }

    fn row_asserted(&mut self, row: Row) -> bool {
        infallible(self.rows[row.index()].is_low())
    }
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Raw readings of one full scan, `true` = line asserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixState {
    asserted: [bool; NKEY],
}

impl MatrixState {
    /// A scan with nothing asserted.
    pub const fn new() -> Self {
        Self {
            asserted: [false; NKEY],
        }
    }

    pub fn is_asserted(&self, position: KeyPosition) -> bool {
        self.asserted[position.index()]
    }

    pub fn set(&mut self, position: KeyPosition, asserted: bool) {
        self.asserted[position.index()] = asserted;
    }

    /// Asserted positions in scan order.
    pub fn asserted(&self) -> impl Iterator<Item = KeyPosition> + '_ {
        KeyPosition::all().filter(move |p| self.is_asserted(*p))
    }
}

impl Default for MatrixState {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan the entire matrix once. Every column is back at idle on return.
pub fn scan<L, D>(lines: &mut L, delay: &mut D, settle_us: u16) -> MatrixState
where
    L: MatrixLines,
    D: DelayUs<u16>,
{
    let mut state = MatrixState::new();

    for col in Col::all() {
        lines.set_column(col, true);
        delay.delay_us(settle_us);

        for row in Row::all() {
            state.set(KeyPosition::new(row, col), lines.row_asserted(row));
        }

        lines.set_column(col, false);
    }

    state
}
