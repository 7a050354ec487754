//! Matrix coordinates and the static Phantom layout table.
//!
//! The Phantom has a 6×17 matrix. Columns are driven, rows are read, and a
//! key's identity is `col * NROW + row`, so positions are numbered
//! column-major. Thirteen of the 102 intersections are unpopulated.

use core::fmt;

use crate::keycode::Keycode;
use crate::report::Modifiers;
use crate::{NCOL, NKEY, NROW};

/// A row line index, always below [`NROW`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row(u8);

/// A column line index, always below [`NCOL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Col(u8);

impl Row {
    pub const fn new(row: u8) -> Option<Self> {
        if (row as usize) < NROW {
            Some(Self(row))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All rows, top index last.
    pub fn all() -> impl Iterator<Item = Row> {
        (0..NROW as u8).map(Row)
    }
}

impl Col {
    pub const fn new(col: u8) -> Option<Self> {
        if (col as usize) < NCOL {
            Some(Self(col))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All columns in scan order.
    pub fn all() -> impl Iterator<Item = Col> {
        (0..NCOL as u8).map(Col)
    }
}

/// Identity of one matrix intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPosition(u8);

impl KeyPosition {
    pub const fn new(row: Row, col: Col) -> Self {
        Self(col.0 * NROW as u8 + row.0)
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < NKEY {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn row(self) -> Row {
        Row(self.0 % NROW as u8)
    }

    pub const fn col(self) -> Col {
        Col(self.0 / NROW as u8)
    }

    /// Every position in scan order: column-major, then row-minor.
    pub fn all() -> impl Iterator<Item = KeyPosition> {
        (0..NKEY as u8).map(KeyPosition)
    }

    /// What the layout table says about this position.
    pub fn entry(self) -> LayoutEntry {
        LAYOUT[self.index()]
    }
}

impl fmt::Display for KeyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}c{}", self.row().0, self.col().0)
    }
}

/// What a matrix position produces when pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutEntry {
    /// No switch is wired here; readings are tracked but have no effect.
    Absent,
    /// An ordinary key that occupies a rollover slot.
    Key(Keycode),
    /// A modifier, reported through its bit in the modifier byte.
    Modifier(Modifiers),
}

impl LayoutEntry {
    pub const fn from_keycode(kc: Keycode) -> Self {
        if kc.is_modifier() {
            LayoutEntry::Modifier(Modifiers::from_bits_retain(kc.modifier_bit()))
        } else {
            LayoutEntry::Key(kc)
        }
    }

    /// The byte this entry contributes to a report: a usage ID for keys, the
    /// bit flag for modifiers, 0 for absent positions.
    pub const fn output_code(self) -> u8 {
        match self {
            LayoutEntry::Absent => 0,
            LayoutEntry::Key(kc) => kc as u8,
            LayoutEntry::Modifier(bit) => bit.bits(),
        }
    }

    pub const fn is_modifier(self) -> bool {
        matches!(self, LayoutEntry::Modifier(_))
    }

    pub const fn is_absent(self) -> bool {
        matches!(self, LayoutEntry::Absent)
    }

    /// The HID usage this entry stands for, if any.
    pub fn keycode(self) -> Option<Keycode> {
        match self {
            LayoutEntry::Absent => None,
            LayoutEntry::Key(kc) => Some(kc),
            LayoutEntry::Modifier(bit) => MODIFIER_KEYCODES
                .iter()
                .copied()
                .find(|kc| kc.modifier_bit() == bit.bits()),
        }
    }
}

const MODIFIER_KEYCODES: [Keycode; 8] = [
    Keycode::LCtrl,
    Keycode::LShift,
    Keycode::LAlt,
    Keycode::LGui,
    Keycode::RCtrl,
    Keycode::RShift,
    Keycode::RAlt,
    Keycode::RGui,
];

/// Unpopulated intersection.
const ___: LayoutEntry = LayoutEntry::Absent;

const fn k(kc: Keycode) -> LayoutEntry {
    LayoutEntry::from_keycode(kc)
}

/// The layout, one line per column. Within a line the entries are rows 0..5,
/// bottom row (Ctrl/Space) first and function row last.
#[rustfmt::skip]
pub static LAYOUT: [LayoutEntry; NKEY] = {
    use Keycode::*;
    [
//  ROW 0             ROW 1                ROW 2           ROW 3            ROW 4         ROW 5
    k(LCtrl),         k(LShift),           k(CapsLock),    k(Tab),          k(N1),        k(Escape),      // COL  0
    k(LGui),          k(NonUsBackslash),   k(A),           k(Q),            k(N2),        k(Grave),       // COL  1
    k(LAlt),          k(Z),                k(S),           k(W),            k(N3),        k(F1),          // COL  2
    ___,              k(X),                k(D),           k(E),            k(N4),        k(F2),          // COL  3
    ___,              k(C),                k(F),           k(R),            k(N5),        k(F3),          // COL  4
    ___,              k(V),                k(G),           k(T),            k(N6),        k(F4),          // COL  5
    ___,              k(B),                k(H),           k(Y),            k(N7),        k(F5),          // COL  6
    k(Space),         k(N),                k(J),           k(U),            k(N8),        k(F6),          // COL  7
    ___,              k(M),                k(K),           k(I),            k(N9),        k(F7),          // COL  8
    ___,              k(Comma),            k(L),           k(O),            k(N0),        k(F8),          // COL  9
    k(RAlt),          k(Dot),              k(Semicolon),   k(P),            k(Minus),     k(F9),          // COL 10
    k(RGui),          k(Slash),            k(Quote),       k(LBracket),     k(Equal),     k(F10),         // COL 11
    k(Application),   ___,                 k(Backslash),   k(RBracket),     ___,          k(F11),         // COL 12
    k(RCtrl),         k(RShift),           k(Enter),       k(Backslash),    k(Backspace), k(F12),         // COL 13

    k(Left),          ___,                 ___,            k(Delete),       k(Insert),    k(PrintScreen), // COL 14
    k(Down),          k(Up),               ___,            k(End),          k(Home),      k(ScrollLock),  // COL 15
    k(Right),         ___,                 ___,            k(PageDown),     k(PageUp),    k(Pause),       // COL 16
    ]
};

/// Look up a position in [`LAYOUT`].
pub fn lookup(position: KeyPosition) -> LayoutEntry {
    position.entry()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> KeyPosition {
        KeyPosition::new(Row::new(row).unwrap(), Col::new(col).unwrap())
    }

    #[test]
    fn position_is_column_major() {
        assert_eq!(pos(0, 0).index(), 0);
        assert_eq!(pos(5, 0).index(), 5);
        assert_eq!(pos(0, 1).index(), 6);
        assert_eq!(pos(3, 16).index(), 16 * 6 + 3);

        let p = pos(4, 13);
        assert_eq!(p.row().index(), 4);
        assert_eq!(p.col().index(), 13);
        assert_eq!(KeyPosition::from_index(p.index()), Some(p));
    }

    #[test]
    fn coordinates_are_bounds_checked() {
        assert!(Row::new(6).is_none());
        assert!(Col::new(17).is_none());
        assert!(KeyPosition::from_index(NKEY).is_none());
    }

    #[test]
    fn all_positions_follow_scan_order() {
        let positions: Vec<KeyPosition> = KeyPosition::all().collect();
        assert_eq!(positions.len(), NKEY);
        assert!(positions.windows(2).all(|w| w[0].index() + 1 == w[1].index()));
        assert_eq!(positions[7], pos(1, 1));
    }

    #[test]
    fn table_has_thirteen_holes() {
        let absent = LAYOUT.iter().filter(|e| e.is_absent()).count();
        assert_eq!(absent, 13);
        assert!(lookup(pos(0, 3)).is_absent());
        assert!(lookup(pos(1, 12)).is_absent());
        assert_eq!(lookup(pos(0, 3)).output_code(), 0);
    }

    #[test]
    fn every_modifier_bit_appears_once() {
        let mut seen = 0u8;
        for entry in LAYOUT.iter().filter(|e| e.is_modifier()) {
            let bit = entry.output_code();
            assert_eq!(bit.count_ones(), 1);
            assert_eq!(seen & bit, 0, "modifier bit {bit:#04x} mapped twice");
            seen |= bit;
        }
        assert_eq!(seen, 0xFF);
    }

    #[test]
    fn known_positions() {
        assert_eq!(lookup(pos(0, 0)).output_code(), 0x01); // LCtrl
        assert_eq!(lookup(pos(1, 0)).output_code(), 0x02); // LShift
        assert_eq!(lookup(pos(0, 7)), LayoutEntry::Key(Keycode::Space));
        assert_eq!(lookup(pos(2, 13)), LayoutEntry::Key(Keycode::Enter));
        assert_eq!(lookup(pos(5, 16)), LayoutEntry::Key(Keycode::Pause));
        assert_eq!(lookup(pos(0, 12)).output_code(), Keycode::Application as u8);
    }

    #[test]
    fn modifier_entries_map_back_to_keycodes() {
        assert_eq!(lookup(pos(0, 11)).keycode(), Some(Keycode::RGui));
        assert_eq!(lookup(pos(1, 13)).keycode(), Some(Keycode::RShift));
        assert_eq!(lookup(pos(0, 4)).keycode(), None);
    }
}
