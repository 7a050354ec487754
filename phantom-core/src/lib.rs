//! Input-processing core for the Phantom tenkeyless keyboard.
//!
//! This crate is `no_std` so the AVR firmware and the native CLI share the
//! same layout table and key state machine:
//! - Matrix scanning over an abstract line interface
//! - Edge detection with pluggable debouncing
//! - 6-key rollover queue plus the modifier byte
//! - Boot-protocol USB HID report assembly

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod devlog;

pub mod debounce;
pub mod keyboard;
pub mod keycode;
pub mod layout;
pub mod matrix;
pub mod report;
pub mod rollover;
pub mod scheduler;
pub mod tracker;

pub use debounce::{Debounce, Filtered, Immediate};
pub use keyboard::Keyboard;
pub use keycode::Keycode;
pub use layout::{Col, KeyPosition, LayoutEntry, Row, LAYOUT};
pub use matrix::{MatrixLines, MatrixState, PinMatrix};
pub use report::{HidTransport, KeyboardReport, Modifiers};
pub use rollover::RolloverQueue;
pub use scheduler::{ScanConfig, Scheduler};
pub use tracker::{KeyEvent, KeyEventKind, Tracker};

/// Number of rows in the matrix.
pub const NROW: usize = 6;
/// Number of columns in the matrix.
pub const NCOL: usize = 17;
/// Total number of matrix positions, including unpopulated ones.
pub const NKEY: usize = NROW * NCOL;
/// Non-modifier keys a single report can carry.
pub const ROLLOVER_SLOTS: usize = 6;
