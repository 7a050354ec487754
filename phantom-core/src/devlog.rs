//! Logging macros that vanish entirely when the `log` feature is off.
//!
//! The AVR build disables the feature so no format strings end up in flash.

#[cfg(feature = "log")]
macro_rules! kb_trace {
    ($($arg:tt)*) => { ::log::trace!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! kb_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! kb_debug {
    ($($arg:tt)*) => { ::log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! kb_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! kb_info {
    ($($arg:tt)*) => { ::log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! kb_info {
    ($($arg:tt)*) => {};
}
