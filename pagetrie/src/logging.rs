//! Unified logging support for pagetrie
//!
//! These macros forward to the `log` facade when the matching feature is
//! enabled, so call sites carry no `#[cfg]` attributes. With the feature off
//! the arguments are only type-checked. Use them in statement position only.

/// Per-level walk tracing, only with `debug_subsystems`
macro_rules! pt_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_subsystems")]
        log::trace!($($arg)*);
        #[cfg(not(feature = "debug_subsystems"))]
        let _ = format_args!($($arg)*);
    }
}

/// Unified debug-level logging
macro_rules! pt_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::debug!($($arg)*);
        #[cfg(not(feature = "log"))]
        let _ = format_args!($($arg)*);
    }
}

/// Unified warn-level logging
macro_rules! pt_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::warn!($($arg)*);
        #[cfg(not(feature = "log"))]
        let _ = format_args!($($arg)*);
    }
}
