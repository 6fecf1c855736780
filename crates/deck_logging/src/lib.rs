#![deny(missing_docs)]
//! Shared logging utilities for the deck workspace.
//!
//! This crate provides the `deck_*` logging macros used across the codebase,
//! a per-thread animation-frame counter that the macros stamp onto every
//! record, and a minimal test initializer for the global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Thread-local storage for the current animation frame number.
    static FRAME: Cell<u64> = const { Cell::new(0) };
}

/// Sets the animation frame number for the current thread.
/// Called by the editor each time it services a pending frame.
pub fn set_frame(frame: u64) {
    FRAME.with(|v| v.set(frame));
}

/// Advances the animation frame number for the current thread and returns it.
pub fn next_frame() -> u64 {
    FRAME.with(|v| {
        let next = v.get().wrapping_add(1);
        v.set(next);
        next
    })
}

/// Retrieves the animation frame number for the current thread.
/// Returns 0 if no frame has been serviced yet.
pub fn current_frame() -> u64 {
    FRAME.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current frame.
#[macro_export]
macro_rules! deck_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current frame.
#[macro_export]
macro_rules! deck_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current frame.
#[macro_export]
macro_rules! deck_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current frame.
#[macro_export]
macro_rules! deck_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current frame.
#[macro_export]
macro_rules! deck_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use trace level in debug builds so controller frames show up, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::{current_frame, next_frame, set_frame};

    #[test]
    fn frame_counter_is_per_thread() {
        set_frame(41);
        assert_eq!(next_frame(), 42);
        assert_eq!(current_frame(), 42);

        let other = std::thread::spawn(current_frame).join().unwrap();
        assert_eq!(other, 0);
    }
}
