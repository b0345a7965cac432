#![deny(missing_docs)]
//! Shared logging utilities for the agent client workspace.
//!
//! This crate provides the `agent_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the conversation turn it belongs to, so interleaved snapshot
//! and timer traffic from consecutive turns can be told apart in the log.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

thread_local! {
    /// Thread-local storage for the current conversation turn.
    static TURN: Cell<u64> = const { Cell::new(0) };
}

/// Sets the conversation turn for the current thread.
/// The client loop calls this whenever the user starts a new turn.
pub fn set_turn(turn: u64) {
    TURN.with(|v| v.set(turn));
}

/// Retrieves the conversation turn for the current thread.
/// Returns 0 before the first turn has started.
pub fn current_turn() -> u64 {
    TURN.with(|v| v.get())
}

/// Future returned by [`with_turn`].
pub struct TurnScoped<F> {
    turn: u64,
    inner: Pin<Box<F>>,
}

/// Runs `future` under `turn` on whichever thread polls it, so async work
/// handed to a runtime logs under the turn that started it. The polling
/// thread's own turn is restored after every poll.
pub fn with_turn<F: Future>(turn: u64, future: F) -> TurnScoped<F> {
    TurnScoped {
        turn,
        inner: Box::pin(future),
    }
}

impl<F: Future> Future for TurnScoped<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let previous = current_turn();
        set_turn(self.turn);
        let result = self.inner.as_mut().poll(cx);
        set_turn(previous);
        result
    }
}

/// Logs a trace-level message tagged with the current turn.
#[macro_export]
macro_rules! agent_trace {
    ($($arg:tt)*) => {{
        log::trace!("[turn {}] {}", $crate::current_turn(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current turn.
#[macro_export]
macro_rules! agent_debug {
    ($($arg:tt)*) => {{
        log::debug!("[turn {}] {}", $crate::current_turn(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current turn.
#[macro_export]
macro_rules! agent_info {
    ($($arg:tt)*) => {{
        log::info!("[turn {}] {}", $crate::current_turn(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current turn.
#[macro_export]
macro_rules! agent_warn {
    ($($arg:tt)*) => {{
        log::warn!("[turn {}] {}", $crate::current_turn(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current turn.
#[macro_export]
macro_rules! agent_error {
    ($($arg:tt)*) => {{
        log::error!("[turn {}] {}", $crate::current_turn(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
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
