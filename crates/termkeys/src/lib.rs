//! Terminal input monitor
//!
//! Puts the terminal into raw mode, runs the termkeys decoder on standard
//! input and prints every decoded key and mouse report.

pub mod keymap_file;
pub mod monitor;
pub mod terminal_guard;

pub use monitor::{forwarding_handlers, run_decoder, Args, LogLevel, MonitorEvent};
pub use terminal_guard::TerminalGuard;
