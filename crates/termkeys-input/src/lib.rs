//! Terminal keyboard and mouse input decoding
//!
//! Turns the raw byte stream of a terminal into key identifiers and mouse
//! reports. Escape sequences are not self-delimiting, so the decoder buffers
//! bytes until a known sequence is complete or a key timeout proves that no
//! more bytes are coming.

pub mod arbiter;
pub mod buffer;
pub mod classify;
pub mod clock;
pub mod config;
pub mod correction;
pub mod dispatch;
pub mod keyboard;
pub mod queue;
pub mod reader;
pub mod source;

pub use arbiter::{StalePrefix, TimeoutArbiter};
pub use buffer::InputBuffer;
pub use classify::{Classification, MouseProtocol, SequenceClassifier};
pub use clock::{Clock, MonotonicClock};
pub use config::KeyboardConfig;
pub use correction::{ConsoleModifierCorrector, KeyCorrection, ModifierProbe};
pub use dispatch::{DispatchOutcome, Handlers, MouseReport};
pub use keyboard::Keyboard;
pub use queue::EventQueue;
pub use reader::NonBlockingReader;
pub use source::{InputSource, TtySource};

pub use termkeys_keymap::{Key, KeyEntry, KeyTable, Modifiers};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to query input status flags: {0}")]
    StatusFlags(nix::Error),

    #[error("Failed to switch non-blocking mode: {0}")]
    NonBlocking(nix::Error),

    #[error("Readiness poll failed: {0}")]
    Poll(nix::Error),

    #[error("Input closed")]
    Closed,

    #[error("Input I/O error: {0}")]
    Io(#[from] std::io::Error),
}
