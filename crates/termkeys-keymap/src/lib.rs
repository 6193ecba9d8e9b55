//! Key identifiers and escape-sequence tables for termkeys
//!
//! Provides the opaque key identifier space, the generic table of known
//! terminal escape sequences, key names, and the UTF-8 decoder used by the
//! input decoder.

pub mod capability;
pub mod key;
pub mod names;
pub mod table;
pub mod utf8;

pub use key::{Key, Modifiers};
pub use names::{key_from_name, key_name};
pub use table::{KeyEntry, KeyTable};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeymapError {
    #[error("Empty key sequence")]
    EmptySequence,

    #[error("Invalid escape in capability string at byte {0}")]
    InvalidEscape(usize),

    #[error("Unterminated escape in capability string")]
    UnterminatedEscape,
}
