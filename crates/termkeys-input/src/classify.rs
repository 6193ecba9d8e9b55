//! Classification of the buffered bytes into keys
//!
//! Each call looks at the front of the input buffer and either resolves one
//! token (consuming its bytes), recognises a mouse report, or reports that
//! more bytes are needed. Checks run in a fixed order: mouse reports, the
//! platform table, the generic table, then single characters.

use crate::buffer::InputBuffer;
use termkeys_keymap::{utf8, Key, KeyTable};

const ESC: u8 = 0x1b;

/// Mouse report encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseProtocol {
    /// `ESC [ M` followed by three raw bytes
    X11,
    /// `ESC [ <` ... terminated by `M` (press) or `m` (release)
    Sgr,
    /// `ESC [` decimal parameters terminated by `M`
    Urxvt,
}

impl MouseProtocol {
    /// Recognise a complete mouse report at the start of `bytes`
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        let last = *bytes.last()?;
        match bytes {
            [ESC, b'[', b'M', ..] if bytes.len() >= 6 => Some(MouseProtocol::X11),
            [ESC, b'[', b'<', ..] if bytes.len() >= 9 && matches!(last, b'M' | b'm') => {
                Some(MouseProtocol::Sgr)
            }
            [ESC, b'[', b'1'..=b'9', b'0'..=b'9', ..] if bytes.len() >= 9 && last == b'M' => {
                Some(MouseProtocol::Urxvt)
            }
            _ => None,
        }
    }

    pub fn key(self) -> Key {
        match self {
            MouseProtocol::X11 => Key::X11_MOUSE,
            MouseProtocol::Sgr => Key::SGR_MOUSE,
            MouseProtocol::Urxvt => Key::URXVT_MOUSE,
        }
    }

    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::X11_MOUSE => Some(MouseProtocol::X11),
            Key::SGR_MOUSE => Some(MouseProtocol::Sgr),
            Key::URXVT_MOUSE => Some(MouseProtocol::Urxvt),
            _ => None,
        }
    }

    /// Number of bytes the report at the start of `bytes` occupies
    pub fn report_len(self, bytes: &[u8]) -> usize {
        let terminated = |b: &u8| match self {
            MouseProtocol::X11 => false,
            MouseProtocol::Sgr => matches!(b, b'M' | b'm'),
            MouseProtocol::Urxvt => *b == b'M',
        };

        let len = match self {
            MouseProtocol::X11 => 6,
            _ => bytes
                .iter()
                .skip(3)
                .position(terminated)
                .map_or(bytes.len(), |pos| pos + 4),
        };
        len.min(bytes.len())
    }
}

/// Result of classifying the front of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A complete token was consumed from the buffer
    Resolved(Key),
    /// A complete mouse report sits at the front of the buffer. It is left
    /// in place for the caller to hand out.
    Mouse(MouseProtocol),
    /// The buffered bytes may be the start of a longer sequence
    Incomplete,
    /// Nothing matched at this step
    NoMatch,
}

/// Matches buffered bytes against the key tables
#[derive(Debug, Clone, Copy)]
pub struct SequenceClassifier<'a> {
    generic: &'a KeyTable,
    platform: Option<&'a KeyTable>,
    utf8_input: bool,
    mouse_support: bool,
}

impl<'a> SequenceClassifier<'a> {
    pub fn new(generic: &'a KeyTable) -> Self {
        Self {
            generic,
            platform: None,
            utf8_input: true,
            mouse_support: false,
        }
    }

    pub fn platform_table(mut self, platform: Option<&'a KeyTable>) -> Self {
        self.platform = platform;
        self
    }

    pub fn utf8_input(mut self, enabled: bool) -> Self {
        self.utf8_input = enabled;
        self
    }

    pub fn mouse_support(mut self, enabled: bool) -> Self {
        self.mouse_support = enabled;
        self
    }

    /// Classify the front of `buffer`
    ///
    /// `timed_out` is true once the key timeout has passed, which turns
    /// ambiguous prefixes and truncated characters into keys. Only
    /// [`Classification::Resolved`] consumes bytes. An empty buffer gives
    /// [`Classification::NoMatch`].
    pub fn classify(&self, buffer: &mut InputBuffer, timed_out: bool) -> Classification {
        let Some(first) = buffer.first() else {
            return Classification::NoMatch;
        };

        if first == ESC {
            if let Some(protocol) = self.mouse_report(buffer.as_slice()) {
                return Classification::Mouse(protocol);
            }

            if let Some(platform) = self.platform {
                let result = table_key(platform, buffer);
                if result != Classification::NoMatch {
                    return result;
                }
            }

            let result = self.known_key(buffer, timed_out);
            if result != Classification::NoMatch {
                return result;
            }

            if !timed_out {
                return Classification::Incomplete;
            }
        }

        self.single_key(buffer, timed_out)
    }

    fn mouse_report(&self, bytes: &[u8]) -> Option<MouseProtocol> {
        if !self.mouse_support {
            return None;
        }
        MouseProtocol::detect(bytes)
    }

    fn known_key(&self, buffer: &mut InputBuffer, timed_out: bool) -> Classification {
        let bytes = buffer.as_slice();
        let ambiguous = matches!(bytes, [ESC, b'O' | b'[' | b']']);
        if ambiguous && !timed_out && self.generic.lookup(bytes).is_some() {
            return Classification::Incomplete;
        }
        table_key(self.generic, buffer)
    }

    fn single_key(&self, buffer: &mut InputBuffer, timed_out: bool) -> Classification {
        let bytes = buffer.as_slice();
        let Some(&first) = bytes.first() else {
            return Classification::NoMatch;
        };

        let expected = utf8::sequence_len(first).filter(|_| self.utf8_input);
        let (len, code) = match expected {
            Some(len) if bytes.len() < len && !timed_out => return Classification::Incomplete,
            Some(len) => {
                let available = len.min(bytes.len());
                match utf8::decode(&bytes[..available]) {
                    Some(code) => (available, code),
                    None => (1, u32::from(first)),
                }
            }
            None => (1, u32::from(first)),
        };

        buffer.consume_front(len);
        Classification::Resolved(Key::from_code(code).normalize())
    }
}

fn table_key(table: &KeyTable, buffer: &mut InputBuffer) -> Classification {
    let Some(entry) = table.lookup(buffer.as_slice()) else {
        return Classification::NoMatch;
    };

    let (len, key) = (entry.len(), entry.key());
    buffer.consume_front(len);
    Classification::Resolved(key.normalize())
}
