//! Tables of known escape sequences
//!
//! A [`KeyTable`] maps byte strings to key identifiers. Entries are kept
//! sorted by ascending pattern length so a lookup for a buffer of length `n`
//! only has to scan the run of entries that are exactly `n` bytes long.
//!
//! [`KeyTable::generic`] is the compiled-in table every decoder uses. A
//! platform table built from a terminal capability database can be supplied
//! on top of it.

use crate::capability;
use crate::key::{Key, Modifiers};
use crate::KeymapError;
use std::sync::OnceLock;

const SHIFT: Modifiers = Modifiers::SHIFT;
const CTRL: Modifiers = Modifiers::CTRL;
const META: Modifiers = Modifiers::META;

/// A known key sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pattern: Box<[u8]>,
    key: Key,
}

impl KeyEntry {
    pub fn new(pattern: impl Into<Box<[u8]>>, key: Key) -> Self {
        Self {
            pattern: pattern.into(),
            key,
        }
    }

    /// Create an entry, rejecting an empty pattern
    pub fn try_new(pattern: impl Into<Box<[u8]>>, key: Key) -> Result<Self, KeymapError> {
        let entry = Self::new(pattern, key);
        if entry.is_empty() {
            return Err(KeymapError::EmptySequence);
        }
        Ok(entry)
    }

    /// Create an entry from a terminfo/termcap style capability string
    pub fn from_capability(capability: &str, key: Key) -> Result<Self, KeymapError> {
        Self::try_new(capability::unescape(capability)?, key)
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

/// Read-only table of key sequences sorted by length
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    entries: Vec<KeyEntry>,
}

impl KeyTable {
    /// Build a table. Entries of equal length keep their relative order, so
    /// the first of two identical patterns wins.
    pub fn new(entries: impl IntoIterator<Item = KeyEntry>) -> Self {
        let mut entries: Vec<KeyEntry> = entries.into_iter().collect();
        entries.sort_by_key(KeyEntry::len);
        Self { entries }
    }

    /// The compiled-in table of generic terminal key sequences
    pub fn generic() -> &'static KeyTable {
        static GENERIC: OnceLock<KeyTable> = OnceLock::new();
        GENERIC.get_or_init(|| {
            let table = KeyTable::new(generic_entries());
            tracing::debug!("Built generic key table with {} entries", table.len());
            table
        })
    }

    /// Find the entry whose pattern is exactly `bytes`
    pub fn lookup(&self, bytes: &[u8]) -> Option<&KeyEntry> {
        if bytes.is_empty() {
            return None;
        }

        let start = self.entries.partition_point(|entry| entry.len() < bytes.len());
        self.entries[start..]
            .iter()
            .take_while(|entry| entry.len() == bytes.len())
            .find(|entry| entry.pattern() == bytes)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyEntry> {
        self.entries.iter()
    }
}

impl FromIterator<KeyEntry> for KeyTable {
    fn from_iter<I: IntoIterator<Item = KeyEntry>>(iter: I) -> Self {
        KeyTable::new(iter)
    }
}

/// Sequences that are listed literally
static FIXED_KEYS: &[(&[u8], Key)] = &[
    // Cursor keys, normal and application mode
    (b"\x1b[A", Key::UP),
    (b"\x1b[B", Key::DOWN),
    (b"\x1b[C", Key::RIGHT),
    (b"\x1b[D", Key::LEFT),
    (b"\x1bOA", Key::UP),
    (b"\x1bOB", Key::DOWN),
    (b"\x1bOC", Key::RIGHT),
    (b"\x1bOD", Key::LEFT),
    (b"\x1b[H", Key::HOME),
    (b"\x1b[F", Key::END),
    (b"\x1bOH", Key::HOME),
    (b"\x1bOF", Key::END),
    (b"\x1b[E", Key::CENTER),
    (b"\x1bOE", Key::CENTER),
    (b"\x1b[G", Key::CENTER),
    (b"\x1b[Z", Key::BACK_TAB),
    // SS3 function keys
    (b"\x1bOP", Key::F1),
    (b"\x1bOQ", Key::F2),
    (b"\x1bOR", Key::F3),
    (b"\x1bOS", Key::F4),
    // Linux console function keys
    (b"\x1b[[A", Key::F1),
    (b"\x1b[[B", Key::F2),
    (b"\x1b[[C", Key::F3),
    (b"\x1b[[D", Key::F4),
    (b"\x1b[[E", Key::F5),
    // VT220 editing keys
    (b"\x1b[1~", Key::HOME),
    (b"\x1b[2~", Key::INSERT),
    (b"\x1b[3~", Key::DELETE),
    (b"\x1b[4~", Key::END),
    (b"\x1b[5~", Key::PAGE_UP),
    (b"\x1b[6~", Key::PAGE_DOWN),
    (b"\x1b[7~", Key::HOME),
    (b"\x1b[8~", Key::END),
    // VT220 function keys
    (b"\x1b[11~", Key::F1),
    (b"\x1b[12~", Key::F2),
    (b"\x1b[13~", Key::F3),
    (b"\x1b[14~", Key::F4),
    (b"\x1b[15~", Key::F5),
    (b"\x1b[17~", Key::F6),
    (b"\x1b[18~", Key::F7),
    (b"\x1b[19~", Key::F8),
    (b"\x1b[20~", Key::F9),
    (b"\x1b[21~", Key::F10),
    (b"\x1b[23~", Key::F11),
    (b"\x1b[24~", Key::F12),
    // rxvt shifted and ctrl cursor keys
    (b"\x1b[a", Key::UP.with_modifiers(SHIFT)),
    (b"\x1b[b", Key::DOWN.with_modifiers(SHIFT)),
    (b"\x1b[c", Key::RIGHT.with_modifiers(SHIFT)),
    (b"\x1b[d", Key::LEFT.with_modifiers(SHIFT)),
    (b"\x1bOa", Key::UP.with_modifiers(CTRL)),
    (b"\x1bOb", Key::DOWN.with_modifiers(CTRL)),
    (b"\x1bOc", Key::RIGHT.with_modifiers(CTRL)),
    (b"\x1bOd", Key::LEFT.with_modifiers(CTRL)),
    // rxvt shifted and ctrl editing keys
    (b"\x1b[2$", Key::INSERT.with_modifiers(SHIFT)),
    (b"\x1b[3$", Key::DELETE.with_modifiers(SHIFT)),
    (b"\x1b[5$", Key::PAGE_UP.with_modifiers(SHIFT)),
    (b"\x1b[6$", Key::PAGE_DOWN.with_modifiers(SHIFT)),
    (b"\x1b[7$", Key::HOME.with_modifiers(SHIFT)),
    (b"\x1b[8$", Key::END.with_modifiers(SHIFT)),
    (b"\x1b[2^", Key::INSERT.with_modifiers(CTRL)),
    (b"\x1b[3^", Key::DELETE.with_modifiers(CTRL)),
    (b"\x1b[5^", Key::PAGE_UP.with_modifiers(CTRL)),
    (b"\x1b[6^", Key::PAGE_DOWN.with_modifiers(CTRL)),
    (b"\x1b[7^", Key::HOME.with_modifiers(CTRL)),
    (b"\x1b[8^", Key::END.with_modifiers(CTRL)),
    // Keypad in application mode
    (b"\x1bOM", Key::ENTER),
    (b"\x1bOj", Key::from_char('*')),
    (b"\x1bOk", Key::from_char('+')),
    (b"\x1bOl", Key::from_char(',')),
    (b"\x1bOm", Key::from_char('-')),
    (b"\x1bOn", Key::from_char('.')),
    (b"\x1bOo", Key::from_char('/')),
    (b"\x1bOp", Key::from_char('0')),
    (b"\x1bOq", Key::from_char('1')),
    (b"\x1bOr", Key::from_char('2')),
    (b"\x1bOs", Key::from_char('3')),
    (b"\x1bOt", Key::from_char('4')),
    (b"\x1bOu", Key::from_char('5')),
    (b"\x1bOv", Key::from_char('6')),
    (b"\x1bOw", Key::from_char('7')),
    (b"\x1bOx", Key::from_char('8')),
    (b"\x1bOy", Key::from_char('9')),
    // Escape-prefixed cursor keys
    (b"\x1b\x1b[A", Key::UP.with_modifiers(META)),
    (b"\x1b\x1b[B", Key::DOWN.with_modifiers(META)),
    (b"\x1b\x1b[C", Key::RIGHT.with_modifiers(META)),
    (b"\x1b\x1b[D", Key::LEFT.with_modifiers(META)),
    (b"\x1b\x1bOA", Key::UP.with_modifiers(META)),
    (b"\x1b\x1bOB", Key::DOWN.with_modifiers(META)),
    (b"\x1b\x1bOC", Key::RIGHT.with_modifiers(META)),
    (b"\x1b\x1bOD", Key::LEFT.with_modifiers(META)),
    // Meta with keys that are not printable
    (b"\x1b\x7f", Key::BACKSPACE.with_modifiers(META)),
    (b"\x1b\r", Key::ENTER.with_modifiers(META)),
];

/// Final bytes of `CSI 1 ; m X` sequences
static XTERM_LETTER_KEYS: &[(u8, Key)] = &[
    (b'A', Key::UP),
    (b'B', Key::DOWN),
    (b'C', Key::RIGHT),
    (b'D', Key::LEFT),
    (b'E', Key::CENTER),
    (b'F', Key::END),
    (b'H', Key::HOME),
    (b'P', Key::F1),
    (b'Q', Key::F2),
    (b'R', Key::F3),
    (b'S', Key::F4),
];

/// Parameters of `CSI n ; m ~` sequences
static XTERM_TILDE_KEYS: &[(u8, Key)] = &[
    (2, Key::INSERT),
    (3, Key::DELETE),
    (5, Key::PAGE_UP),
    (6, Key::PAGE_DOWN),
    (15, Key::F5),
    (17, Key::F6),
    (18, Key::F7),
    (19, Key::F8),
    (20, Key::F9),
    (21, Key::F10),
    (23, Key::F11),
    (24, Key::F12),
];

/// Modifiers encoded by an xterm modifier parameter (2..=8)
fn xterm_modifiers(param: u8) -> Modifiers {
    let bits = param.saturating_sub(1);
    let mut modifiers = Modifiers::empty();
    if bits & 0b001 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if bits & 0b010 != 0 {
        modifiers |= Modifiers::META;
    }
    if bits & 0b100 != 0 {
        modifiers |= Modifiers::CTRL;
    }
    modifiers
}

fn generic_entries() -> Vec<KeyEntry> {
    let mut entries: Vec<KeyEntry> = FIXED_KEYS
        .iter()
        .map(|&(pattern, key)| KeyEntry::new(pattern, key))
        .collect();

    // Meta (Alt) + printable ASCII arrives as ESC followed by the character
    entries.extend((0x20..=0x7e).map(|byte| KeyEntry::new(vec![0x1b, byte], Key::meta(byte))));

    for param in 2..=8 {
        let modifiers = xterm_modifiers(param);

        for &(final_byte, key) in XTERM_LETTER_KEYS {
            let mut pattern = format!("\x1b[1;{param}").into_bytes();
            pattern.push(final_byte);
            entries.push(KeyEntry::new(pattern, key.with_modifiers(modifiers)));
        }

        for &(code, key) in XTERM_TILDE_KEYS {
            let pattern = format!("\x1b[{code};{param}~").into_bytes();
            entries.push(KeyEntry::new(pattern, key.with_modifiers(modifiers)));
        }
    }

    entries
}
