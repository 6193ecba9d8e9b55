//! Key identifiers
//!
//! A [`Key`] is an opaque 32-bit identifier. The low 24 bits hold the base
//! key: Unicode scalar values and raw byte codes occupy `0..=0x10FFFF`,
//! named keys (cursor keys, function keys, mouse report classes) live just
//! above the Unicode range. The bits above hold [`Modifiers`].

use bitflags::bitflags;
use std::fmt;

const MODIFIER_SHIFT: u32 = 24;
const BASE_MASK: u32 = (1 << MODIFIER_SHIFT) - 1;
const NAMED_BASE: u32 = 0x0011_0000;

bitflags! {
    /// Modifier keys held together with a key
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL = 0b0000_0010;
        const META = 0b0000_0100;
    }
}

/// Identifier of a decoded input
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u32);

macro_rules! named_keys {
    ($($name:ident = $offset:expr => $label:literal,)*) => {
        impl Key {
            $(pub const $name: Key = Key(NAMED_BASE + $offset);)*
        }

        pub(crate) static NAMED_KEYS: &[(Key, &str)] = &[$((Key::$name, $label),)*];
    };
}

named_keys! {
    BACKSPACE = 0x00 => "Backspace",
    UP = 0x01 => "Up",
    DOWN = 0x02 => "Down",
    LEFT = 0x03 => "Left",
    RIGHT = 0x04 => "Right",
    HOME = 0x05 => "Home",
    END = 0x06 => "End",
    PAGE_UP = 0x07 => "PgUp",
    PAGE_DOWN = 0x08 => "PgDn",
    INSERT = 0x09 => "Insert",
    DELETE = 0x0a => "Del",
    BACK_TAB = 0x0b => "Back-Tab",
    CENTER = 0x0c => "Center",
    F1 = 0x11 => "F1",
    F2 = 0x12 => "F2",
    F3 = 0x13 => "F3",
    F4 = 0x14 => "F4",
    F5 = 0x15 => "F5",
    F6 = 0x16 => "F6",
    F7 = 0x17 => "F7",
    F8 = 0x18 => "F8",
    F9 = 0x19 => "F9",
    F10 = 0x1a => "F10",
    F11 = 0x1b => "F11",
    F12 = 0x1c => "F12",
    X11_MOUSE = 0x40 => "xterm mouse",
    SGR_MOUSE = 0x41 => "SGR extended mouse",
    URXVT_MOUSE = 0x42 => "urxvt mouse",
}

impl Key {
    pub const TAB: Key = Key(0x09);
    pub const ENTER: Key = Key(0x0d);
    pub const ESCAPE: Key = Key(0x1b);
    pub const SPACE: Key = Key(0x20);

    /// Ctrl+Space, also produced by Ctrl+@ (a NUL byte)
    pub const CTRL_SPACE: Key = Key::SPACE.with_modifiers(Modifiers::CTRL);

    pub const META_O: Key = Key::meta(b'O');
    pub const META_LEFT_BRACKET: Key = Key::meta(b'[');
    pub const META_RIGHT_BRACKET: Key = Key::meta(b']');

    /// Key for a raw code (code point or byte value)
    pub const fn from_code(code: u32) -> Self {
        Key(code)
    }

    pub const fn from_char(c: char) -> Self {
        Key(c as u32)
    }

    /// Meta (Alt) held together with an ASCII key
    pub const fn meta(byte: u8) -> Self {
        Key(byte as u32).with_modifiers(Modifiers::META)
    }

    /// Raw identifier value
    pub const fn code(self) -> u32 {
        self.0
    }

    /// The key without any modifier bits
    pub const fn base(self) -> Self {
        Key(self.0 & BASE_MASK)
    }

    pub fn modifiers(self) -> Modifiers {
        Modifiers::from_bits_truncate((self.0 >> MODIFIER_SHIFT) as u8)
    }

    pub const fn with_modifiers(self, modifiers: Modifiers) -> Self {
        Key(self.0 | ((modifiers.bits() as u32) << MODIFIER_SHIFT))
    }

    /// Whether this is a named key rather than a character or byte code
    pub const fn is_named(self) -> bool {
        (self.0 & BASE_MASK) >= NAMED_BASE
    }

    pub const fn is_mouse_report(self) -> bool {
        matches!(
            self,
            Key::X11_MOUSE | Key::SGR_MOUSE | Key::URXVT_MOUSE
        )
    }

    /// The character of an unmodified character key
    pub fn as_char(self) -> Option<char> {
        if self.is_named() || !self.modifiers().is_empty() {
            return None;
        }
        char::from_u32(self.0)
    }

    /// Apply the two numeric remaps every decoded value goes through:
    /// NUL becomes Ctrl+Space and DEL becomes Backspace.
    pub const fn normalize(self) -> Self {
        match self.0 {
            0x00 => Key::CTRL_SPACE,
            0x7f => Key::BACKSPACE,
            _ => self,
        }
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::from_char(c)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = crate::names::key_name(*self);
        if name.is_empty() {
            write!(f, "Key({:#x})", self.0)
        } else {
            write!(f, "Key({name})")
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::names::key_name(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_round_trip_through_key() {
        let key = Key::UP.with_modifiers(Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(key.base(), Key::UP);
        assert_eq!(key.modifiers(), Modifiers::SHIFT | Modifiers::CTRL);
        assert!(key.is_named());
        assert_ne!(key, Key::UP);
    }

    #[test]
    fn test_normalize_remaps_nul_and_del() {
        assert_eq!(Key::from_code(0).normalize(), Key::CTRL_SPACE);
        assert_eq!(Key::from_code(127).normalize(), Key::BACKSPACE);
        assert_eq!(Key::from_char('a').normalize(), Key::from_char('a'));
        assert_eq!(Key::UP.normalize(), Key::UP);
    }

    #[test]
    fn test_as_char() {
        assert_eq!(Key::from_char('é').as_char(), Some('é'));
        assert_eq!(Key::META_O.as_char(), None);
        assert_eq!(Key::HOME.as_char(), None);
        assert!(Key::SGR_MOUSE.is_mouse_report());
        assert!(!Key::HOME.is_mouse_report());
    }
}
