//! Human-readable key names

use crate::key::{Key, Modifiers, NAMED_KEYS};

/// Names of the C0 control codes plus space
static CONTROL_NAMES: [&str; 33] = [
    "Ctrl+Space",
    "Ctrl+A",
    "Ctrl+B",
    "Ctrl+C",
    "Ctrl+D",
    "Ctrl+E",
    "Ctrl+F",
    "Ctrl+G",
    "Ctrl+H",
    "Tab",
    "Ctrl+J",
    "Ctrl+K",
    "Ctrl+L",
    "Enter",
    "Ctrl+N",
    "Ctrl+O",
    "Ctrl+P",
    "Ctrl+Q",
    "Ctrl+R",
    "Ctrl+S",
    "Ctrl+T",
    "Ctrl+U",
    "Ctrl+V",
    "Ctrl+W",
    "Ctrl+X",
    "Ctrl+Y",
    "Ctrl+Z",
    "Esc",
    "Ctrl+\\",
    "Ctrl+]",
    "Ctrl+^",
    "Ctrl+_",
    "Space",
];

fn base_name(key: Key) -> Option<&'static str> {
    if let Some((_, name)) = NAMED_KEYS.iter().find(|(named, _)| *named == key) {
        return Some(name);
    }

    usize::try_from(key.code())
        .ok()
        .and_then(|index| CONTROL_NAMES.get(index))
        .copied()
}

/// Name of a key.
///
/// Named keys and control codes come from the static name tables, any other
/// printable ASCII key is named by its character, and everything else has
/// an empty name. Modifier bits are spelled as `Shift+`, `Ctrl+` and `Meta+`
/// prefixes of the base key's name.
pub fn key_name(key: Key) -> String {
    let base = key.base();
    let modifiers = key.modifiers();

    let name = match base_name(base) {
        Some(name) => name.to_string(),
        None => match base.code() {
            33..=126 => char::from_u32(base.code()).map(String::from).unwrap_or_default(),
            _ => String::new(),
        },
    };

    if name.is_empty() || modifiers.is_empty() {
        return name;
    }

    // Ctrl+Space is its own table entry
    if base == Key::SPACE && modifiers == Modifiers::CTRL {
        return CONTROL_NAMES[0].to_string();
    }

    let mut prefixed = String::new();
    if modifiers.contains(Modifiers::SHIFT) {
        prefixed.push_str("Shift+");
    }
    if modifiers.contains(Modifiers::CTRL) {
        prefixed.push_str("Ctrl+");
    }
    if modifiers.contains(Modifiers::META) {
        prefixed.push_str("Meta+");
    }
    prefixed.push_str(&name);
    prefixed
}

fn control_key(name: &str) -> Option<Key> {
    let index = CONTROL_NAMES.iter().position(|&control| control == name)?;
    u32::try_from(index).ok().map(|code| Key::from_code(code).normalize())
}

/// Parse a name in the format produced by [`key_name`]
pub fn key_from_name(name: &str) -> Option<Key> {
    if let Some(key) = control_key(name) {
        return Some(key);
    }

    let mut rest = name;
    let mut modifiers = Modifiers::empty();
    loop {
        let (modifier, tail) = if let Some(tail) = rest.strip_prefix("Shift+") {
            (Modifiers::SHIFT, tail)
        } else if let Some(tail) = rest.strip_prefix("Ctrl+") {
            (Modifiers::CTRL, tail)
        } else if let Some(tail) = rest.strip_prefix("Meta+") {
            (Modifiers::META, tail)
        } else {
            break;
        };
        modifiers |= modifier;
        rest = tail;
    }

    let base = NAMED_KEYS
        .iter()
        .find(|(_, label)| *label == rest)
        .map(|(key, _)| *key)
        .or_else(|| control_key(rest))
        .or_else(|| {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_graphic() => Some(Key::from_char(c)),
                _ => None,
            }
        })?;

    Some(base.with_modifiers(modifiers))
}
