//! Platform key tables loaded from a file
//!
//! Each non-empty line maps a key name to a capability string:
//!
//! ```text
//! # rxvt variants
//! F1 = \E[11~
//! Shift+Up = \E[a
//! ```
//!
//! Capabilities use the terminfo escape syntax and must start with ESC, since
//! only escape sequences are looked up in the table. Lines starting with `#`
//! are comments. When two lines give the same sequence the first one wins.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use termkeys_input::{KeyEntry, KeyTable};
use termkeys_keymap::key_from_name;

const ESC: u8 = 0x1b;

pub fn load_keymap(path: &Path) -> Result<KeyTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read keymap {}", path.display()))?;
    parse_keymap(&text).with_context(|| format!("Invalid keymap {}", path.display()))
}

pub fn parse_keymap(text: &str) -> Result<KeyTable> {
    let mut entries = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, capability) = line
            .split_once('=')
            .ok_or_else(|| anyhow!("line {line_number}: expected `Name = capability`"))?;
        let (name, capability) = (name.trim(), capability.trim());

        let key = key_from_name(name)
            .ok_or_else(|| anyhow!("line {line_number}: unknown key name {name:?}"))?;
        let entry = KeyEntry::from_capability(capability, key)
            .with_context(|| format!("line {line_number}: invalid capability {capability:?}"))?;
        if entry.pattern().first() != Some(&ESC) {
            return Err(anyhow!(
                "line {line_number}: capability {capability:?} does not start with an escape"
            ));
        }
        entries.push(entry);
    }

    Ok(KeyTable::new(entries))
}
