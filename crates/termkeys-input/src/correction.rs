//! Terminal-specific key correction
//!
//! The Linux virtual console sends identical bytes for a cursor key with or
//! without modifiers held. The modifier state has to be asked for separately
//! and merged into the decoded key.

use std::fmt;
use std::os::fd::RawFd;
use termkeys_keymap::{Key, Modifiers};
use tracing::debug;

/// Keys the console reports without their modifiers
const CORRECTABLE_KEYS: [Key; 10] = [
    Key::UP,
    Key::DOWN,
    Key::LEFT,
    Key::RIGHT,
    Key::INSERT,
    Key::DELETE,
    Key::HOME,
    Key::END,
    Key::PAGE_UP,
    Key::PAGE_DOWN,
];

/// Source of the modifier keys currently held
pub trait ModifierProbe {
    fn modifiers(&mut self) -> Modifiers;
}

/// Asks the Linux console for its shift state with `TIOCLINUX`
#[cfg(target_os = "linux")]
#[derive(Debug, Clone, Copy)]
pub struct LinuxConsoleProbe {
    fd: RawFd,
}

#[cfg(target_os = "linux")]
impl LinuxConsoleProbe {
    /// `TIOCL_GETSHIFTSTATE` subcode
    const GET_SHIFT_STATE: libc::c_char = 6;

    pub fn new(fd: RawFd) -> Self {
        Self { fd }
    }
}

#[cfg(target_os = "linux")]
impl ModifierProbe for LinuxConsoleProbe {
    fn modifiers(&mut self) -> Modifiers {
        let mut state: libc::c_char = Self::GET_SHIFT_STATE;
        // SAFETY: TIOCLINUX with the shift state subcode reads and writes a
        // single byte through the pointer, which outlives the call.
        let result = unsafe { libc::ioctl(self.fd, libc::TIOCLINUX, &mut state as *mut libc::c_char) };
        if result < 0 {
            debug!(
                "Console shift state unavailable: {}",
                std::io::Error::last_os_error()
            );
            return Modifiers::empty();
        }
        shift_state_modifiers(state as u8)
    }
}

/// Map console shift state bits (shift 1, altgr 2, ctrl 4, alt 8)
pub fn shift_state_modifiers(state: u8) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    if state & 0x01 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if state & 0x04 != 0 {
        modifiers |= Modifiers::CTRL;
    }
    if state & 0x08 != 0 {
        modifiers |= Modifiers::META;
    }
    modifiers
}

/// Adds the console's modifier state to cursor and editing keys
pub struct ConsoleModifierCorrector {
    probe: Box<dyn ModifierProbe + Send>,
}

impl fmt::Debug for ConsoleModifierCorrector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleModifierCorrector").finish_non_exhaustive()
    }
}

impl ConsoleModifierCorrector {
    pub fn new(probe: impl ModifierProbe + Send + 'static) -> Self {
        Self {
            probe: Box::new(probe),
        }
    }

    pub fn correct(&mut self, key: Key) -> Key {
        if !key.modifiers().is_empty() {
            return key;
        }

        if key == Key::TAB {
            return match self.probe.modifiers() {
                m if m == Modifiers::SHIFT => Key::BACK_TAB,
                _ => key,
            };
        }

        if !CORRECTABLE_KEYS.contains(&key) {
            return key;
        }

        key.with_modifiers(self.probe.modifiers())
    }
}

/// Per-terminal adjustment applied to every resolved key
#[derive(Debug, Default)]
pub enum KeyCorrection {
    #[default]
    Passthrough,
    Console(ConsoleModifierCorrector),
}

impl KeyCorrection {
    /// Pick the correction for a terminal type, probing `fd` where needed
    #[cfg_attr(not(target_os = "linux"), allow(unused_variables))]
    pub fn detect(term_type: Option<&str>, fd: RawFd) -> Self {
        #[cfg(target_os = "linux")]
        {
            if term_type == Some("linux") {
                debug!("Linux console detected, correcting modifier keys");
                let probe = LinuxConsoleProbe::new(fd);
                return KeyCorrection::Console(ConsoleModifierCorrector::new(probe));
            }
        }

        KeyCorrection::Passthrough
    }

    pub fn apply(&mut self, key: Key) -> Key {
        match self {
            KeyCorrection::Passthrough => key,
            KeyCorrection::Console(corrector) => corrector.correct(key),
        }
    }
}
