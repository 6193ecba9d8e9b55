//! Key timeout bookkeeping
//!
//! A lone ESC byte, or ESC followed by `O`, `[` or `]`, may be a complete
//! keystroke or the start of a longer escape sequence. The only way to tell
//! is to wait: once the key timeout has passed since the last read cycle
//! without further bytes, the prefix is taken at face value.

use crate::buffer::InputBuffer;
use crate::clock::Clock;
use std::time::Duration;
use termkeys_keymap::Key;

const ESC: u8 = 0x1b;

/// What a buffered prefix turned out to be once the key timeout passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalePrefix {
    /// The Escape key on its own
    LoneEscape,
    /// Meta held with `O`, `[` or `]`
    MetaPrefix(Key),
}

impl StalePrefix {
    /// The ambiguous prefix `buffer` holds, whether or not it has timed out
    pub fn of(buffer: &InputBuffer) -> Option<Self> {
        if !buffer.is_in_use() {
            return None;
        }

        match buffer.as_slice() {
            [ESC] => Some(StalePrefix::LoneEscape),
            [ESC, b'O'] => Some(StalePrefix::MetaPrefix(Key::META_O)),
            [ESC, b'['] => Some(StalePrefix::MetaPrefix(Key::META_LEFT_BRACKET)),
            [ESC, b']'] => Some(StalePrefix::MetaPrefix(Key::META_RIGHT_BRACKET)),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct TimeoutArbiter<C> {
    clock: C,
    key_timeout: Duration,
    last_keypress: Option<Duration>,
}

impl<C: Clock> TimeoutArbiter<C> {
    pub fn new(clock: C, key_timeout: Duration) -> Self {
        Self {
            clock,
            key_timeout,
            last_keypress: None,
        }
    }

    /// Record the start of a read cycle
    pub fn mark(&mut self) {
        let now = self.clock.now();
        // Never move backwards, even if the clock does.
        self.last_keypress = Some(self.last_keypress.map_or(now, |last| last.max(now)));
    }

    /// Whether the key timeout has passed since the last read cycle.
    /// Before the first cycle it always has.
    pub fn is_elapsed(&self) -> bool {
        match self.last_keypress {
            None => true,
            Some(last) => self.clock.now().saturating_sub(last) >= self.key_timeout,
        }
    }

    /// Classify a timed-out ambiguous prefix held in `buffer`
    pub fn stale_prefix(&self, buffer: &InputBuffer) -> Option<StalePrefix> {
        if !self.is_elapsed() {
            return None;
        }
        StalePrefix::of(buffer)
    }

    pub fn key_timeout(&self) -> Duration {
        self.key_timeout
    }

    pub fn set_key_timeout(&mut self, key_timeout: Duration) {
        self.key_timeout = key_timeout;
    }

    pub fn last_keypress(&self) -> Option<Duration> {
        self.last_keypress
    }
}
