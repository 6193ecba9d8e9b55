//! Readiness policy on top of an [`InputSource`]

use crate::config::KeyboardConfig;
use crate::source::InputSource;
use crate::InputError;
use std::time::Duration;
use tracing::{debug, warn};

/// Wraps a source with the decoder's readiness policy
///
/// While a sequence may still be arriving the reader only waits briefly, so
/// that the key timeout can be observed promptly. Once readiness has been
/// reported it stays reported until a read is attempted. A source that
/// reports [`InputError::Closed`] is never polled again.
#[derive(Debug)]
pub struct NonBlockingReader<S> {
    source: S,
    pending: bool,
    closed: bool,
    non_blocking_support: bool,
    short_wait: Duration,
}

impl<S: InputSource> NonBlockingReader<S> {
    pub fn new(source: S, config: &KeyboardConfig) -> Self {
        Self {
            source,
            pending: false,
            closed: false,
            non_blocking_support: config.non_blocking_input_support,
            short_wait: config.read_blocking_time_short,
        }
    }

    /// Whether input is ready, waiting at most `timeout`
    ///
    /// `key_timeout_elapsed` tells the reader that no sequence is in flight,
    /// which allows the full wait instead of the short one.
    pub fn poll_ready(&mut self, timeout: Duration, key_timeout_elapsed: bool) -> bool {
        if self.pending {
            return true;
        }
        if self.closed {
            return false;
        }

        if self.non_blocking_support && self.check(Duration::ZERO) {
            self.pending = true;
            return true;
        }

        let wait = if key_timeout_elapsed || !self.non_blocking_support {
            timeout
        } else {
            self.short_wait
        };

        self.pending = self.check(wait);
        self.pending
    }

    /// Read one byte. Any read attempt consumes the pending readiness.
    /// End of input reads as `None` and marks the reader closed.
    pub fn read_one(&mut self) -> Result<Option<u8>, InputError> {
        self.pending = false;
        match self.source.read_byte() {
            Err(InputError::Closed) => {
                if !self.closed {
                    debug!("Input closed");
                    self.closed = true;
                }
                Ok(None)
            }
            result => result,
        }
    }

    pub fn has_pending_input(&self) -> bool {
        self.pending
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_non_blocking_support(&mut self, enabled: bool) {
        self.non_blocking_support = enabled;
    }

    pub fn set_short_wait(&mut self, wait: Duration) {
        self.short_wait = wait;
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn check(&mut self, timeout: Duration) -> bool {
        match self.source.poll(timeout) {
            Ok(ready) => ready,
            Err(e) => {
                warn!("Input readiness check failed: {}", e);
                false
            }
        }
    }
}
