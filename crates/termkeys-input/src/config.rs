//! Decoder configuration

use std::time::Duration;

/// Session-wide decoder settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardConfig {
    /// Time after which a buffered ambiguous prefix counts as complete
    pub key_timeout: Duration,
    /// Readiness wait used when no sequence is in flight
    pub read_blocking_time: Duration,
    /// Readiness wait used while a sequence may still be arriving
    pub read_blocking_time_short: Duration,
    /// Whether the terminal reliably reports readiness
    pub non_blocking_input_support: bool,
    /// Decode multi-byte UTF-8 characters
    pub utf8_input: bool,
    /// Recognise mouse reports
    pub mouse_support: bool,
    /// Maximum number of decoded keys waiting for dispatch
    pub queue_capacity: usize,
    /// Terminal type used to pick the key correction (`$TERM`)
    pub term_type: Option<String>,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            key_timeout: Duration::from_millis(100),
            read_blocking_time: Duration::from_millis(100),
            read_blocking_time_short: Duration::from_millis(5),
            non_blocking_input_support: true,
            utf8_input: true,
            mouse_support: false,
            queue_capacity: 10_000,
            term_type: None,
        }
    }
}

impl KeyboardConfig {
    /// Default settings with the terminal type taken from `$TERM`
    pub fn from_env() -> Self {
        Self {
            term_type: std::env::var("TERM").ok().filter(|term| !term.is_empty()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KeyboardConfig::default();
        assert_eq!(config.key_timeout, Duration::from_millis(100));
        assert_eq!(config.read_blocking_time_short, Duration::from_millis(5));
        assert_eq!(config.queue_capacity, 10_000);
        assert!(config.utf8_input);
        assert!(!config.mouse_support);
        assert!(config.non_blocking_input_support);
    }
}
