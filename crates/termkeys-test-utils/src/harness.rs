use crate::{EventRecorder, ManualClock, ScriptedSource};
use std::time::Duration;
use termkeys_input::{DispatchOutcome, Handlers, Keyboard, KeyboardConfig};

/// A keyboard wired to a scripted source, a manual clock and a recorder
pub struct TestKeyboard {
    pub keyboard: Keyboard<ScriptedSource, ManualClock>,
    pub source: ScriptedSource,
    pub clock: ManualClock,
    pub recorder: EventRecorder,
}

impl Default for TestKeyboard {
    fn default() -> Self {
        Self::new(KeyboardConfig::default())
    }
}

impl TestKeyboard {
    pub fn new(config: KeyboardConfig) -> Self {
        let source = ScriptedSource::new();
        let clock = ManualClock::new();
        let recorder = EventRecorder::new();
        let keyboard = Keyboard::with_clock(source.clone(), clock.clone(), config)
            .with_handlers(recorder.handlers());

        Self {
            keyboard,
            source,
            clock,
            recorder,
        }
    }

    /// Replace the handlers, keeping the recorder for the caller to wire in
    pub fn with_handlers(mut self, handlers: Handlers) -> Self {
        self.keyboard.set_handlers(handlers);
        self
    }

    /// Make bytes available and run one loop iteration
    pub fn type_bytes(&mut self, bytes: &[u8]) -> DispatchOutcome {
        self.source.feed(bytes);
        self.poll()
    }

    /// One loop iteration without waiting
    pub fn poll(&mut self) -> DispatchOutcome {
        self.keyboard.poll_events(Duration::ZERO)
    }

    /// Let the key timeout pass and run the loop twice, enough for any
    /// buffered prefix to be settled and dispatched
    pub fn settle(&mut self) {
        self.clock.advance(self.keyboard.config().key_timeout);
        self.poll();
        self.poll();
    }
}
