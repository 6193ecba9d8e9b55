//! The decoder instance the host event loop drives
//!
//! A host loop calls [`Keyboard::poll_events`] repeatedly, or the individual
//! steps in the same order:
//!
//! 1. [`Keyboard::escape_key_handling`] settles timed-out ESC prefixes
//! 2. [`Keyboard::clear_key_buffer_on_timeout`] drops stale partial sequences
//! 3. [`Keyboard::is_key_pressed`] waits for input
//! 4. [`Keyboard::fetch_key_code`] reads and decodes the available bytes
//! 5. [`Keyboard::process_queued_input`] delivers the decoded keys
//!
//! Once the source reports end of input, whatever is still buffered is
//! decoded as if the key timeout had passed and `poll_events` returns
//! [`DispatchOutcome::Closed`].

use crate::arbiter::{StalePrefix, TimeoutArbiter};
use crate::buffer::InputBuffer;
use crate::classify::{Classification, MouseProtocol, SequenceClassifier};
use crate::clock::{Clock, MonotonicClock};
use crate::config::KeyboardConfig;
use crate::correction::KeyCorrection;
use crate::dispatch::{DispatchOutcome, Handlers, MouseReport};
use crate::queue::EventQueue;
use crate::reader::NonBlockingReader;
use crate::source::{InputSource, TtySource};
use crate::InputError;
use std::io;
use std::time::Duration;
use termkeys_keymap::{key_name, Key, KeyTable};
use tracing::{debug, trace, warn};

pub struct Keyboard<S, C = MonotonicClock> {
    reader: NonBlockingReader<S>,
    buffer: InputBuffer,
    arbiter: TimeoutArbiter<C>,
    queue: EventQueue,
    platform_table: Option<KeyTable>,
    correction: KeyCorrection,
    handlers: Handlers,
    config: KeyboardConfig,
}

impl Keyboard<TtySource<io::Stdin>> {
    /// Decode the process's standard input, with the key correction picked
    /// from the configured terminal type
    pub fn stdin(config: KeyboardConfig) -> Result<Self, InputError> {
        let source = TtySource::stdin()?;
        let correction = KeyCorrection::detect(config.term_type.as_deref(), source.as_raw_fd());
        Ok(Keyboard::new(source, config).with_key_correction(correction))
    }
}

impl<S: InputSource> Keyboard<S> {
    pub fn new(source: S, config: KeyboardConfig) -> Self {
        Self::with_clock(source, MonotonicClock::new(), config)
    }
}

impl<S: InputSource, C: Clock> Keyboard<S, C> {
    pub fn with_clock(source: S, clock: C, config: KeyboardConfig) -> Self {
        debug!(
            "Keyboard created (key timeout {:?}, utf8 {}, mouse {})",
            config.key_timeout, config.utf8_input, config.mouse_support
        );

        Self {
            reader: NonBlockingReader::new(source, &config),
            buffer: InputBuffer::new(),
            arbiter: TimeoutArbiter::new(clock, config.key_timeout),
            queue: EventQueue::with_capacity(config.queue_capacity),
            platform_table: None,
            correction: KeyCorrection::Passthrough,
            handlers: Handlers::default(),
            config,
        }
    }

    pub fn with_key_correction(mut self, correction: KeyCorrection) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn set_handlers(&mut self, handlers: Handlers) {
        self.handlers = handlers;
    }

    /// Sequences checked before the generic table, usually built from the
    /// terminal's capability database
    pub fn set_platform_table(&mut self, table: Option<KeyTable>) {
        if let Some(table) = &table {
            debug!("Platform key table set with {} entries", table.len());
        }
        self.platform_table = table;
    }

    pub fn set_key_timeout(&mut self, timeout: Duration) {
        self.config.key_timeout = timeout;
        self.arbiter.set_key_timeout(timeout);
    }

    pub fn set_read_blocking_time(&mut self, wait: Duration) {
        self.config.read_blocking_time = wait;
    }

    pub fn set_read_blocking_time_short(&mut self, wait: Duration) {
        self.config.read_blocking_time_short = wait;
        self.reader.set_short_wait(wait);
    }

    pub fn set_non_blocking_input_support(&mut self, enabled: bool) {
        self.config.non_blocking_input_support = enabled;
        self.reader.set_non_blocking_support(enabled);
    }

    pub fn set_utf8_input(&mut self, enabled: bool) {
        self.config.utf8_input = enabled;
    }

    pub fn set_mouse_support(&mut self, enabled: bool) {
        self.config.mouse_support = enabled;
    }

    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    /// Whether input is ready, waiting at most `timeout`. While a sequence
    /// may still be arriving only the short wait is used.
    pub fn is_key_pressed(&mut self, timeout: Duration) -> bool {
        let timed_out = self.arbiter.is_elapsed();
        self.reader.poll_ready(timeout, timed_out)
    }

    /// Read every available byte and decode as many keys as possible.
    /// Does nothing while the queue is full.
    pub fn fetch_key_code(&mut self) {
        if self.queue.is_full() {
            debug!("Key queue full, deferring read");
            return;
        }

        self.arbiter.mark();
        self.resolve_leftover();

        loop {
            if self.queue.is_full() {
                debug!("Key queue full, leaving remaining input unread");
                break;
            }

            let byte = match self.reader.read_one() {
                Ok(Some(byte)) => byte,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            };

            trace!("Read byte {:#04x}", byte);
            if !self.buffer.push(byte) {
                warn!("Input buffer full, dropping byte {:#04x}", byte);
            }

            let timed_out = self.arbiter.is_elapsed();
            self.resolve_buffer(timed_out);
        }
    }

    /// Settle a timed-out ESC prefix: a lone ESC fires the escape handler,
    /// ESC followed by `O`, `[` or `]` is queued as the Meta key.
    pub fn escape_key_handling(&mut self) {
        let prefix = self.arbiter.stale_prefix(&self.buffer);
        self.settle_prefix(prefix);
    }

    fn settle_prefix(&mut self, prefix: Option<StalePrefix>) {
        match prefix {
            Some(StalePrefix::LoneEscape) => {
                trace!("Lone escape key");
                self.buffer.clear();
                self.handlers.escape();
            }
            Some(StalePrefix::MetaPrefix(key)) => {
                trace!("Timed out prefix resolved to {:?}", key);
                self.buffer.clear();
                if !self.queue.push(key) {
                    warn!("Key queue full, dropping {:?}", key);
                }
            }
            None => {}
        }
    }

    pub fn clear_key_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Drop a partial sequence that has outlived the key timeout
    pub fn clear_key_buffer_on_timeout(&mut self) {
        if self.buffer.is_in_use() && self.arbiter.is_elapsed() {
            if !self.buffer.is_empty() {
                debug!("Discarding {} stale input bytes", self.buffer.len());
            }
            self.buffer.clear();
        }
    }

    /// Deliver every queued key as a press and a release
    pub fn process_queued_input(&mut self) -> DispatchOutcome {
        self.handlers.dispatch(&mut self.queue)
    }

    /// One iteration of the host loop
    pub fn poll_events(&mut self, timeout: Duration) -> DispatchOutcome {
        self.escape_key_handling();
        // Complete tokens left behind by a full queue must survive the reset.
        self.resolve_leftover();
        self.clear_key_buffer_on_timeout();

        if self.is_key_pressed(timeout) {
            self.fetch_key_code();
        }
        if self.reader.is_closed() {
            self.flush_closed_input();
        }

        match self.process_queued_input() {
            DispatchOutcome::Drained if self.is_closed() && self.buffer.is_empty() => {
                DispatchOutcome::Closed
            }
            outcome => outcome,
        }
    }

    /// Whether the source has reported end of input
    pub fn is_closed(&self) -> bool {
        self.reader.is_closed()
    }

    pub fn has_unprocessed_input(&self) -> bool {
        self.buffer.has_unprocessed_data()
    }

    pub fn has_pending_input(&self) -> bool {
        self.reader.has_pending_input()
    }

    /// Bytes buffered but not yet decoded
    pub fn key_buffer(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn queued_keys(&self) -> usize {
        self.queue.len()
    }

    pub fn key_name(&self, key: Key) -> String {
        key_name(key)
    }

    pub fn source(&self) -> &S {
        self.reader.source()
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.reader.source_mut()
    }

    /// Decode complete tokens still sitting in the buffer. Partial sequences
    /// are left for the key timeout to settle.
    fn resolve_leftover(&mut self) {
        if self.buffer.has_unprocessed_data() {
            self.resolve_buffer(false);
        }
    }

    /// No byte can complete a buffered prefix once the input is closed
    fn flush_closed_input(&mut self) {
        self.settle_prefix(StalePrefix::of(&self.buffer));

        while !self.buffer.is_empty() && !self.queue.is_full() {
            let before = self.buffer.len();
            self.resolve_buffer(true);
            if self.buffer.len() == before {
                debug!("Discarding {} undecodable bytes at end of input", before);
                self.buffer.clear();
            }
        }
    }

    fn resolve_buffer(&mut self, timed_out: bool) {
        let classifier = SequenceClassifier::new(KeyTable::generic())
            .platform_table(self.platform_table.as_ref())
            .utf8_input(self.config.utf8_input)
            .mouse_support(self.config.mouse_support);

        while !self.buffer.is_empty() && !self.queue.is_full() {
            match classifier.classify(&mut self.buffer, timed_out) {
                Classification::Resolved(key) => {
                    let key = self.correction.apply(key);
                    trace!("Decoded {:?}", key);
                    self.queue.push(key);
                }
                Classification::Mouse(protocol) => {
                    Self::deliver_mouse_report(&mut self.buffer, &mut self.handlers, protocol);
                    break;
                }
                Classification::Incomplete | Classification::NoMatch => break,
            }
        }
    }

    fn deliver_mouse_report(buffer: &mut InputBuffer, handlers: &mut Handlers, protocol: MouseProtocol) {
        let len = protocol.report_len(buffer.as_slice());
        trace!("{:?} mouse report, {} bytes", protocol, len);

        let report = MouseReport::new(protocol, &buffer.as_slice()[..len]);
        handlers.mouse_report(&report);
        buffer.consume_front(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Script(Rc<RefCell<VecDeque<u8>>>);

    impl Script {
        fn feed(&self, bytes: &[u8]) {
            self.0.borrow_mut().extend(bytes);
        }
    }

    impl InputSource for Script {
        fn poll(&mut self, _timeout: Duration) -> Result<bool, InputError> {
            Ok(!self.0.borrow().is_empty())
        }

        fn read_byte(&mut self) -> Result<Option<u8>, InputError> {
            Ok(self.0.borrow_mut().pop_front())
        }
    }

    #[derive(Clone, Default)]
    struct Ticks(Rc<Cell<Duration>>);

    impl Ticks {
        fn advance(&self, millis: u64) {
            self.0.set(self.0.get() + Duration::from_millis(millis));
        }
    }

    impl Clock for Ticks {
        fn now(&self) -> Duration {
            self.0.get()
        }
    }

    fn keyboard(config: KeyboardConfig) -> (Keyboard<Script, Ticks>, Script, Ticks, Rc<RefCell<Vec<Key>>>) {
        let script = Script::default();
        let ticks = Ticks::default();
        let pressed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pressed);
        let keyboard = Keyboard::with_clock(script.clone(), ticks.clone(), config)
            .with_handlers(Handlers::new().on_key_pressed(move |key| sink.borrow_mut().push(key)));
        (keyboard, script, ticks, pressed)
    }

    #[test]
    fn test_read_cycle_decodes_everything_available() {
        let (mut keyboard, script, _ticks, pressed) = keyboard(KeyboardConfig::default());
        script.feed(b"a\x1b[Ab");

        assert!(keyboard.is_key_pressed(Duration::ZERO));
        assert!(keyboard.has_pending_input());
        keyboard.fetch_key_code();
        assert!(!keyboard.has_pending_input());
        assert_eq!(keyboard.queued_keys(), 3);

        assert_eq!(keyboard.process_queued_input(), DispatchOutcome::Drained);
        assert_eq!(
            *pressed.borrow(),
            vec![Key::from_char('a'), Key::UP, Key::from_char('b')]
        );
    }

    #[test]
    fn test_partial_sequence_waits_for_more_bytes() {
        let (mut keyboard, script, ticks, pressed) = keyboard(KeyboardConfig::default());

        script.feed(b"\x1b[1;5");
        keyboard.poll_events(Duration::ZERO);
        assert_eq!(keyboard.key_buffer(), b"\x1b[1;5");

        ticks.advance(20);
        script.feed(b"A");
        keyboard.poll_events(Duration::ZERO);
        assert_eq!(*pressed.borrow(), vec![Key::UP.with_modifiers(termkeys_keymap::Modifiers::CTRL)]);
        assert!(keyboard.key_buffer().is_empty());
    }

    #[test]
    fn test_stale_partial_sequence_is_discarded() {
        let (mut keyboard, script, ticks, pressed) = keyboard(KeyboardConfig::default());

        script.feed(b"\x1b[1;");
        keyboard.poll_events(Duration::ZERO);
        ticks.advance(100);
        keyboard.poll_events(Duration::ZERO);

        assert!(keyboard.key_buffer().is_empty());
        assert!(pressed.borrow().is_empty());
    }

    #[test]
    fn test_lone_escape_fires_escape_handler() {
        let (mut keyboard, script, ticks, pressed) = keyboard(KeyboardConfig::default());
        let escapes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&escapes);
        keyboard.set_handlers(Handlers::new().on_escape(move || counter.set(counter.get() + 1)));

        script.feed(b"\x1b");
        keyboard.poll_events(Duration::ZERO);
        assert_eq!(escapes.get(), 0);

        ticks.advance(100);
        keyboard.poll_events(Duration::ZERO);
        keyboard.poll_events(Duration::ZERO);
        assert_eq!(escapes.get(), 1);
        assert!(pressed.borrow().is_empty());
    }

    #[test]
    fn test_leftover_tokens_resolved_after_back_pressure() {
        let config = KeyboardConfig {
            queue_capacity: 2,
            ..KeyboardConfig::default()
        };
        let (mut keyboard, script, ticks, pressed) = keyboard(config);
        script.feed(b"abcde");

        keyboard.fetch_key_code();
        assert_eq!(keyboard.queued_keys(), 2);
        keyboard.process_queued_input();

        ticks.advance(500);
        for _ in 0..3 {
            keyboard.poll_events(Duration::ZERO);
        }

        let expected: Vec<Key> = "abcde".chars().map(Key::from_char).collect();
        assert_eq!(*pressed.borrow(), expected);
    }

    #[test]
    fn test_mouse_report_is_delivered_and_consumed() {
        let config = KeyboardConfig {
            mouse_support: true,
            ..KeyboardConfig::default()
        };
        let (mut keyboard, script, _ticks, pressed) = keyboard(config);
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        keyboard.set_handlers(
            Handlers::new().on_mouse_report(move |report| {
                sink.borrow_mut().push((report.protocol(), report.bytes().to_vec()))
            }),
        );

        script.feed(b"\x1b[<0;3;4M");
        keyboard.poll_events(Duration::ZERO);

        assert_eq!(
            *reports.borrow(),
            vec![(MouseProtocol::Sgr, b"\x1b[<0;3;4M".to_vec())]
        );
        assert!(keyboard.key_buffer().is_empty());
        assert!(pressed.borrow().is_empty());
    }

    #[test]
    fn test_key_name() {
        let (keyboard, ..) = keyboard(KeyboardConfig::default());
        assert_eq!(keyboard.key_name(Key::F5), "F5");
    }
}
