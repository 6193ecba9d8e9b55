//! Delivery of decoded input to the host application

use crate::classify::MouseProtocol;
use crate::queue::EventQueue;
use std::fmt;
use termkeys_keymap::Key;

/// A complete mouse report, borrowed from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseReport<'a> {
    protocol: MouseProtocol,
    bytes: &'a [u8],
}

impl<'a> MouseReport<'a> {
    pub fn new(protocol: MouseProtocol, bytes: &'a [u8]) -> Self {
        Self { protocol, bytes }
    }

    pub fn protocol(&self) -> MouseProtocol {
        self.protocol
    }

    pub fn key(&self) -> Key {
        self.protocol.key()
    }

    /// The raw report, starting with ESC
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// How a dispatch pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Every queued key was delivered
    Drained,
    /// The stop predicate asked for the pass to end early
    Stopped,
    /// The input has ended and everything read from it was delivered
    Closed,
}

type KeyHandler = Box<dyn FnMut(Key)>;
type MouseHandler = Box<dyn FnMut(&MouseReport<'_>)>;

/// Callbacks the decoder delivers events to
///
/// Every handler defaults to a no-op, and the stop predicate defaults to
/// never stopping.
pub struct Handlers {
    key_pressed: KeyHandler,
    key_released: KeyHandler,
    escape: Box<dyn FnMut()>,
    mouse: MouseHandler,
    stop: Box<dyn FnMut() -> bool>,
}

impl Default for Handlers {
    fn default() -> Self {
        Self {
            key_pressed: Box::new(|_| {}),
            key_released: Box::new(|_| {}),
            escape: Box::new(|| {}),
            mouse: Box::new(|_| {}),
            stop: Box::new(|| false),
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers").finish_non_exhaustive()
    }
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key_pressed(mut self, handler: impl FnMut(Key) + 'static) -> Self {
        self.key_pressed = Box::new(handler);
        self
    }

    pub fn on_key_released(mut self, handler: impl FnMut(Key) + 'static) -> Self {
        self.key_released = Box::new(handler);
        self
    }

    /// Called when a lone Escape press has been confirmed by the key timeout
    pub fn on_escape(mut self, handler: impl FnMut() + 'static) -> Self {
        self.escape = Box::new(handler);
        self
    }

    pub fn on_mouse_report(mut self, handler: impl FnMut(&MouseReport<'_>) + 'static) -> Self {
        self.mouse = Box::new(handler);
        self
    }

    /// Checked after every press and every release
    pub fn stop_when(mut self, predicate: impl FnMut() -> bool + 'static) -> Self {
        self.stop = Box::new(predicate);
        self
    }

    pub(crate) fn escape(&mut self) {
        (self.escape)();
    }

    pub(crate) fn mouse_report(&mut self, report: &MouseReport<'_>) {
        (self.mouse)(report);
    }

    /// Deliver queued keys in order as a press followed by a release,
    /// checking the stop predicate after each callback
    pub fn dispatch(&mut self, queue: &mut EventQueue) -> DispatchOutcome {
        while let Some(key) = queue.pop() {
            (self.key_pressed)(key);
            if (self.stop)() {
                return DispatchOutcome::Stopped;
            }

            (self.key_released)(key);
            if (self.stop)() {
                return DispatchOutcome::Stopped;
            }
        }

        DispatchOutcome::Drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Pressed(Key),
        Released(Key),
    }

    fn recording_handlers(events: &Rc<RefCell<Vec<Event>>>) -> Handlers {
        let pressed = Rc::clone(events);
        let released = Rc::clone(events);
        Handlers::new()
            .on_key_pressed(move |key| pressed.borrow_mut().push(Event::Pressed(key)))
            .on_key_released(move |key| released.borrow_mut().push(Event::Released(key)))
    }

    fn queue(keys: &[Key]) -> EventQueue {
        let mut queue = EventQueue::with_capacity(16);
        for &key in keys {
            queue.push(key);
        }
        queue
    }

    #[test]
    fn test_press_then_release_in_order() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut handlers = recording_handlers(&events);
        let mut queue = queue(&[Key::UP, Key::from_char('a')]);

        assert_eq!(handlers.dispatch(&mut queue), DispatchOutcome::Drained);
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Pressed(Key::UP),
                Event::Released(Key::UP),
                Event::Pressed(Key::from_char('a')),
                Event::Released(Key::from_char('a')),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stop_after_press_keeps_remaining_keys() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let checks = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&checks);
        let mut handlers = recording_handlers(&events).stop_when(move || {
            *counter.borrow_mut() += 1;
            true
        });
        let mut queue = queue(&[Key::UP, Key::DOWN]);

        assert_eq!(handlers.dispatch(&mut queue), DispatchOutcome::Stopped);
        assert_eq!(*events.borrow(), vec![Event::Pressed(Key::UP)]);
        assert_eq!(*checks.borrow(), 1);
        assert_eq!(queue.pop(), Some(Key::DOWN));
    }

    #[test]
    fn test_stop_after_release() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&events);
        let mut handlers = recording_handlers(&events)
            .stop_when(move || matches!(seen.borrow().last(), Some(Event::Released(_))));
        let mut queue = queue(&[Key::UP, Key::DOWN]);

        assert_eq!(handlers.dispatch(&mut queue), DispatchOutcome::Stopped);
        assert_eq!(
            *events.borrow(),
            vec![Event::Pressed(Key::UP), Event::Released(Key::UP)]
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_empty_queue_drains() {
        let mut handlers = Handlers::default();
        let mut queue = EventQueue::with_capacity(1);
        assert_eq!(handlers.dispatch(&mut queue), DispatchOutcome::Drained);
    }
}
