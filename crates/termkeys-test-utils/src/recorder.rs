use std::cell::RefCell;
use std::rc::Rc;
use termkeys_input::{Handlers, MouseProtocol};
use termkeys_keymap::Key;

/// Something the decoder delivered to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Pressed(Key),
    Released(Key),
    Escape,
    Mouse(MouseProtocol, Vec<u8>),
}

/// Collects every callback in delivery order
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers that record into this recorder
    pub fn handlers(&self) -> Handlers {
        let pressed = self.clone();
        let released = self.clone();
        let escape = self.clone();
        let mouse = self.clone();

        Handlers::new()
            .on_key_pressed(move |key| pressed.record(Event::Pressed(key)))
            .on_key_released(move |key| released.record(Event::Released(key)))
            .on_escape(move || escape.record(Event::Escape))
            .on_mouse_report(move |report| {
                mouse.record(Event::Mouse(report.protocol(), report.bytes().to_vec()))
            })
    }

    pub fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Keys in the order their press was delivered
    pub fn pressed(&self) -> Vec<Key> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Pressed(key) => Some(*key),
                _ => None,
            })
            .collect()
    }

    pub fn escapes(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| **event == Event::Escape)
            .count()
    }

    pub fn mouse_reports(&self) -> Vec<(MouseProtocol, Vec<u8>)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Mouse(protocol, bytes) => Some((*protocol, bytes.clone())),
                _ => None,
            })
            .collect()
    }
}
