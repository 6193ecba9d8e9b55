use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use termkeys_input::{InputError, InputSource};

#[derive(Debug, Default)]
struct Script {
    bytes: VecDeque<u8>,
    polls: Vec<Duration>,
    reads: usize,
    closed: bool,
}

/// In-memory input whose bytes are fed by the test
///
/// Clones share the same script, so a test can keep a handle after moving
/// the source into a keyboard.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: Rc<RefCell<Script>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&self, bytes: &[u8]) {
        self.script.borrow_mut().bytes.extend(bytes);
    }

    /// End the input once the bytes fed so far have been read
    pub fn close(&self) {
        self.script.borrow_mut().closed = true;
    }

    /// Bytes not read yet
    pub fn remaining(&self) -> usize {
        self.script.borrow().bytes.len()
    }

    /// Every timeout the source was polled with
    pub fn polls(&self) -> Vec<Duration> {
        self.script.borrow().polls.clone()
    }

    pub fn reads(&self) -> usize {
        self.script.borrow().reads
    }
}

impl InputSource for ScriptedSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool, InputError> {
        let mut script = self.script.borrow_mut();
        script.polls.push(timeout);
        Ok(!script.bytes.is_empty() || script.closed)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, InputError> {
        let mut script = self.script.borrow_mut();
        script.reads += 1;
        match script.bytes.pop_front() {
            None if script.closed => Err(InputError::Closed),
            byte => Ok(byte),
        }
    }
}
