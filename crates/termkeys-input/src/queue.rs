//! Bounded FIFO of decoded keys waiting for dispatch

use std::collections::VecDeque;
use termkeys_keymap::Key;

#[derive(Debug, Clone)]
pub struct EventQueue {
    keys: VecDeque<Key>,
    capacity: usize,
}

impl EventQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: VecDeque::new(),
            capacity,
        }
    }

    /// Append a key. Returns `false` and drops the key when the queue is
    /// at capacity.
    pub fn push(&mut self, key: Key) -> bool {
        if self.is_full() {
            return false;
        }
        self.keys.push_back(key);
        true
    }

    pub fn pop(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = EventQueue::with_capacity(4);
        assert!(queue.push(Key::UP));
        assert!(queue.push(Key::DOWN));
        assert_eq!(queue.pop(), Some(Key::UP));
        assert_eq!(queue.pop(), Some(Key::DOWN));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut queue = EventQueue::with_capacity(2);
        assert!(queue.push(Key::UP));
        assert!(queue.push(Key::DOWN));
        assert!(queue.is_full());
        assert!(!queue.push(Key::LEFT));
        assert_eq!(queue.len(), 2);
    }
}
