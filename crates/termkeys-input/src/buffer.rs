//! Fixed-capacity buffer of raw input bytes
//!
//! Bytes are appended at the end and complete tokens are consumed from the
//! front by shifting the remainder left. The buffer never allocates.

/// Capacity of the input buffer in bytes
pub const BUFFER_CAPACITY: usize = 512;

/// Raw bytes read from the terminal that are not decoded yet
#[derive(Debug, Clone)]
pub struct InputBuffer {
    bytes: [u8; BUFFER_CAPACITY],
    len: usize,
    in_use: bool,
    unprocessed: bool,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0; BUFFER_CAPACITY],
            len: 0,
            in_use: false,
            unprocessed: false,
        }
    }

    /// Append a byte. Returns `false` and drops the byte when the buffer is
    /// full.
    pub fn push(&mut self, byte: u8) -> bool {
        let Some(slot) = self.bytes.get_mut(self.len) else {
            return false;
        };
        *slot = byte;
        self.len += 1;
        self.in_use = true;
        true
    }

    /// Remove `n` bytes from the front, shifting the rest left and zeroing
    /// the vacated tail.
    pub fn consume_front(&mut self, n: usize) {
        let n = n.min(self.len);
        self.bytes.copy_within(n..self.len, 0);
        let remaining = self.len - n;
        self.bytes[remaining..self.len].fill(0);
        self.len = remaining;
        self.unprocessed = self.len > 0;
    }

    /// Drop all buffered bytes
    pub fn clear(&mut self) {
        self.bytes[..self.len].fill(0);
        self.len = 0;
        self.in_use = false;
        self.unprocessed = false;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn first(&self) -> Option<u8> {
        self.as_slice().first().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == BUFFER_CAPACITY
    }

    pub fn capacity(&self) -> usize {
        BUFFER_CAPACITY
    }

    /// Whether bytes were appended since the last clear
    pub fn is_in_use(&self) -> bool {
        self.in_use
    }

    /// Whether bytes were left over after the last token was consumed
    pub fn has_unprocessed_data(&self) -> bool {
        self.unprocessed
    }

    /// The full backing storage, including the zeroed tail
    pub fn raw(&self) -> &[u8; BUFFER_CAPACITY] {
        &self.bytes
    }
}
