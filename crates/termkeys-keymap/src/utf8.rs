//! UTF-8 decoding of buffered key bytes
//!
//! Terminal input arrives one byte at a time, so the decoder works on
//! whatever prefix of a sequence is buffered instead of validating complete
//! strings the way `std::str::from_utf8` does.

/// Longest UTF-8 sequence
pub const MAX_SEQUENCE_LEN: usize = 4;

/// Total length of the sequence started by a multi-byte lead byte.
///
/// Returns `None` for ASCII, continuation bytes and bytes that cannot start
/// a sequence.
pub fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        b if b & 0xe0 == 0xc0 => Some(2),
        b if b & 0xf0 == 0xe0 => Some(3),
        b if b & 0xf8 == 0xf0 => Some(4),
        _ => None,
    }
}

/// Decode at most [`MAX_SEQUENCE_LEN`] bytes into a code point.
///
/// Continuation bytes fold into the accumulator, lead bytes reseed it. A
/// byte that is neither yields `None`, and so does a result that is not a
/// Unicode scalar value.
pub fn decode(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }

    let mut ucs: u32 = 0;
    for &byte in bytes.iter().take(MAX_SEQUENCE_LEN) {
        ucs = match byte {
            // 10xxxxxx
            b if b & 0xc0 == 0x80 => (ucs << 6) | u32::from(b & 0x3f),
            // 0xxxxxxx
            b if b < 0x80 => u32::from(b),
            // 110xxxxx
            b if b & 0xe0 == 0xc0 => u32::from(b & 0x1f),
            // 1110xxxx
            b if b & 0xf0 == 0xe0 => u32::from(b & 0x0f),
            // 11110xxx
            b if b & 0xf8 == 0xf0 => u32::from(b & 0x07),
            _ => return None,
        };
    }

    char::from_u32(ucs).map(u32::from)
}
