//! Terminal capability string notation
//!
//! Key sequences in terminfo and termcap databases are written with
//! printable escapes (`\E[A`, `^H`, `\177`). A platform key table built
//! from such a database has to turn them back into raw bytes first.

use crate::KeymapError;

/// Convert a capability string into the bytes the terminal sends.
pub fn unescape(capability: &str) -> Result<Vec<u8>, KeymapError> {
    let bytes = capability.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let escape = *bytes.get(i + 1).ok_or(KeymapError::UnterminatedEscape)?;
                i += 2;
                match escape {
                    b'E' | b'e' => out.push(0x1b),
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    b's' => out.push(b' '),
                    b'\\' | b'^' | b',' | b':' => out.push(escape),
                    b'0'..=b'7' => {
                        // Up to three octal digits, the first one already read
                        let mut value = u32::from(escape - b'0');
                        let mut digits = 1;
                        while digits < 3 {
                            match bytes.get(i) {
                                Some(&d) if (b'0'..=b'7').contains(&d) => {
                                    value = value * 8 + u32::from(d - b'0');
                                    i += 1;
                                    digits += 1;
                                }
                                _ => break,
                            }
                        }
                        let byte = u8::try_from(value).map_err(|_| KeymapError::InvalidEscape(i))?;
                        // terminfo writes NUL as \0 but means \200
                        out.push(if byte == 0 { 0x80 } else { byte });
                    }
                    _ => return Err(KeymapError::InvalidEscape(i - 1)),
                }
            }
            b'^' => {
                let control = *bytes.get(i + 1).ok_or(KeymapError::UnterminatedEscape)?;
                match control {
                    b'?' => out.push(0x7f),
                    b'@'..=b'_' => out.push(control - b'@'),
                    b'a'..=b'z' => out.push(control - b'a' + 1),
                    _ => return Err(KeymapError::InvalidEscape(i + 1)),
                }
                i += 2;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    if out.is_empty() {
        return Err(KeymapError::EmptySequence);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(r"\E[A", b"\x1b[A" ; "escape")]
    #[test_case(r"\eOP", b"\x1bOP" ; "lowercase escape")]
    #[test_case("^H", b"\x08" ; "caret control")]
    #[test_case("^?", b"\x7f" ; "caret delete")]
    #[test_case("^[[3~", b"\x1b[3~" ; "caret escape")]
    #[test_case(r"\177", b"\x7f" ; "octal")]
    #[test_case(r"\033[H", b"\x1b[H" ; "octal escape")]
    #[test_case(r"\0", b"\x80" ; "octal nul")]
    #[test_case(r"\\\^", b"\\^" ; "literal backslash and caret")]
    #[test_case(r"\s\t\r\n", b" \t\r\n" ; "named escapes")]
    fn test_unescape(capability: &str, expected: &[u8]) {
        assert_eq!(unescape(capability).as_deref(), Ok(expected));
    }

    #[test]
    fn test_unescape_errors() {
        assert_eq!(unescape(""), Err(KeymapError::EmptySequence));
        assert_eq!(unescape(r"\E["), Ok(b"\x1b[".to_vec()));
        assert_eq!(unescape(r"abc\"), Err(KeymapError::UnterminatedEscape));
        assert_eq!(unescape("^"), Err(KeymapError::UnterminatedEscape));
        assert_eq!(unescape(r"\q"), Err(KeymapError::InvalidEscape(1)));
        assert_eq!(unescape("^1"), Err(KeymapError::InvalidEscape(1)));
        assert!(unescape(r"\777").is_err());
    }
}
