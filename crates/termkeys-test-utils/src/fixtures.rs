//! Byte sequences common terminals send

pub const CURSOR_UP: &[u8] = b"\x1b[A";
pub const CURSOR_LEFT: &[u8] = b"\x1b[D";
pub const APP_CURSOR_DOWN: &[u8] = b"\x1bOB";
pub const CTRL_RIGHT: &[u8] = b"\x1b[1;5C";
pub const SHIFT_F5: &[u8] = b"\x1b[15;2~";
pub const BACK_TAB: &[u8] = b"\x1b[Z";
pub const DELETE: &[u8] = b"\x1b[3~";

pub const X11_MOUSE_CLICK: &[u8] = b"\x1b[M !!";
pub const SGR_MOUSE_PRESS: &[u8] = b"\x1b[<0;12;5M";
pub const SGR_MOUSE_RELEASE: &[u8] = b"\x1b[<0;12;5m";
pub const URXVT_MOUSE_CLICK: &[u8] = b"\x1b[32;12;5M";

pub const UNICODE_TEXT: &str = "é€😀日本";
