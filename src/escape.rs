//! `^X` and `M-` notation for control and high-bit bytes

use std::ops::Deref;

/// Longest escape is `M-^?`
const MAX_ESCAPE_LEN: usize = 4;

/// The rendering of a single input byte
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Escaped {
    buf: [u8; MAX_ESCAPE_LEN],
    len: u8,
}

impl Escaped {
    fn push(&mut self, byte: u8) {
        self.buf[self.len as usize] = byte;
        self.len += 1;
    }
}

impl Deref for Escaped {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

impl std::fmt::Debug for Escaped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Escaped({:?})", String::from_utf8_lossy(self))
    }
}

/// Render `byte` in non-printing notation.
///
/// A tab stays raw unless `show_tabs` is set. Bytes with the high bit set
/// get an `M-` prefix and the remaining seven bits are rendered by the same
/// rules, so `0xC1` is `M-A` and `0xFF` is `M-^?`.
#[inline]
pub fn escape(byte: u8, show_tabs: bool) -> Escaped {
    let mut out = Escaped {
        buf: [0; MAX_ESCAPE_LEN],
        len: 0,
    };

    let low = if byte & 0x80 != 0 {
        out.push(b'M');
        out.push(b'-');
        byte & 0x7F
    } else {
        byte
    };

    match low {
        b'\t' if !show_tabs => out.push(b'\t'),
        0x00..=0x1F => {
            out.push(b'^');
            out.push(b'@' + low);
        }
        0x7F => {
            out.push(b'^');
            out.push(b'?');
        }
        _ => out.push(low),
    }
    out
}
