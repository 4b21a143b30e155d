//! Fixed-capacity formatting buffer.
//!
//! Names, values and log lines are formatted on the stack into a `FmtBuf`.
//! Output that does not fit is cut at the last whole character (the way
//! `snprintf` truncates) and the write reports `fmt::Error`.

use core::fmt;

/// Capacity used for environment fact names.
pub const NAME_CAPACITY: usize = 128;

/// Capacity used for environment fact values.
pub const VALUE_CAPACITY: usize = 64;

/// Stack-allocated UTF-8 text buffer implementing `core::fmt::Write`.
#[derive(Clone)]
pub struct FmtBuf<const N: usize> {
    buf: [u8; N],
    len: usize,
    truncated: bool,
}

impl<const N: usize> FmtBuf<N> {
    /// Empty buffer.
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
            truncated: false,
        }
    }

    /// Format `args` into a fresh buffer, truncating on overflow.
    pub fn from_fmt(args: fmt::Arguments<'_>) -> Self {
        let mut out = Self::new();
        let _ = fmt::write(&mut out, args);
        out
    }

    /// Copy `s` into a fresh buffer, truncating on overflow.
    pub fn from_str_truncated(s: &str) -> Self {
        let mut out = Self::new();
        let _ = fmt::Write::write_str(&mut out, s);
        out
    }

    pub fn as_str(&self) -> &str {
        // Only whole UTF-8 sequences are ever copied in.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// True once any write had to drop text.
    #[inline]
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.truncated = false;
    }
}

impl<const N: usize> Default for FmtBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for FmtBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Err(fmt::Error);
        }

        let room = N - self.len;
        if s.len() <= room {
            self.buf[self.len..self.len + s.len()].copy_from_slice(s.as_bytes());
            self.len += s.len();
            return Ok(());
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.buf[self.len..self.len + cut].copy_from_slice(&s.as_bytes()[..cut]);
        self.len += cut;
        self.truncated = true;
        Err(fmt::Error)
    }
}

impl<const N: usize> fmt::Display for FmtBuf<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> fmt::Debug for FmtBuf<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> PartialEq<str> for FmtBuf<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const N: usize> PartialEq<&str> for FmtBuf<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<const N: usize, const M: usize> PartialEq<FmtBuf<M>> for FmtBuf<N> {
    fn eq(&self, other: &FmtBuf<M>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<const N: usize> Eq for FmtBuf<N> {}
