//! Fixed-capacity formatting target.

use core::fmt;

/// Bytes kept per formatted print.
pub const FORMAT_CAPACITY: usize = 4096;

/// A `fmt::Write` sink over an inline byte array. Output past the capacity
/// is dropped silently, cutting at a byte boundary, which may split a
/// multi-byte character; the UTF-8 decoder copes with that.
pub struct FmtBuffer<const N: usize> {
    bytes: [u8; N],
    len: usize,
    truncated: bool,
}

impl<const N: usize> FmtBuffer<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
            truncated: false,
        }
    }

    /// Render `args` into a fresh buffer.
    pub fn format(args: fmt::Arguments<'_>) -> Self {
        let mut buffer = Self::new();
        // The sink itself never fails; an Err here can only come from a
        // Display impl and still leaves partial output worth showing.
        let _ = fmt::write(&mut buffer, args);
        buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<const N: usize> Default for FmtBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for FmtBuffer<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = N - self.len;
        let take = s.len().min(room);
        self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        if take < s.len() {
            self.truncated = true;
        }
        Ok(())
    }
}
