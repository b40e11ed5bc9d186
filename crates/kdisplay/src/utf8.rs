//! One-code-point-at-a-time UTF-8 decoding.
//!
//! Decoding never fails. Malformed input still yields a code point and a
//! length of at least one byte, so a scan over a buffer always makes
//! progress; what went wrong is reported separately as [`Utf8Flags`].

use bitflags::bitflags;

bitflags! {
    /// Ways an encoded character can be malformed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Utf8Flags: u8 {
        /// Encoded with more bytes than the value needs.
        const OVERLONG = 1 << 0;
        /// A UTF-16 surrogate half (U+D800..=U+DFFF).
        const SURROGATE = 1 << 1;
        /// Above U+10FFFF.
        const OUT_OF_RANGE = 1 << 2;
        /// A continuation byte without the `10` tag bits.
        const BAD_CONTINUATION = 1 << 3;
        /// A byte that cannot start a character.
        const INVALID_LEAD = 1 << 4;
        /// The input ended before the declared length.
        const TRUNCATED = 1 << 5;
    }
}

/// Largest Unicode scalar value.
pub const MAX_SCALAR: u32 = 0x10FFFF;

/// Returned for bytes that cannot start a character.
pub const REPLACEMENT: u32 = 0xFFFD;

/// Result of decoding one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub code_point: u32,
    /// Bytes consumed, 1 to 4.
    pub len: usize,
    pub flags: Utf8Flags,
}

impl Decoded {
    pub fn is_well_formed(&self) -> bool {
        self.flags.is_empty()
    }

    /// The code point as a `char`, or U+FFFD if it is not a scalar value.
    pub fn as_char(&self) -> char {
        char::from_u32(self.code_point).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

/// Declared sequence length for a lead byte; `None` for continuation bytes
/// and 0xF8..=0xFF.
const fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

/// Smallest value each length may encode.
const MIN_FOR_LEN: [u32; 5] = [0, 0, 0x80, 0x800, 0x10000];

/// Payload mask of the lead byte for each length.
const LEAD_MASK: [u8; 5] = [0, 0x7F, 0x1F, 0x0F, 0x07];

/// Decode the character at the start of `bytes`.
///
/// Returns `None` only for empty input. A truncated sequence consumes what
/// is left and decodes as if the missing bytes were zero.
pub fn decode(bytes: &[u8]) -> Option<Decoded> {
    let &lead = bytes.first()?;

    let Some(declared) = sequence_len(lead) else {
        return Some(Decoded {
            code_point: REPLACEMENT,
            len: 1,
            flags: Utf8Flags::INVALID_LEAD,
        });
    };

    let mut flags = Utf8Flags::empty();
    let available = declared.min(bytes.len());
    if available < declared {
        flags |= Utf8Flags::TRUNCATED | Utf8Flags::BAD_CONTINUATION;
    }

    let mut code_point = u32::from(lead & LEAD_MASK[declared]);
    for i in 1..declared {
        let byte = if i < available { bytes[i] } else { 0 };
        if i < available && byte & 0xC0 != 0x80 {
            flags |= Utf8Flags::BAD_CONTINUATION;
        }
        code_point = (code_point << 6) | u32::from(byte & 0x3F);
    }

    if code_point < MIN_FOR_LEN[declared] {
        flags |= Utf8Flags::OVERLONG;
    }
    if code_point >> 11 == 0x1B {
        flags |= Utf8Flags::SURROGATE;
    }
    if code_point > MAX_SCALAR {
        flags |= Utf8Flags::OUT_OF_RANGE;
    }

    Some(Decoded {
        code_point,
        len: available,
        flags,
    })
}

/// Iterator over the characters of a byte buffer.
pub struct Chars<'a> {
    bytes: &'a [u8],
}

impl<'a> Chars<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl Iterator for Chars<'_> {
    type Item = Decoded;

    fn next(&mut self) -> Option<Decoded> {
        let decoded = decode(self.bytes)?;
        self.bytes = &self.bytes[decoded.len..];
        Some(decoded)
    }
}
