//! UTF-8 code point stepping over raw bytes.
//!
//! The document is an arbitrary byte sequence, so these helpers never assume
//! validity: a byte that does not start a well-formed sequence decodes as a
//! single one-byte unit (`None`). Movement built on top therefore always makes
//! progress, even through binary garbage.

/// Length of the sequence introduced by `lead`, or 0 when `lead` cannot start one.
fn sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

#[inline]
fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// Decode the first code point of `bytes`.
///
/// Returns `(None, 0)` for empty input and `(None, 1)` for an invalid unit.
pub fn decode(bytes: &[u8]) -> (Option<char>, usize) {
    let Some(&lead) = bytes.first() else {
        return (None, 0);
    };
    if lead < 0x80 {
        return (Some(lead as char), 1);
    }
    let width = sequence_len(lead);
    if width == 0 || bytes.len() < width {
        return (None, 1);
    }
    match std::str::from_utf8(&bytes[..width]) {
        Ok(s) => (s.chars().next(), width),
        Err(_) => (None, 1),
    }
}

/// Decode the last code point of `bytes`. Same failure conventions as [`decode`].
pub fn decode_last(bytes: &[u8]) -> (Option<char>, usize) {
    let end = bytes.len();
    if end == 0 {
        return (None, 0);
    }
    if bytes[end - 1] < 0x80 {
        return (Some(bytes[end - 1] as char), 1);
    }
    let floor = end.saturating_sub(4);
    let mut start = end - 1;
    while start > floor && is_continuation(bytes[start]) {
        start -= 1;
    }
    match decode(&bytes[start..]) {
        (Some(ch), w) if start + w == end => (Some(ch), w),
        _ => (None, 1),
    }
}

/// Byte length of the unit starting at `off` (0 at or past the end).
pub fn len_at(bytes: &[u8], off: usize) -> usize {
    if off >= bytes.len() {
        return 0;
    }
    decode(&bytes[off..]).1
}

/// Byte length of the unit ending at `off` (0 at the start).
pub fn len_before(bytes: &[u8], off: usize) -> usize {
    let off = off.min(bytes.len());
    decode_last(&bytes[..off]).1
}

/// Number of code point units in `bytes` (invalid bytes count one each).
pub fn count(bytes: &[u8]) -> usize {
    let mut n = 0;
    let mut i = 0;
    while i < bytes.len() {
        i += decode(&bytes[i..]).1;
        n += 1;
    }
    n
}
