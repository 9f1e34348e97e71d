//! Pure helpers over a flat byte document.
//!
//! Lines are never materialized: every boundary is found by scanning for the
//! nearest `\n`. Offsets handed in are clamped to the document length, so the
//! helpers are total on any `usize`.
//!
//! Performance note: [`visual_column`] walks from the line start on every call
//! and is O(line length). Callers invoke it on every cursor movement; this is
//! only acceptable while lines stay short (hundreds of bytes, not megabytes).

use crate::rune;

/// Offset of the first byte of the line containing `off`.
pub fn line_start(doc: &[u8], off: usize) -> usize {
    let off = off.min(doc.len());
    match doc[..off].iter().rposition(|&b| b == b'\n') {
        Some(i) => i + 1,
        None => 0,
    }
}

/// Offset of the `\n` terminating the line containing `off`, or `doc.len()`.
pub fn line_end(doc: &[u8], off: usize) -> usize {
    if off >= doc.len() {
        return doc.len();
    }
    match doc[off..].iter().position(|&b| b == b'\n') {
        Some(i) => off + i,
        None => doc.len(),
    }
}

/// Line start plus the offset of the first non-blank (space/tab) byte on that line.
pub fn line_indent(doc: &[u8], off: usize) -> (usize, usize) {
    let ls = line_start(doc, off);
    let le = line_end(doc, off);
    let indent = doc[ls..le]
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count();
    (ls, ls + indent)
}

/// Copy of the leading whitespace of the line containing `off`.
pub fn line_indent_text(doc: &[u8], off: usize) -> Vec<u8> {
    let (ls, i) = line_indent(doc, off);
    doc[ls..i].to_vec()
}

/// Columns a tab advances when it starts at visual column `col`.
#[inline]
pub fn tab_step(col: usize, tab_stop: usize) -> usize {
    let ts = tab_stop.max(1);
    ts - col % ts
}

/// Visual column of `off` within its line: one column per code point, tabs
/// rounding up to the next multiple of `tab_stop`.
pub fn visual_column(doc: &[u8], off: usize, tab_stop: usize) -> usize {
    let off = off.min(doc.len());
    let mut i = line_start(doc, off);
    let mut col = 0;
    while i < off {
        if doc[i] == b'\t' {
            col += tab_step(col, tab_stop);
        } else {
            col += 1;
        }
        i += rune::len_at(doc, i);
    }
    col
}

/// Replace tabs with the spaces they occupy on screen.
pub fn expand_tabs(line: &[u8], tab_stop: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    let mut col = 0;
    let mut i = 0;
    while i < line.len() {
        let s = rune::len_at(line, i);
        if line[i] == b'\t' {
            let step = tab_step(col, tab_stop);
            out.extend(std::iter::repeat_n(b' ', step));
            col += step;
        } else {
            out.extend_from_slice(&line[i..i + s]);
            col += 1;
        }
        i += s;
    }
    out
}

pub fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

/// Substring search. Forward searches start at `from`; backward searches
/// accept any match that starts before `from + needle.len()`, so a match
/// under the cursor is found again when scanning back from it. An empty
/// needle never matches.
pub fn find(doc: &[u8], needle: &[u8], from: usize, forward: bool) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    if forward {
        if from >= doc.len() {
            return None;
        }
        doc[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|i| from + i)
    } else {
        let end = from.saturating_add(needle.len()).min(doc.len());
        doc[..end].windows(needle.len()).rposition(|w| w == needle)
    }
}

/// Offset of the delimiter paired with the one at `off`.
///
/// If `open` starts at `off` the scan runs forward, if `close` starts there it
/// runs backward; nested pairs are skipped. Delimiters may be multi-byte.
pub fn matching_delimiter(doc: &[u8], off: usize, open: &[u8], close: &[u8]) -> Option<usize> {
    if off >= doc.len() || open.is_empty() || close.is_empty() {
        return None;
    }
    if doc[off..].starts_with(open) {
        let mut nest = 0usize;
        let mut p = off + open.len();
        while p < doc.len() {
            let rest = &doc[p..];
            if rest.starts_with(open) {
                nest += 1;
            } else if rest.starts_with(close) {
                if nest == 0 {
                    return Some(p);
                }
                nest -= 1;
            }
            p += rune::len_at(doc, p);
        }
    } else if doc[off..].starts_with(close) {
        let mut nest = 0usize;
        let mut p = off;
        while p > 0 {
            p -= rune::len_before(doc, p);
            let rest = &doc[p..];
            if rest.starts_with(close) {
                nest += 1;
            } else if rest.starts_with(open) {
                if nest == 0 {
                    return Some(p);
                }
                nest -= 1;
            }
        }
    }
    None
}

/// Splice `what` into `doc` at `off`.
pub fn insert_bytes(doc: &mut Vec<u8>, off: usize, what: &[u8]) {
    assert!(off <= doc.len(), "insert offset {off} beyond length {}", doc.len());
    doc.splice(off..off, what.iter().copied());
}

/// Remove `[start, end)` (end clamped to the length) and return the removed bytes.
pub fn delete_range(doc: &mut Vec<u8>, start: usize, end: usize) -> Vec<u8> {
    let end = end.min(doc.len());
    let start = start.min(end);
    doc.drain(start..end).collect()
}

/// Word characters: alphanumerics and underscore. Invalid bytes are not words.
pub fn is_word(ch: Option<char>) -> bool {
    ch.is_some_and(|c| c == '_' || c.is_alphanumeric())
}

fn word_at(doc: &[u8], off: usize) -> bool {
    off < doc.len() && is_word(rune::decode(&doc[off..]).0)
}

fn word_before(doc: &[u8], off: usize) -> bool {
    off > 0 && is_word(rune::decode_last(&doc[..off.min(doc.len())]).0)
}

/// Walk back from `off` over word characters.
pub fn word_start(doc: &[u8], off: usize) -> usize {
    let mut p = off.min(doc.len());
    while word_before(doc, p) {
        p -= rune::len_before(doc, p);
    }
    p
}

/// Walk forward from `off` over word characters.
pub fn word_end(doc: &[u8], off: usize) -> usize {
    let mut p = off.min(doc.len());
    while word_at(doc, p) {
        p += rune::len_at(doc, p);
    }
    p
}

/// Bounds `[start, end)` of the first word starting at or after `from`.
pub fn next_word(doc: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut p = from.min(doc.len());
    while p < doc.len() && !word_at(doc, p) {
        p += rune::len_at(doc, p);
    }
    if p >= doc.len() {
        return None;
    }
    let start = p;
    while word_at(doc, p) {
        p += rune::len_at(doc, p);
    }
    Some((start, p))
}

/// Bounds `[start, end)` of the last word ending at or before `from`.
pub fn prev_word(doc: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut p = from.min(doc.len());
    while p > 0 && !word_before(doc, p) {
        p -= rune::len_before(doc, p);
    }
    if p == 0 {
        return None;
    }
    let end = p;
    while word_before(doc, p) {
        p -= rune::len_before(doc, p);
    }
    Some((p, end))
}
