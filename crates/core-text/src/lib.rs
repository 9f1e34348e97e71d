//! Flat byte buffer plus the pure text helpers built on it.
//!
//! The document is a single `Vec<u8>`; it is not required to be valid UTF-8.
//! Everything above this crate addresses text by byte offset and relies on
//! [`span`] for line boundaries and [`rune`] for code point stepping.

pub mod position;
pub mod rune;
pub mod span;

pub use position::Position;

/// A named, editable byte document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    bytes: Vec<u8>,
    pub name: String,
}

impl Buffer {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            name: name.into(),
        }
    }

    /// Construct a buffer from an in-memory string slice.
    pub fn from_text(name: impl Into<String>, content: &str) -> Self {
        Self::from_bytes(name, content.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of lines: one more than the number of newlines.
    pub fn line_count(&self) -> usize {
        span::count_newlines(&self.bytes) + 1
    }

    /// Bytes in `[start, end)`, both clamped to the length.
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        let end = end.min(self.bytes.len());
        let start = start.min(end);
        &self.bytes[start..end]
    }

    pub fn insert(&mut self, off: usize, what: &[u8]) {
        span::insert_bytes(&mut self.bytes, off, what);
    }

    /// Delete `[start, end)` (clamped) and return the removed bytes for undo
    /// and clipboard use.
    pub fn delete(&mut self, start: usize, end: usize) -> Vec<u8> {
        span::delete_range(&mut self.bytes, start, end)
    }

    /// Replace the whole content.
    pub fn set_bytes(&mut self, bytes: Vec<u8>) {
        self.bytes = bytes;
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}
