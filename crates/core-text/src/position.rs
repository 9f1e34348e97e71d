//! Cursor position over a byte document.
//!
//! A [`Position`] carries its byte offset plus two cached values: the visual
//! column it would like to sit in when moving vertically, and its zero-based
//! line number. Movements keep both coherent with the offset so callers never
//! need to rescan the document to learn where the cursor is.

use crate::{rune, span};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub off: usize,
    /// Remembered visual column for vertical movement.
    pub col: usize,
    /// Zero-based line number.
    pub line: usize,
}

impl Position {
    /// Position at `off` (clamped), with column and line computed from the document.
    pub fn at(doc: &[u8], off: usize, tab_stop: usize) -> Self {
        let off = off.min(doc.len());
        Self {
            off,
            col: span::visual_column(doc, off, tab_stop),
            line: span::count_newlines(&doc[..off]),
        }
    }

    pub fn column(&self, doc: &[u8], tab_stop: usize) -> usize {
        span::visual_column(doc, self.off, tab_stop)
    }

    pub fn right(&mut self, doc: &[u8], tab_stop: usize) {
        if self.off >= doc.len() {
            return;
        }
        if doc[self.off] == b'\n' {
            self.line += 1;
        }
        self.off += rune::len_at(doc, self.off);
        self.col = self.column(doc, tab_stop);
    }

    pub fn left(&mut self, doc: &[u8], tab_stop: usize) {
        if self.off == 0 {
            return;
        }
        self.off -= rune::len_before(doc, self.off);
        self.col = self.column(doc, tab_stop);
        if doc[self.off] == b'\n' {
            self.line -= 1;
        }
    }

    /// Walk from the start of the current line toward the remembered column,
    /// stopping at the line end. The remembered column itself is unchanged.
    fn seek_column(&mut self, doc: &[u8], tab_stop: usize) {
        let le = span::line_end(doc, self.off);
        let mut col = 0;
        while col < self.col && self.off < le {
            if doc[self.off] == b'\t' {
                col += span::tab_step(col, tab_stop);
            } else {
                col += 1;
            }
            self.off += rune::len_at(doc, self.off);
        }
    }

    /// No-op on the last line.
    pub fn down(&mut self, doc: &[u8], tab_stop: usize, keep_column: bool) {
        let le = span::line_end(doc, self.off);
        if le == doc.len() {
            return;
        }
        self.off = le + 1;
        if keep_column {
            self.seek_column(doc, tab_stop);
        } else {
            self.col = 0;
        }
        self.line += 1;
    }

    /// No-op on the first line.
    pub fn up(&mut self, doc: &[u8], tab_stop: usize, keep_column: bool) {
        let ls = span::line_start(doc, self.off);
        if ls == 0 {
            return;
        }
        self.off = span::line_start(doc, ls - 1);
        if keep_column {
            self.seek_column(doc, tab_stop);
        } else {
            self.col = 0;
        }
        self.line -= 1;
    }

    pub fn line_end(&mut self, doc: &[u8], tab_stop: usize) {
        self.off = span::line_end(doc, self.off);
        self.col = self.column(doc, tab_stop);
    }

    /// With `smart`, the first press lands on the first non-blank byte and a
    /// second press (already there) goes to column 0.
    pub fn line_start(&mut self, doc: &[u8], tab_stop: usize, smart: bool) {
        let (ls, indent) = span::line_indent(doc, self.off);
        if smart && self.off != indent {
            self.off = indent;
            self.col = self.column(doc, tab_stop);
        } else {
            self.off = ls;
            self.col = 0;
        }
    }

    pub fn text_start(&mut self) {
        *self = Self::default();
    }

    pub fn text_end(&mut self, doc: &[u8], tab_stop: usize) {
        self.off = doc.len();
        self.col = self.column(doc, tab_stop);
        self.line = span::count_newlines(doc);
    }

    /// Jump to `off`, adjusting the line by the newlines crossed. Offsets past
    /// the end are ignored.
    pub fn goto(&mut self, doc: &[u8], off: usize, tab_stop: usize) {
        if off > doc.len() {
            return;
        }
        let cur = self.off.min(doc.len());
        if off > cur {
            self.line += span::count_newlines(&doc[cur..off]);
        } else {
            self.line -= span::count_newlines(&doc[off..cur]);
        }
        self.off = off;
        self.col = self.column(doc, tab_stop);
    }

    /// One-based line jump. Lines past the end land on the last line start
    /// reachable, never beyond the document.
    pub fn goto_line(&mut self, doc: &[u8], n: usize) {
        let mut off = 0;
        let mut line = 0;
        let mut left = n;
        while left > 1 {
            let le = span::line_end(doc, off);
            if le >= doc.len() {
                break;
            }
            off = le + 1;
            line += 1;
            left -= 1;
        }
        trace!(target: "text.motion", requested = n, line, off, "goto_line");
        self.off = off;
        self.col = 0;
        self.line = line;
    }

    /// Shift for `inserted` bytes placed at `pos`; `doc` is the document after
    /// the insertion. Positions at or after `pos` move right.
    pub fn shift_for_insert(&mut self, doc: &[u8], pos: usize, inserted: &[u8], tab_stop: usize) {
        if self.off < pos {
            return;
        }
        self.off += inserted.len();
        self.line += span::count_newlines(inserted);
        self.col = self.column(doc, tab_stop);
    }

    /// Shift for `removed` bytes taken out at `start`; `doc` is the document
    /// after the deletion. Positions inside the range collapse onto `start`.
    pub fn shift_for_delete(&mut self, doc: &[u8], start: usize, removed: &[u8], tab_stop: usize) {
        let end = start + removed.len();
        if self.off < start {
            return;
        }
        if self.off >= end {
            self.off -= removed.len();
            self.line -= span::count_newlines(removed);
        } else {
            self.line -= span::count_newlines(&removed[..self.off - start]);
            self.off = start;
        }
        self.col = self.column(doc, tab_stop);
    }
}
