//! Scroll window over the document, measured in visual rows.
//!
//! A logical line wraps into several rows once its expanded width exceeds the
//! viewport width. Rows are never materialized: every boundary is found by
//! walking forward from the start of the logical line, so each query costs
//! O(line length).
//!
//! Wrapping rule: a row always holds at least one code point; a code point
//! that would cross the right edge starts the next row; a `\n` belongs to the
//! row it ends. When the document is empty or ends in `\n` there is one more,
//! empty, row starting at the document length.
//!
//! `start_offset` is kept on a row boundary. `end_offset` is the first offset
//! past the last visible row and is refreshed by every operation that moves
//! the window.

use crate::Highlight;
use core_config::Config;
use core_text::{rune, span};
use tracing::trace;

/// End of the row that starts at `row_start` (exclusive).
fn row_end(text: &[u8], row_start: usize, tab_stop: usize, width: usize) -> usize {
    let width = width.max(1);
    let mut p = row_start;
    let mut col = 0;
    while p < text.len() {
        let b = text[p];
        if b == b'\n' {
            return p + 1;
        }
        let w = if b == b'\t' {
            span::tab_step(col, tab_stop)
        } else {
            1
        };
        if col > 0 && col + w > width {
            return p;
        }
        col += w;
        p += rune::len_at(text, p);
    }
    text.len()
}

/// Offset where the visual row after the one containing `off` begins, or the
/// document length when `off` is on the last row.
pub fn visual_line_end(text: &[u8], off: usize, tab_stop: usize, width: usize) -> usize {
    let off = off.min(text.len());
    let mut r = span::line_start(text, off);
    loop {
        let e = row_end(text, r, tab_stop, width);
        if e > off || e >= text.len() {
            return e;
        }
        r = e;
    }
}

/// Offset where the visual row containing `off` begins.
pub fn visual_line_start(text: &[u8], off: usize, tab_stop: usize, width: usize) -> usize {
    let off = off.min(text.len());
    let mut r = span::line_start(text, off);
    loop {
        let e = row_end(text, r, tab_stop, width);
        if e > off || e >= text.len() {
            return r;
        }
        r = e;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub start_offset: usize,
    pub end_offset: usize,
    pub width: usize,
    pub height: usize,
    pub tab_stop: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize, tab_stop: usize) -> Self {
        Self {
            start_offset: 0,
            end_offset: 0,
            width: width.max(1),
            height: height.max(1),
            tab_stop: tab_stop.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.view_width(), config.view_height(), config.tab_stop())
    }

    pub(crate) fn row_end(&self, text: &[u8], row_start: usize) -> usize {
        row_end(text, row_start, self.tab_stop, self.width)
    }

    pub(crate) fn row_start_of(&self, text: &[u8], off: usize) -> usize {
        visual_line_start(text, off, self.tab_stop, self.width)
    }

    /// Clamp the start into the document, snap it to its row boundary, and
    /// recompute `end_offset`. Returns the new end.
    pub fn compute_end(&mut self, text: &[u8]) -> usize {
        self.start_offset = self.row_start_of(text, self.start_offset);
        let mut r = self.start_offset;
        for _ in 0..self.height {
            if r >= text.len() {
                break;
            }
            r = self.row_end(text, r);
        }
        self.end_offset = r;
        r
    }

    /// Index of the visible row holding `p`, or `None` when `p` is above or
    /// below the window. Assumes `start_offset` is on a row boundary.
    pub fn rows_to(&self, text: &[u8], p: usize) -> Option<usize> {
        let target = self.row_start_of(text, p);
        if target < self.start_offset {
            return None;
        }
        let mut r = self.start_offset;
        for i in 0..self.height {
            if r == target {
                return Some(i);
            }
            if r >= text.len() {
                return None;
            }
            r = self.row_end(text, r);
        }
        None
    }

    fn step_down(&mut self, text: &[u8]) -> bool {
        if self.start_offset >= text.len() {
            return false;
        }
        let next = visual_line_end(text, self.start_offset, self.tab_stop, self.width);
        // The last row of an unterminated line has nothing below it.
        if next >= text.len() && self.row_start_of(text, next) < next {
            return false;
        }
        self.start_offset = next;
        true
    }

    fn step_up(&mut self, text: &[u8]) -> bool {
        if self.start_offset == 0 {
            return false;
        }
        self.start_offset = self.row_start_of(text, self.start_offset - 1);
        true
    }

    /// Move the window down one visual row. No-op on the last row.
    pub fn scroll_down(&mut self, text: &[u8]) {
        self.compute_end(text);
        if self.step_down(text) {
            self.compute_end(text);
            trace!(target: "render.viewport", start = self.start_offset, end = self.end_offset, "scroll_down");
        }
    }

    /// Move the window up one visual row. No-op at the top.
    pub fn scroll_up(&mut self, text: &[u8]) {
        self.compute_end(text);
        if self.step_up(text) {
            self.compute_end(text);
            trace!(target: "render.viewport", start = self.start_offset, end = self.end_offset, "scroll_up");
        }
    }

    fn page_rows(&self) -> usize {
        self.height.saturating_sub(3).max(1)
    }

    /// Scroll down by a page, keeping three rows of overlap.
    pub fn page_down(&mut self, text: &[u8]) {
        self.compute_end(text);
        for _ in 0..self.page_rows() {
            if !self.step_down(text) {
                break;
            }
        }
        self.compute_end(text);
        trace!(target: "render.viewport", start = self.start_offset, end = self.end_offset, "page_down");
    }

    pub fn page_up(&mut self, text: &[u8]) {
        self.compute_end(text);
        for _ in 0..self.page_rows() {
            if !self.step_up(text) {
                break;
            }
        }
        self.compute_end(text);
        trace!(target: "render.viewport", start = self.start_offset, end = self.end_offset, "page_up");
    }

    /// Place the row holding `point` `up` rows below the top of the window
    /// (fewer when the document starts sooner).
    pub fn to_point(&mut self, text: &[u8], point: usize, up: usize) {
        self.start_offset = self.row_start_of(text, point);
        for _ in 0..up {
            if !self.step_up(text) {
                break;
            }
        }
        self.compute_end(text);
    }

    /// Scroll so that `point` is visible. A point above the window lands on
    /// the top row; a point below it lands on the bottom row. Returns whether
    /// the window moved.
    ///
    /// Afterwards `start_offset <= point < end_offset`, or `point` is the
    /// document length and equals `end_offset`.
    pub fn ensure_visible(&mut self, text: &[u8], point: usize) -> bool {
        let point = point.min(text.len());
        self.compute_end(text);
        let before = self.start_offset;
        if point < self.start_offset {
            self.to_point(text, point, 0);
        } else if self.rows_to(text, point).is_none() {
            self.to_point(text, point, self.height - 1);
        }
        let moved = self.start_offset != before;
        if moved {
            trace!(
                target: "render.viewport",
                point,
                from = before,
                start = self.start_offset,
                end = self.end_offset,
                "ensure_visible"
            );
        }
        moved
    }

    /// Drop highlights outside `[start_offset, end_offset)` and clip the rest
    /// to it. Empty ranges are dropped.
    pub fn clip_highlights(&self, highlights: &[Highlight]) -> Vec<Highlight> {
        highlights
            .iter()
            .filter(|h| h.start < h.end && h.end > self.start_offset && h.start < self.end_offset)
            .map(|h| Highlight {
                start: h.start.max(self.start_offset),
                end: h.end.min(self.end_offset),
                flags: h.flags,
            })
            .collect()
    }
}
