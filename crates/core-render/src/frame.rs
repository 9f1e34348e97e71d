//! Render-ready breakdown of the visible window.
//!
//! [`layout`] walks the rows of a [`Viewport`] once and produces a grid of
//! [`Cell`]s: tabs expanded to spaces, highlight flags resolved per cell, the
//! cursor cell marked, and `~` filler rows below the end of the document. A
//! terminal front end only has to paint the grid.

use crate::viewport::Viewport;
use crate::{Highlight, HighlightFlags};
use core_text::{rune, span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub flags: HighlightFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            flags: HighlightFlags::empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Cell>,
    /// Document offset each drawn row starts at.
    pub row_offsets: Vec<usize>,
    /// `(column, row)` of the point, when it is on screen.
    pub cursor: Option<(usize, usize)>,
    /// Number of filler rows past the end of the document.
    pub eof_rows: usize,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            row_offsets: Vec::with_capacity(height),
            cursor: None,
            eof_rows: 0,
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    /// Out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, ch: char, flags: HighlightFlags) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell { ch, flags };
        }
    }

    pub fn apply_flags(&mut self, x: usize, y: usize, flags: HighlightFlags) {
        if let Some(i) = self.index(x, y) {
            self.cells[i].flags |= flags;
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Characters of row `y` with trailing blanks removed.
    pub fn row_text(&self, y: usize) -> String {
        if y >= self.height {
            return String::new();
        }
        let row = &self.cells[y * self.width..(y + 1) * self.width];
        let s: String = row.iter().map(|c| c.ch).collect();
        s.trim_end_matches(' ').to_string()
    }
}

fn flags_at(highlights: &[Highlight], p: usize) -> HighlightFlags {
    highlights
        .iter()
        .filter(|h| h.start <= p && p < h.end)
        .fold(HighlightFlags::empty(), |acc, h| acc | h.flags)
}

/// Lay out the window of `text` described by `viewport`. Refreshes the
/// viewport's `end_offset`; highlights outside the window are dropped.
pub fn layout(text: &[u8], viewport: &mut Viewport, point: usize, highlights: &[Highlight]) -> Frame {
    viewport.compute_end(text);
    let highlights = viewport.clip_highlights(highlights);
    let (width, height) = (viewport.width, viewport.height);
    let len = text.len();
    let point = point.min(len);
    let mut frame = Frame::new(width, height);

    let mut r = viewport.start_offset;
    let mut y = 0;
    let mut last_x = 0;
    while y < height && r < len {
        let e = viewport.row_end(text, r);
        frame.row_offsets.push(r);
        let mut x = 0;
        let mut p = r;
        while p < e {
            let (ch, n) = rune::decode(&text[p..]);
            let base = flags_at(&highlights, p);
            let mut flags = base;
            if p == point {
                flags |= HighlightFlags::CURSOR;
                frame.cursor = Some((x.min(width - 1), y));
            }
            match ch {
                Some('\n') => {
                    if p == point {
                        frame.set(x, y, ' ', flags);
                    }
                }
                Some('\t') => {
                    let w = span::tab_step(x, viewport.tab_stop);
                    frame.set(x, y, ' ', flags);
                    for dx in 1..w {
                        frame.set(x + dx, y, ' ', base);
                    }
                    x += w;
                }
                Some(c) => {
                    frame.set(x, y, c, flags);
                    x += 1;
                }
                None => {
                    frame.set(x, y, char::REPLACEMENT_CHARACTER, flags);
                    x += 1;
                }
            }
            p += n.max(1);
        }
        last_x = x;
        y += 1;
        r = e;
    }

    if r < len {
        return frame;
    }
    // The empty row after a final newline, or the only row of an empty document.
    let trailing_row = len == 0 || text[len - 1] == b'\n';
    if trailing_row && y < height {
        frame.row_offsets.push(len);
        y += 1;
    }
    if point == len
        && let Some(row) = viewport.rows_to(text, len)
    {
        let x = if trailing_row { 0 } else { last_x.min(width - 1) };
        frame.cursor = Some((x, row));
        frame.apply_flags(x, row, HighlightFlags::CURSOR);
    }
    for row in y..height {
        frame.set(0, row, '~', HighlightFlags::EOF);
    }
    frame.eof_rows = height - y;
    frame
}
