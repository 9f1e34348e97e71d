//! Editing session: the single owner of a document and everything anchored in it.
//!
//! A [`Session`] holds the byte [`Buffer`], the cursor, the dot, the mark, the
//! registered viewport start, the [`UndoLog`], the clipboard, and the
//! [`Config`] it was opened with. Anchors are plain offsets; they never borrow
//! the buffer.
//!
//! Mutation contract:
//! - Every edit funnels through [`Session::apply_insert`] or
//!   [`Session::apply_delete`]. Both translate all anchors (cursor, dot, mark,
//!   viewport start) uniformly: an anchor at or after an insertion point moves
//!   right by the inserted length; an anchor past a deleted range moves left by
//!   its length; an anchor inside collapses onto the range start.
//! - The undo record is pushed after the mutation so it holds the exact
//!   removed or inserted payload, and pushing it clears the redo stack.
//! - Undo and redo replay records through raw variants that translate anchors
//!   the same way but never record.
//!
//! Grouping: consecutive edits share a sequence id until a block boundary.
//! Compound commands (everything in [`commands`]) close their block when they
//! finish; typed text closes it on whitespace when configured to.
//!
//! Telemetry: edits trace under `state.edit`, undo bookkeeping under
//! `state.undo`. Events carry offsets and lengths, never document content.

use core_config::Config;
use core_text::{Buffer, Position, span};
use tracing::{debug, trace};

pub mod commands;
pub mod dot;
pub mod undo;

pub use dot::Dot;
pub use undo::{UndoLog, UndoRecord};

#[derive(Debug, Clone)]
pub struct Session {
    buffer: Buffer,
    cursor: Position,
    dot: Dot,
    mark: Position,
    viewport_start: usize,
    undo: UndoLog,
    clip: Option<Vec<u8>>,
    config: Config,
    modified: bool,
}

impl Session {
    pub fn new(buffer: Buffer, config: Config) -> Self {
        Self::with_undo(buffer, config, UndoLog::new())
    }

    /// Session without undo history, for prompt and scratch buffers.
    pub fn scratch(buffer: Buffer, config: Config) -> Self {
        Self::with_undo(buffer, config, UndoLog::disabled())
    }

    fn with_undo(buffer: Buffer, config: Config, undo: UndoLog) -> Self {
        Self {
            buffer,
            cursor: Position::default(),
            dot: Dot::default(),
            mark: Position::default(),
            viewport_start: 0,
            undo,
            clip: None,
            config,
            modified: false,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }
    /// Current document bytes, for persistence.
    pub fn bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }
    pub fn len(&self) -> usize {
        self.buffer.len()
    }
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn cursor(&self) -> Position {
        self.cursor
    }
    pub fn mark(&self) -> Position {
        self.mark
    }
    pub fn dot(&self) -> Dot {
        self.dot
    }
    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }
    pub fn modified(&self) -> bool {
        self.modified
    }
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }
    pub fn viewport_start(&self) -> usize {
        self.viewport_start
    }
    pub fn set_viewport_start(&mut self, off: usize) {
        self.viewport_start = off.min(self.buffer.len());
    }

    fn tab_stop(&self) -> usize {
        self.config.tab_stop()
    }

    /// Replace the dot; endpoints are reordered and clamped to the document.
    pub fn set_dot(&mut self, dot: Dot) {
        let dot = Dot::new(dot.start, dot.end).clamp(self.buffer.len());
        self.dot = dot;
    }

    /// Set the dot a command leaves behind and stamp it on the command's
    /// newest undo record, so redo lands on the same selection.
    pub fn commit_dot(&mut self, dot: Dot) {
        self.set_dot(dot);
        self.undo.seal_dot(self.dot);
    }

    pub fn begin_undo_block(&mut self) {
        self.undo.begin_block();
    }

    pub fn end_undo_block(&mut self) {
        self.undo.end_block();
    }

    /// Splice `bytes` at `pos` and record the edit. `pos` must not exceed the length.
    pub fn apply_insert(&mut self, pos: usize, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let dot_before = self.dot;
        self.raw_insert(pos, bytes);
        self.undo.record(dot_before, self.dot, pos, bytes, true);
    }

    /// Remove `[start, end)` (clamped to the document), record the edit, and
    /// return the removed bytes.
    pub fn apply_delete(&mut self, start: usize, end: usize) -> Vec<u8> {
        debug_assert!(start <= end, "inverted delete range {start}..{end}");
        let dot_before = self.dot;
        let end = end.min(self.buffer.len());
        let start = start.min(end);
        let removed = self.raw_delete(start, end);
        self.undo.record(dot_before, self.dot, start, &removed, false);
        removed
    }

    fn raw_insert(&mut self, pos: usize, bytes: &[u8]) {
        assert!(
            pos <= self.buffer.len(),
            "insert at {pos} beyond document length {}",
            self.buffer.len()
        );
        self.buffer.insert(pos, bytes);
        let ts = self.tab_stop();
        let doc = self.buffer.as_bytes();
        self.cursor.shift_for_insert(doc, pos, bytes, ts);
        self.mark.shift_for_insert(doc, pos, bytes, ts);
        self.dot = self.dot.translate_insert(pos, bytes.len());
        if self.viewport_start >= pos {
            self.viewport_start += bytes.len();
        }
        self.modified = true;
        trace!(target: "state.edit", pos, len = bytes.len(), doc_len = doc.len(), "insert");
    }

    fn raw_delete(&mut self, start: usize, end: usize) -> Vec<u8> {
        if start >= end {
            return Vec::new();
        }
        let removed = self.buffer.delete(start, end);
        let ts = self.tab_stop();
        let doc = self.buffer.as_bytes();
        self.cursor.shift_for_delete(doc, start, &removed, ts);
        self.mark.shift_for_delete(doc, start, &removed, ts);
        self.dot = self.dot.translate_delete(start, end);
        if self.viewport_start >= end {
            self.viewport_start -= removed.len();
        } else if self.viewport_start >= start {
            self.viewport_start = start;
        }
        self.modified = true;
        trace!(target: "state.edit", start, end, doc_len = doc.len(), "delete");
        removed
    }

    /// Revert the newest undo group. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let group = self.undo.take_undo_group();
        let Some(oldest) = group.last() else {
            return false;
        };
        let (dot, at) = (oldest.dot_before, oldest.offset);
        for r in &group {
            if r.is_insert {
                self.raw_delete(r.offset, r.offset + r.text.len());
            } else {
                self.raw_insert(r.offset, &r.text);
            }
        }
        let records = group.len();
        self.undo.stash_redo(group);
        debug!(target: "state.undo", records, redo_depth = self.undo.redo_depth(), "undo");
        self.set_dot(dot);
        self.goto(at);
        true
    }

    /// Reapply the most recently undone group. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let group = self.undo.take_redo_group();
        let Some(newest) = group.last() else {
            return false;
        };
        let dot = newest.dot_after;
        let at = if newest.is_insert {
            newest.offset + newest.text.len()
        } else {
            newest.offset
        };
        for r in &group {
            if r.is_insert {
                self.raw_insert(r.offset, &r.text);
            } else {
                self.raw_delete(r.offset, r.offset + r.text.len());
            }
        }
        let records = group.len();
        self.undo.stash_undo(group);
        debug!(target: "state.undo", records, undo_depth = self.undo.undo_depth(), "redo");
        self.set_dot(dot);
        self.goto(at);
        true
    }

    pub fn move_left(&mut self) {
        let ts = self.tab_stop();
        self.cursor.left(self.buffer.as_bytes(), ts);
    }
    pub fn move_right(&mut self) {
        let ts = self.tab_stop();
        self.cursor.right(self.buffer.as_bytes(), ts);
    }
    pub fn move_up(&mut self) {
        let (ts, keep) = (self.tab_stop(), self.config.keep_visual_column());
        self.cursor.up(self.buffer.as_bytes(), ts, keep);
    }
    pub fn move_down(&mut self) {
        let (ts, keep) = (self.tab_stop(), self.config.keep_visual_column());
        self.cursor.down(self.buffer.as_bytes(), ts, keep);
    }
    pub fn move_line_start(&mut self) {
        let (ts, smart) = (self.tab_stop(), self.config.smart_line_start());
        self.cursor.line_start(self.buffer.as_bytes(), ts, smart);
    }
    pub fn move_line_end(&mut self) {
        let ts = self.tab_stop();
        self.cursor.line_end(self.buffer.as_bytes(), ts);
    }
    pub fn move_doc_start(&mut self) {
        self.cursor.text_start();
    }
    pub fn move_doc_end(&mut self) {
        let ts = self.tab_stop();
        self.cursor.text_end(self.buffer.as_bytes(), ts);
    }

    /// Move the cursor to `off`; ignored when out of range.
    pub fn goto(&mut self, off: usize) {
        let ts = self.tab_stop();
        self.cursor.goto(self.buffer.as_bytes(), off, ts);
    }

    /// Move the cursor to the start of one-based line `n`.
    pub fn goto_line(&mut self, n: usize) {
        self.cursor.goto_line(self.buffer.as_bytes(), n);
    }

    pub fn leave_mark(&mut self) {
        self.mark = self.cursor;
    }

    pub fn goto_mark(&mut self) {
        self.cursor = self.mark;
    }

    /// Line range touched by the dot: start of its first line and the
    /// terminating newline (or length) of its last line. A dot ending right
    /// after a newline does not reach into the following line.
    pub fn dot_lines(&self) -> (usize, usize) {
        let doc = self.buffer.as_bytes();
        let ls = span::line_start(doc, self.dot.start);
        let last = if !self.dot.is_empty() && doc.get(self.dot.end - 1) == Some(&b'\n') {
            self.dot.end - 1
        } else {
            self.dot.end
        };
        (ls, span::line_end(doc, last))
    }
}
