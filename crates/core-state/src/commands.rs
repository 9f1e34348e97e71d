//! Dot-relative editing commands, the clipboard, and keyboard-level edits.
//!
//! Each command here is a compound action: it may issue several primitive
//! edits, sets the dot it leaves behind through [`Session::commit_dot`], and
//! runs in its own undo block so one undo reverts the whole command. Typed text is
//! the exception; it keeps the block open so a run of characters undoes as
//! one unit.

use crate::{Dot, Session};
use core_text::{rune, span};
use tracing::debug;

const BRACKET_PAIRS: [(&str, &str); 3] = [("(", ")"), ("[", "]"), ("{", "}")];

impl Session {
    /// Open the command's undo block so earlier typing stays a separate group.
    fn start(&mut self) {
        self.begin_undo_block();
    }

    fn finish(&mut self, dot: Dot) {
        self.commit_dot(dot);
        self.end_undo_block();
    }

    /// Insert after the dot; the dot becomes the inserted text.
    pub fn insert_after_dot(&mut self, text: &[u8]) {
        self.start();
        let at = self.dot().end;
        self.apply_insert(at, text);
        self.finish(Dot::new(at, at + text.len()));
    }

    /// Insert before the dot; the dot becomes the inserted text.
    pub fn insert_before_dot(&mut self, text: &[u8]) {
        self.start();
        let at = self.dot().start;
        self.apply_insert(at, text);
        self.finish(Dot::new(at, at + text.len()));
    }

    /// Replace the dot's content; returns what was replaced.
    pub fn replace_dot(&mut self, text: &[u8]) -> Vec<u8> {
        self.start();
        let dot = self.dot();
        let removed = self.apply_delete(dot.start, dot.end);
        self.apply_insert(dot.start, text);
        self.finish(Dot::new(dot.start, dot.start + text.len()));
        removed
    }

    pub fn delete_dot(&mut self) -> Vec<u8> {
        self.start();
        let dot = self.dot();
        let removed = self.apply_delete(dot.start, dot.end);
        self.finish(Dot::point(dot.start));
        removed
    }

    /// Copy the lines touched by the dot below them and move the dot onto the copy.
    pub fn duplicate_dot_below(&mut self) {
        self.start();
        let dot = self.dot();
        let (ls, le) = self.dot_lines();
        let mut block = Vec::with_capacity(le - ls + 1);
        block.push(b'\n');
        block.extend_from_slice(self.buffer().slice(ls, le));
        self.apply_insert(le, &block);
        let shift = block.len();
        self.finish(Dot::new(dot.start + shift, dot.end + shift));
    }

    /// Copy the lines touched by the dot above them and move the dot onto the copy.
    pub fn duplicate_dot_above(&mut self) {
        self.start();
        let dot = self.dot();
        let (ls, le) = self.dot_lines();
        let mut block = self.buffer().slice(ls, le).to_vec();
        block.push(b'\n');
        self.apply_insert(ls, &block);
        self.finish(dot);
    }

    fn new_line_indent(&self, off: usize) -> Vec<u8> {
        if self.config().keep_indent() {
            span::line_indent_text(self.bytes(), off)
        } else {
            Vec::new()
        }
    }

    /// Open an empty line after the dot's last line. The dot stays put; the
    /// cursor moves onto the new line.
    pub fn open_line_below(&mut self) {
        self.start();
        let dot = self.dot();
        let (_, le) = self.dot_lines();
        let mut text = vec![b'\n'];
        text.extend(self.new_line_indent(le));
        self.apply_insert(le, &text);
        self.goto(le + text.len());
        self.finish(dot);
    }

    /// Open an empty line before the dot's first line. The dot shifts with
    /// its text; the cursor moves onto the new line.
    pub fn open_line_above(&mut self) {
        self.start();
        let (ls, _) = self.dot_lines();
        let mut text = self.new_line_indent(ls);
        let indent = text.len();
        text.push(b'\n');
        self.apply_insert(ls, &text);
        self.goto(ls + indent);
        let dot = self.dot();
        self.finish(dot);
    }

    /// Select the next word after the dot. With `expand` only the dot's end
    /// moves. An empty dot inside a word selects that whole word.
    pub fn select_next_word(&mut self, expand: bool) {
        let dot = self.dot();
        let doc = self.bytes();
        let Some((mut start, end)) = span::next_word(doc, dot.end) else {
            return;
        };
        if dot.is_empty() {
            start = span::word_start(doc, start);
        }
        let next = if expand { Dot::new(dot.start, end) } else { Dot::new(start, end) };
        self.set_dot(next);
        self.goto(next.end);
    }

    /// Select the previous word before the dot. With `expand` only the dot's
    /// start moves.
    pub fn select_prev_word(&mut self, expand: bool) {
        let dot = self.dot();
        let doc = self.bytes();
        let Some((start, mut end)) = span::prev_word(doc, dot.start) else {
            return;
        };
        if dot.is_empty() {
            end = span::word_end(doc, end);
        }
        let next = if expand { Dot::new(start, dot.end) } else { Dot::new(start, end) };
        self.set_dot(next);
        self.goto(next.start);
    }

    fn line_range(&self, off: usize) -> (usize, usize) {
        let doc = self.bytes();
        let ls = span::line_start(doc, off);
        let le = span::line_end(doc, off);
        (ls, (le + 1).min(doc.len()))
    }

    /// Select the line after the dot (the current line when the dot is empty),
    /// newline included.
    pub fn select_next_line(&mut self, expand: bool) {
        let dot = self.dot();
        let doc = self.bytes();
        let from = if dot.is_empty() {
            dot.start
        } else if dot.end == span::line_start(doc, dot.end) {
            dot.end
        } else {
            span::line_end(doc, dot.end) + 1
        };
        if !dot.is_empty() && from >= doc.len() {
            return;
        }
        let (ls, le) = self.line_range(from);
        let next = if expand { Dot::new(dot.start, le) } else { Dot::new(ls, le) };
        self.set_dot(next);
        self.goto(next.end);
    }

    /// Select the line before the dot (the current line when the dot is
    /// empty), newline included.
    pub fn select_prev_line(&mut self, expand: bool) {
        let dot = self.dot();
        let doc = self.bytes();
        let from = if !dot.is_empty() && dot.start > 0 && dot.start == span::line_start(doc, dot.start)
        {
            dot.start - 1
        } else {
            dot.start
        };
        let (ls, le) = self.line_range(from);
        let next = if expand { Dot::new(ls, dot.end) } else { Dot::new(ls, le) };
        self.set_dot(next);
        self.goto(next.start);
    }

    /// The current line including its newline, if any.
    pub fn copy_line(&self) -> Vec<u8> {
        let (ls, le) = self.line_range(self.cursor().off);
        self.buffer().slice(ls, le).to_vec()
    }

    pub fn clipboard(&self) -> Option<&[u8]> {
        self.clip.as_deref()
    }

    /// Copy the dot, or the whole current line when the dot is empty.
    pub fn clip_copy(&mut self) {
        let dot = self.dot();
        let text = if dot.is_empty() {
            self.copy_line()
        } else {
            self.buffer().slice(dot.start, dot.end).to_vec()
        };
        debug!(target: "state.edit", len = text.len(), "clip_copy");
        self.clip = Some(text);
    }

    /// Cut the dot, or the whole current line when the dot is empty.
    pub fn clip_cut(&mut self) {
        let text = if self.dot().is_empty() {
            self.start();
            let text = self.delete_line(true);
            let off = self.cursor().off;
            self.finish(Dot::point(off));
            text
        } else {
            self.delete_dot()
        };
        debug!(target: "state.edit", len = text.len(), "clip_cut");
        self.clip = Some(text);
    }

    /// Insert the clipboard at the cursor; the dot becomes the pasted text.
    pub fn clip_paste(&mut self) {
        let Some(text) = self.clip.clone() else {
            return;
        };
        self.start();
        let at = self.cursor().off;
        self.apply_insert(at, &text);
        self.finish(Dot::new(at, at + text.len()));
    }

    /// Replace the dot with the clipboard; the replaced text becomes the new
    /// clipboard content.
    pub fn clip_paste_replace(&mut self) {
        let Some(text) = self.clip.clone() else {
            return;
        };
        let removed = self.replace_dot(&text);
        self.clip = Some(removed);
    }

    /// Keyboard input at the cursor. A leading `\r` becomes `\n`; text that
    /// does not start with a printable character, newline, or tab is
    /// rejected. Whitespace closes the undo block when configured to.
    pub fn type_text(&mut self, text: &[u8]) -> bool {
        let mut text = text.to_vec();
        match text.first_mut() {
            None => return false,
            Some(b) if *b == b'\r' => *b = b'\n',
            Some(_) => {}
        }
        let (ch, _) = rune::decode(&text);
        let accepted = match ch {
            Some('\n' | '\t') => true,
            Some(c) => !c.is_control(),
            None => false,
        };
        if !accepted {
            return false;
        }
        let at = self.cursor().off;
        self.apply_insert(at, &text);
        if self.config().undo_break_on_whitespace() && ch.is_some_and(char::is_whitespace) {
            self.end_undo_block();
        }
        true
    }

    /// Break the line at the cursor, copying the current indentation when
    /// configured to.
    pub fn insert_newline(&mut self) {
        let at = self.cursor().off;
        let mut text = vec![b'\n'];
        text.extend(self.new_line_indent(at));
        self.apply_insert(at, &text);
        if self.config().undo_break_on_whitespace() {
            self.end_undo_block();
        }
    }

    /// Delete the code point under the cursor.
    pub fn delete_char(&mut self) {
        let at = self.cursor().off;
        let n = rune::len_at(self.bytes(), at);
        if n > 0 {
            self.apply_delete(at, at + n);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor().off == 0 {
            return;
        }
        self.move_left();
        self.delete_char();
    }

    pub fn delete_line_end(&mut self) -> Vec<u8> {
        let at = self.cursor().off;
        let le = span::line_end(self.bytes(), at);
        self.apply_delete(at, le)
    }

    pub fn delete_line_start(&mut self) -> Vec<u8> {
        let at = self.cursor().off;
        let ls = span::line_start(self.bytes(), at);
        self.apply_delete(ls, at)
    }

    /// Delete the current line's content, or the whole line with its newline.
    pub fn delete_line(&mut self, whole: bool) -> Vec<u8> {
        let at = self.cursor().off;
        let (ls, le_incl) = self.line_range(at);
        let le = if whole { le_incl } else { span::line_end(self.bytes(), at) };
        self.apply_delete(ls, le)
    }

    /// Delete the whole document as one undoable edit.
    pub fn clear(&mut self) {
        self.start();
        let len = self.len();
        self.apply_delete(0, len);
        self.finish(Dot::point(0));
    }

    /// Move the cursor past the next occurrence of `needle` (forward) or onto
    /// the previous one (backward). Returns whether anything was found.
    pub fn search_next(&mut self, needle: &[u8], forward: bool) -> bool {
        let at = self.cursor().off;
        let from = if forward { at } else { at.saturating_sub(1) };
        let Some(i) = span::find(self.bytes(), needle, from, forward) else {
            return false;
        };
        if forward {
            self.goto(i + needle.len());
        } else {
            self.goto(i);
        }
        true
    }

    /// Jump to the bracket paired with the one under the cursor.
    pub fn goto_matching_bracket(&mut self) -> bool {
        let at = self.cursor().off;
        for (open, close) in BRACKET_PAIRS {
            if let Some(off) = span::matching_delimiter(self.bytes(), at, open.as_bytes(), close.as_bytes()) {
                self.goto(off);
                return true;
            }
        }
        false
    }

    /// Prefix every line touched by the dot with a tab.
    pub fn indent_dot_lines(&mut self) {
        self.map_dot_lines(|s, ls| {
            s.apply_insert(ls, b"\t");
            1
        });
    }

    /// Remove one leading tab from every line touched by the dot.
    pub fn unindent_dot_lines(&mut self) {
        self.map_dot_lines(|s, ls| {
            if s.bytes().get(ls) == Some(&b'\t') {
                s.apply_delete(ls, ls + 1);
                -1
            } else {
                0
            }
        });
    }

    /// Run `edit` on the start of each line touched by the dot. `edit` reports
    /// how many bytes it added (negative when removing) so the walk can keep
    /// its bound in step. A dot starting at the first line start keeps that
    /// start.
    fn map_dot_lines(&mut self, mut edit: impl FnMut(&mut Session, usize) -> isize) {
        self.start();
        let dot = self.dot();
        let (first, last_end) = self.dot_lines();
        let mut end = last_end as isize;
        let mut ls = first;
        loop {
            end += edit(self, ls);
            let le = span::line_end(self.bytes(), ls);
            if le as isize >= end || le >= self.len() {
                break;
            }
            ls = le + 1;
        }
        let mut next = self.dot();
        if dot.start == first {
            next.start = first;
        }
        self.finish(next);
    }
}

#[cfg(test)]
mod tests {
    use crate::{Dot, Session};
    use core_config::Config;
    use core_text::Buffer;

    fn session(text: &str) -> Session {
        Session::new(Buffer::from_text("t", text), Config::default())
    }

    fn text(s: &Session) -> &str {
        std::str::from_utf8(s.bytes()).unwrap()
    }

    #[test]
    fn insert_after_and_before_retarget_dot() {
        let mut s = session("abc\ndef\n");
        s.set_dot(Dot::new(4, 7));
        s.insert_after_dot(b"!");
        assert_eq!(text(&s), "abc\ndef!\n");
        assert_eq!(s.dot(), Dot::new(7, 8));
        s.insert_before_dot(b"<");
        assert_eq!(text(&s), "abc\ndef<!\n");
        assert_eq!(s.dot(), Dot::new(7, 8));
    }

    #[test]
    fn replace_dot_is_one_undo_step() {
        let mut s = session("hello world");
        s.set_dot(Dot::new(6, 11));
        let old = s.replace_dot(b"there");
        assert_eq!(old, b"world");
        assert_eq!(text(&s), "hello there");
        assert_eq!(s.dot(), Dot::new(6, 11));
        assert!(s.undo());
        assert_eq!(text(&s), "hello world");
        assert_eq!(s.dot(), Dot::new(6, 11));
        assert!(!s.undo());
    }

    #[test]
    fn delete_dot_collapses() {
        let mut s = session("abc\ndef\nghi\n");
        s.set_dot(Dot::new(4, 7));
        assert_eq!(s.delete_dot(), b"def");
        assert_eq!(text(&s), "abc\n\nghi\n");
        assert_eq!(s.dot(), Dot::point(4));
    }

    #[test]
    fn duplicate_below_moves_dot_onto_copy() {
        let mut s = session("abc\ndef\nghi\n");
        s.set_dot(Dot::new(5, 6));
        s.duplicate_dot_below();
        assert_eq!(text(&s), "abc\ndef\ndef\nghi\n");
        assert_eq!(s.dot(), Dot::new(9, 10));
        assert_eq!(&s.bytes()[9..10], b"e");
    }

    #[test]
    fn duplicate_above_keeps_offsets_on_copy() {
        let mut s = session("abc\ndef\nghi\n");
        s.set_dot(Dot::new(4, 8));
        s.duplicate_dot_above();
        assert_eq!(text(&s), "abc\ndef\ndef\nghi\n");
        assert_eq!(s.dot(), Dot::new(4, 8));
        assert!(s.undo());
        assert_eq!(text(&s), "abc\ndef\nghi\n");
    }

    #[test]
    fn open_line_below_keeps_indent_and_dot() {
        let mut s = session("  foo\nbar");
        s.set_dot(Dot::new(2, 5));
        s.open_line_below();
        assert_eq!(text(&s), "  foo\n  \nbar");
        assert_eq!(s.dot(), Dot::new(2, 5));
        assert_eq!(s.cursor().off, 8);
        assert_eq!(s.cursor().line, 1);
    }

    #[test]
    fn open_line_above_shifts_dot() {
        let mut s = session("a\n\tb\n");
        s.set_dot(Dot::new(3, 4));
        s.open_line_above();
        assert_eq!(text(&s), "a\n\t\n\tb\n");
        assert_eq!(s.dot(), Dot::new(5, 6));
        assert_eq!(s.cursor().off, 3);
    }

    #[test]
    fn open_line_without_indent_when_disabled() {
        let cfg: Config = {
            let mut c = Config::default();
            c.file.editor.keep_indent = false;
            c
        };
        let mut s = Session::new(Buffer::from_text("t", "\tx"), cfg);
        s.open_line_below();
        assert_eq!(text(&s), "\tx\n");
    }

    #[test]
    fn word_selection_with_and_without_expand() {
        let mut s = session("one two three");
        s.goto(1);
        s.set_dot(Dot::point(1));
        s.select_next_word(false);
        assert_eq!(s.dot(), Dot::new(0, 3));
        s.select_next_word(false);
        assert_eq!(s.dot(), Dot::new(4, 7));
        s.select_next_word(true);
        assert_eq!(s.dot(), Dot::new(4, 13));
        s.select_prev_word(false);
        assert_eq!(s.dot(), Dot::new(0, 3));
        s.set_dot(Dot::new(8, 13));
        s.select_prev_word(true);
        assert_eq!(s.dot(), Dot::new(4, 13));
        assert_eq!(s.cursor().off, 4);
    }

    #[test]
    fn line_selection_walks_lines() {
        let mut s = session("abc\ndef\nghi");
        s.set_dot(Dot::point(1));
        s.select_next_line(false);
        assert_eq!(s.dot(), Dot::new(0, 4));
        s.select_next_line(false);
        assert_eq!(s.dot(), Dot::new(4, 8));
        s.select_next_line(true);
        assert_eq!(s.dot(), Dot::new(4, 11));
        s.select_next_line(true);
        assert_eq!(s.dot(), Dot::new(4, 11));
        s.select_prev_line(false);
        assert_eq!(s.dot(), Dot::new(0, 4));
        s.set_dot(Dot::new(8, 11));
        s.select_prev_line(true);
        assert_eq!(s.dot(), Dot::new(4, 11));
    }

    #[test]
    fn clipboard_falls_back_to_current_line() {
        let mut s = session("abc\ndef\n");
        s.goto(5);
        s.clip_copy();
        assert_eq!(s.clipboard(), Some(&b"def\n"[..]));
        s.clip_cut();
        assert_eq!(text(&s), "abc\n");
        s.goto(0);
        s.clip_paste();
        assert_eq!(text(&s), "def\nabc\n");
        assert_eq!(s.dot(), Dot::new(0, 4));
    }

    #[test]
    fn paste_replace_swaps_clipboard() {
        let mut s = session("left right");
        s.set_dot(Dot::new(0, 4));
        s.clip_copy();
        s.set_dot(Dot::new(5, 10));
        s.clip_paste_replace();
        assert_eq!(text(&s), "left left");
        assert_eq!(s.clipboard(), Some(&b"right"[..]));
    }

    #[test]
    fn paste_with_empty_clipboard_is_noop() {
        let mut s = session("x");
        s.clip_paste();
        assert_eq!(text(&s), "x");
        assert!(!s.modified());
    }

    #[test]
    fn typing_groups_until_whitespace() {
        let mut s = session("");
        for b in b"ab cd" {
            assert!(s.type_text(&[*b]));
        }
        assert_eq!(text(&s), "ab cd");
        assert!(s.undo());
        assert_eq!(text(&s), "ab ");
        assert!(s.undo());
        assert_eq!(text(&s), "");
    }

    #[test]
    fn commands_after_typing_undo_separately() {
        let mut s = session("");
        assert!(s.type_text(b"a"));
        assert!(s.type_text(b"b"));
        s.set_dot(Dot::new(0, 2));
        s.insert_after_dot(b"X");
        assert_eq!(text(&s), "abX");
        assert!(s.undo());
        assert_eq!(text(&s), "ab");
        assert!(s.undo());
        assert_eq!(text(&s), "");

        let mut s = session("q\n");
        assert!(s.type_text(b"z"));
        assert!(s.dot().is_empty());
        s.clip_cut();
        assert_eq!(text(&s), "");
        assert!(s.undo());
        assert_eq!(text(&s), "zq\n");

        let mut s = session("a\n");
        assert!(s.type_text(b"z"));
        s.set_dot(Dot::new(0, 1));
        s.indent_dot_lines();
        assert_eq!(text(&s), "\tza\n");
        assert!(s.undo());
        assert_eq!(text(&s), "za\n");
    }

    #[test]
    fn typing_rejects_control_and_maps_carriage_return() {
        let mut s = session("");
        assert!(!s.type_text(b"\x07"));
        assert!(!s.type_text(b""));
        assert!(s.type_text(b"\r"));
        assert_eq!(text(&s), "\n");
        assert!(s.type_text("é".as_bytes()));
        assert_eq!(s.cursor().off, 3);
    }

    #[test]
    fn newline_keeps_indent() {
        let mut s = session("\tfoo");
        s.move_line_end();
        s.insert_newline();
        assert_eq!(text(&s), "\tfoo\n\t");
        assert_eq!(s.cursor().off, 6);
    }

    #[test]
    fn char_deletion_and_backspace_step_code_points() {
        let mut s = session("aéb");
        s.goto(1);
        s.delete_char();
        assert_eq!(text(&s), "ab");
        s.goto(2);
        s.backspace();
        assert_eq!(text(&s), "a");
        s.goto(0);
        s.backspace();
        assert_eq!(text(&s), "a");
    }

    #[test]
    fn line_deletions() {
        let mut s = session("abc\ndef\nghi");
        s.goto(5);
        assert_eq!(s.delete_line_end(), b"ef");
        assert_eq!(s.delete_line_start(), b"d");
        assert_eq!(text(&s), "abc\n\nghi");
        s.goto(5);
        assert_eq!(s.delete_line(true), b"ghi");
        assert_eq!(text(&s), "abc\n\n");
        s.goto(0);
        assert_eq!(s.delete_line(false), b"abc");
        assert_eq!(text(&s), "\n\n");
    }

    #[test]
    fn clear_empties_and_undo_restores() {
        let mut s = session("some text");
        s.goto(4);
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.cursor().off, 0);
        assert!(s.undo());
        assert_eq!(text(&s), "some text");
    }

    #[test]
    fn search_moves_cursor() {
        let mut s = session("foo bar foo");
        assert!(s.search_next(b"foo", true));
        assert_eq!(s.cursor().off, 3);
        assert!(s.search_next(b"foo", true));
        assert_eq!(s.cursor().off, 11);
        assert!(!s.search_next(b"foo", true));
        assert!(s.search_next(b"foo", false));
        assert_eq!(s.cursor().off, 8);
        assert!(s.search_next(b"foo", false));
        assert_eq!(s.cursor().off, 0);
        assert!(!s.search_next(b"", true));
    }

    #[test]
    fn bracket_matching() {
        let mut s = session("f(a[1]{x})");
        s.goto(1);
        assert!(s.goto_matching_bracket());
        assert_eq!(s.cursor().off, 9);
        s.goto(6);
        assert!(s.goto_matching_bracket());
        assert_eq!(s.cursor().off, 8);
        s.goto(0);
        assert!(!s.goto_matching_bracket());
    }

    #[test]
    fn mark_round_trip() {
        let mut s = session("abc\ndef");
        s.goto(5);
        s.leave_mark();
        s.move_doc_start();
        s.apply_insert(0, b"xx");
        s.goto_mark();
        assert_eq!(s.cursor().off, 7);
    }

    #[test]
    fn indent_and_unindent_dot_lines() {
        let mut s = session("a\nb\nc\n");
        s.set_dot(Dot::new(0, 4));
        s.indent_dot_lines();
        assert_eq!(text(&s), "\ta\n\tb\nc\n");
        assert_eq!(s.dot(), Dot::new(0, 6));
        s.unindent_dot_lines();
        assert_eq!(text(&s), "a\nb\nc\n");
        assert!(s.undo());
        assert_eq!(text(&s), "\ta\n\tb\nc\n");
    }
}
