//! Interpreter: resolve the script's address, then thread `(dot, net_offset)`
//! through its commands.
//!
//! Address resolution only reads the session. Every command reports the net
//! number of bytes it inserted (negative when it removed) so `x` can shift the
//! coordinates of later matches past the edits made for earlier ones. The
//! whole script runs inside one undo block.

use crate::error::CommandError;
use crate::parser::{Address, AddressKind, Command, Pattern, Script, parse};
use core_state::{Dot, Session};
use core_text::span;
use tracing::{debug, trace};

/// Offset of the start of one-based line `n`, or `None` past the last line.
fn line_offset(doc: &[u8], n: usize) -> Option<usize> {
    let mut off = 0;
    for _ in 1..n {
        let le = span::line_end(doc, off);
        if le >= doc.len() {
            return None;
        }
        off = le + 1;
    }
    Some(off)
}

fn resolve_side(session: &Session, kind: &AddressKind, search_from: usize) -> Result<Dot, CommandError> {
    let doc = session.bytes();
    let len = doc.len();
    let dot = match kind {
        AddressKind::Start => Dot::point(0),
        AddressKind::End => Dot::point(len),
        AddressKind::Dot => session.dot(),
        AddressKind::Byte(n) => Dot::point((*n).min(len)),
        AddressKind::Line(n) => match line_offset(doc, *n) {
            Some(ls) => Dot::new(ls, (span::line_end(doc, ls) + 1).min(len)),
            None => Dot::point(len),
        },
        AddressKind::Pattern(p) => find_pattern(doc, p, search_from)?,
    };
    Ok(dot)
}

fn find_pattern(doc: &[u8], p: &Pattern, from: usize) -> Result<Dot, CommandError> {
    let no_match = || CommandError::NoMatch {
        pattern: p.source().to_string(),
    };
    if p.source().is_empty() || from > doc.len() {
        return Err(no_match());
    }
    p.regex()
        .find_at(doc, from)
        .map(|m| Dot::new(m.start(), m.end()))
        .ok_or_else(no_match)
}

/// Resolve an address against the session without modifying it. Patterns
/// search forward from the cursor, independent of the dot; the right side of
/// a `through` pair searches from the end of the left side.
pub fn resolve(session: &Session, addr: &Address) -> Result<Dot, CommandError> {
    let left = resolve_side(session, &addr.kind, session.cursor().off)?;
    let Some(right) = &addr.through else {
        return Ok(left);
    };
    let right = resolve_side(session, &right.kind, left.end)?;
    if left.start > right.end {
        return Err(CommandError::OutOfOrder {
            start: left.start,
            end: right.end,
        });
    }
    Ok(Dot::new(left.start, right.end))
}

fn shift(p: usize, by: isize) -> usize {
    p.saturating_add_signed(by)
}

fn run_body(session: &mut Session, body: &Option<Box<Command>>, dot: Dot) -> (Dot, isize) {
    match body {
        Some(cmd) => exec_command(session, cmd, dot),
        None => (dot, 0),
    }
}

fn exec_command(session: &mut Session, cmd: &Command, dot: Dot) -> (Dot, isize) {
    trace!(target: "command.exec", start = dot.start, end = dot.end, "exec_command");
    match cmd {
        Command::Delete => {
            let removed = session.apply_delete(dot.start, dot.end);
            (Dot::point(dot.start), -(removed.len() as isize))
        }
        Command::Append(text) => {
            session.apply_insert(dot.end, text.as_bytes());
            (Dot::new(dot.end, dot.end + text.len()), text.len() as isize)
        }
        Command::Insert(text) => {
            session.apply_insert(dot.start, text.as_bytes());
            (Dot::new(dot.start, dot.start + text.len()), text.len() as isize)
        }
        Command::Change(text) => {
            let removed = session.apply_delete(dot.start, dot.end);
            session.apply_insert(dot.start, text.as_bytes());
            (
                Dot::new(dot.start, dot.start + text.len()),
                text.len() as isize - removed.len() as isize,
            )
        }
        Command::Extract { pattern, body } => {
            let matches: Vec<(usize, usize)> = pattern
                .regex()
                .find_iter(session.buffer().slice(dot.start, dot.end))
                .map(|m| (dot.start + m.start(), dot.start + m.end()))
                .collect();
            debug!(target: "command.exec", pattern = pattern.source(), matches = matches.len(), "extract");
            let mut current = dot;
            let mut offset = 0isize;
            for (start, end) in matches {
                let m = Dot::new(shift(start, offset), shift(end, offset));
                let (next, delta) = run_body(session, body, m);
                current = next;
                offset += delta;
            }
            (current, offset)
        }
        Command::Guard { pattern, body } => {
            if pattern.regex().is_match(session.buffer().slice(dot.start, dot.end)) {
                run_body(session, body, dot)
            } else {
                (dot, 0)
            }
        }
        Command::Exclude { pattern, body } => {
            if pattern.regex().is_match(session.buffer().slice(dot.start, dot.end)) {
                (dot, 0)
            } else {
                run_body(session, body, dot)
            }
        }
    }
}

/// Run a parsed script. The range is the resolved address, or the session's
/// dot when the script has none. The final dot is left on the session and
/// returned.
pub fn execute(session: &mut Session, script: &Script) -> Result<Dot, CommandError> {
    let range = match &script.address {
        Some(addr) => resolve(session, addr)?,
        None => session.dot(),
    };
    session.begin_undo_block();
    let mut dot = range;
    let mut net = 0isize;
    for cmd in &script.commands {
        let (next, delta) = exec_command(session, cmd, dot);
        dot = next;
        net += delta;
    }
    session.commit_dot(dot);
    session.end_undo_block();
    debug!(
        target: "command.exec",
        commands = script.commands.len(),
        net,
        start = dot.start,
        end = dot.end,
        "executed"
    );
    Ok(session.dot())
}

/// Parse and execute `src` against the session.
pub fn run(session: &mut Session, src: &str) -> Result<Dot, CommandError> {
    let script = parse(src)?;
    execute(session, &script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::Config;
    use core_text::Buffer;

    const DOC: &str = "abc\ndef\nghi\n";

    fn session(text: &str) -> Session {
        Session::new(Buffer::from_text("t", text), Config::default())
    }

    fn addr(s: &Session, src: &str) -> Result<Dot, CommandError> {
        let script = parse(src).unwrap();
        resolve(s, script.address.as_ref().unwrap())
    }

    #[test]
    fn resolves_line_pattern_and_whole_document() {
        let s = session(DOC);
        assert_eq!(addr(&s, "2").unwrap(), Dot::new(4, 8));
        assert_eq!(addr(&s, "/def/").unwrap(), Dot::new(4, 7));
        assert_eq!(addr(&s, "0,$").unwrap(), Dot::new(0, DOC.len()));
        assert_eq!(addr(&s, ",").unwrap(), Dot::new(0, DOC.len()));
        assert_eq!(s.bytes(), DOC.as_bytes());
    }

    #[test]
    fn resolves_edges() {
        let mut s = session("abc\ndef");
        assert_eq!(addr(&s, "2").unwrap(), Dot::new(4, 7));
        assert_eq!(addr(&s, "9").unwrap(), Dot::point(7));
        assert_eq!(addr(&s, "#100").unwrap(), Dot::point(7));
        assert_eq!(addr(&s, "#2,#5").unwrap(), Dot::new(2, 5));
        assert_eq!(addr(&s, "1,2").unwrap(), Dot::new(0, 7));
        s.set_dot(Dot::new(1, 2));
        assert_eq!(addr(&s, ".").unwrap(), Dot::new(1, 2));
        assert_eq!(addr(&s, ".,$").unwrap(), Dot::new(1, 7));
    }

    #[test]
    fn pattern_searches_from_cursor_without_wrapping() {
        let mut s = session("foo bar foo");
        s.goto(1);
        assert_eq!(addr(&s, "/foo/").unwrap(), Dot::new(8, 11));
        s.goto(9);
        assert!(matches!(addr(&s, "/foo/"), Err(CommandError::NoMatch { .. })));
        assert!(matches!(addr(&s, "//"), Err(CommandError::NoMatch { .. })));
        s.goto(0);
        assert_eq!(addr(&s, "/foo/,/foo/").unwrap(), Dot::new(0, 11));
    }

    #[test]
    fn pattern_ignores_a_dot_covering_the_document() {
        let mut s = session("foo\nbar\nbaz\n");
        s.set_dot(Dot::new(0, s.len()));
        assert_eq!(addr(&s, "/bar/").unwrap(), Dot::new(4, 7));
        assert_eq!(addr(&s, "/bar/,/baz/").unwrap(), Dot::new(4, 11));
        run(&mut s, "/bar/d").unwrap();
        assert_eq!(s.bytes(), b"foo\n\nbaz\n");
    }

    #[test]
    fn out_of_order_range_is_rejected() {
        let s = session(DOC);
        assert!(matches!(
            addr(&s, "3,1"),
            Err(CommandError::OutOfOrder { start: 8, end: 4 })
        ));
    }

    #[test]
    fn delete_removes_exactly_the_dot() {
        let mut s = session(DOC);
        s.set_dot(Dot::new(4, 7));
        let dot = run(&mut s, "d").unwrap();
        assert_eq!(s.bytes(), b"abc\n\nghi\n");
        assert_eq!(dot, Dot::point(4));
    }

    #[test]
    fn delete_addressed_line() {
        let mut s = session(DOC);
        let dot = run(&mut s, "2d").unwrap();
        assert_eq!(s.bytes(), b"abc\nghi\n");
        assert_eq!(dot, Dot::point(4));
    }

    #[test]
    fn append_insert_change_retarget_dot() {
        let mut s = session(DOC);
        assert_eq!(run(&mut s, "2a/X/").unwrap(), Dot::new(8, 9));
        assert_eq!(s.bytes(), b"abc\ndef\nXghi\n");
        assert_eq!(run(&mut s, "1i/Y/").unwrap(), Dot::new(0, 1));
        assert_eq!(s.bytes(), b"Yabc\ndef\nXghi\n");
        assert_eq!(run(&mut s, "/def/c/DEFG/").unwrap(), Dot::new(5, 9));
        assert_eq!(s.bytes(), b"Yabc\nDEFG\nXghi\n");
    }

    #[test]
    fn extract_reanchors_later_matches() {
        let mut s = session("foo boo");
        let dot = run(&mut s, ",x/o/a/OO/").unwrap();
        assert_eq!(s.bytes(), b"foOOoOO boOOoOO");
        assert_eq!(dot, Dot::new(13, 15));
    }

    #[test]
    fn extract_then_delete_shrinks() {
        let mut s = session("a1b22c333");
        run(&mut s, ",x/[0-9]+/d").unwrap();
        assert_eq!(s.bytes(), b"abc");
    }

    #[test]
    fn extract_change_on_lines() {
        let mut s = session("one\ntwo\nthree\n");
        run(&mut s, ",x/^t.*$/c/T/").unwrap();
        assert_eq!(s.bytes(), b"one\nT\nT\n");
    }

    #[test]
    fn guard_and_exclude() {
        let mut s = session("keep\ndrop\nkeep\n");
        run(&mut s, ",x/.*\\n/g/drop/d").unwrap();
        assert_eq!(s.bytes(), b"keep\nkeep\n");
        let mut s = session("keep\ndrop\nkeep\n");
        run(&mut s, ",x/.*\\n/v/keep/d").unwrap();
        assert_eq!(s.bytes(), b"keep\nkeep\n");
    }

    #[test]
    fn bodiless_extract_selects_last_match() {
        let mut s = session("a1b2");
        let dot = run(&mut s, ",x/[0-9]/").unwrap();
        assert_eq!(dot, Dot::new(3, 4));
        assert!(!s.modified());
    }

    #[test]
    fn address_only_script_selects() {
        let mut s = session(DOC);
        assert_eq!(run(&mut s, "3").unwrap(), Dot::new(8, 12));
        assert_eq!(s.dot(), Dot::new(8, 12));
        assert!(!s.modified());
    }

    #[test]
    fn script_is_one_undo_step() {
        let mut s = session("foo boo");
        run(&mut s, ",x/o/c/0/").unwrap();
        run(&mut s, "0i/>/").unwrap();
        assert_eq!(s.bytes(), b">f00 b00");
        assert!(s.undo());
        assert_eq!(s.bytes(), b"f00 b00");
        assert!(s.undo());
        assert_eq!(s.bytes(), b"foo boo");
        assert!(s.redo());
        assert_eq!(s.bytes(), b"f00 b00");
        assert_eq!(s.dot(), Dot::new(6, 7));
    }

    #[test]
    fn resolution_error_leaves_document_untouched() {
        let mut s = session(DOC);
        assert!(run(&mut s, "/zzz/d").is_err());
        assert_eq!(s.bytes(), DOC.as_bytes());
        assert!(!s.modified());
    }
}
