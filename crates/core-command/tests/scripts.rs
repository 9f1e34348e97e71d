use core_command::{CommandError, run};
use core_config::Config;
use core_state::{Dot, Session};
use core_text::Buffer;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn session(text: &str) -> Session {
    Session::new(Buffer::from_text("t", text), Config::default())
}

fn text(s: &Session) -> String {
    String::from_utf8_lossy(s.bytes()).into_owned()
}

#[test]
fn rename_identifier_everywhere() {
    let mut s = session("let foo = 1;\nfoo += foo;\nprintln!(\"{foo}\");\n");
    run(&mut s, ",x/\\bfoo\\b/c/count/").unwrap();
    assert_eq!(
        text(&s),
        "let count = 1;\ncount += count;\nprintln!(\"{count}\");\n"
    );
}

#[test]
fn nested_loops_touch_only_guarded_lines() {
    let mut s = session("a=1\nb=2\na=3\n");
    run(&mut s, ",x/.*\\n/g/^a/x/[0-9]/c/N/").unwrap();
    assert_eq!(text(&s), "a=N\nb=2\na=N\n");
}

#[test]
fn command_list_runs_in_sequence_on_the_dot() {
    let mut s = session("middle\n");
    run(&mut s, "1 i/<</ a/>>/").unwrap();
    // `a` appends after the dot left by `i`, which is the inserted text.
    assert_eq!(text(&s), "<<>>middle\n");
    assert_eq!(s.dot(), Dot::new(2, 4));
}

#[test]
fn chained_ranges_with_patterns() {
    let mut s = session("header\nbegin\nx\ny\nend\nfooter\n");
    run(&mut s, "/begin/,/end/d").unwrap();
    assert_eq!(text(&s), "header\n\nfooter\n");
}

#[test]
fn pattern_address_after_a_previous_script_searches_from_cursor() {
    let mut s = session("a x\nb x\n");
    run(&mut s, ",x/b/c/B/").unwrap();
    assert_eq!(s.dot(), Dot::new(4, 5));
    run(&mut s, "/x/c/X/").unwrap();
    assert_eq!(text(&s), "a X\nB x\n");
}

#[test]
fn pattern_address_with_whole_document_dot() {
    let mut s = session("one\ntwo\nthree\n");
    s.set_dot(Dot::new(0, s.len()));
    run(&mut s, "/two/,/three/c/2-3/").unwrap();
    assert_eq!(text(&s), "one\n2-3\n");
}

#[test]
fn delete_trailing_whitespace() {
    let mut s = session("a  \nb\t\nc\n");
    run(&mut s, ",x/[ \\t]+$/d").unwrap();
    assert_eq!(text(&s), "a\nb\nc\n");
}

#[test]
fn escaped_slash_in_text() {
    let mut s = session("path");
    run(&mut s, ",i/\\/usr\\//").unwrap();
    assert_eq!(text(&s), "/usr/path");
}

#[test]
fn errors_leave_the_session_untouched() {
    let mut s = session("abc\n");
    let dot = s.dot();
    assert!(matches!(run(&mut s, "x/(/d"), Err(CommandError::Regex { .. })));
    assert!(matches!(run(&mut s, ",,d"), Err(CommandError::Syntax { pos: 1, .. })));
    assert!(matches!(run(&mut s, "/nope/d"), Err(CommandError::NoMatch { .. })));
    assert!(matches!(
        run(&mut s, "#3,#1d"),
        Err(CommandError::OutOfOrder { start: 3, end: 1 })
    ));
    assert_eq!(text(&s), "abc\n");
    assert_eq!(s.dot(), dot);
    assert_eq!(s.undo_log().undo_depth(), 0);
}

#[test]
fn each_script_is_one_undo_step() {
    let mut s = session("one two three");
    run(&mut s, ",x/o/d").unwrap();
    run(&mut s, ",x/e/c/E/").unwrap();
    assert_eq!(text(&s), "nE tw thrEE");
    assert!(s.undo());
    assert_eq!(text(&s), "ne tw three");
    assert!(s.undo());
    assert_eq!(text(&s), "one two three");
    assert!(!s.undo());
}

proptest! {
    #[test]
    fn extract_append_inserts_after_every_match(
        doc in "[ab\\n]{0,30}",
        suffix in "[XY]{1,3}",
    ) {
        let mut s = session(&doc);
        run(&mut s, &format!(",x/a/a/{suffix}/")).unwrap();
        let expected = doc.replace('a', &format!("a{suffix}"));
        prop_assert_eq!(text(&s), expected);
    }

    #[test]
    fn extract_delete_removes_every_match(doc in "[ab\\n]{0,30}") {
        let mut s = session(&doc);
        run(&mut s, ",x/b+/d").unwrap();
        prop_assert_eq!(text(&s), doc.replace('b', ""));
        prop_assert!(s.undo() || !doc.contains('b'));
        prop_assert_eq!(text(&s), doc);
    }
}
