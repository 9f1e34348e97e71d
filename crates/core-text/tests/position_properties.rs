//! Property tests: cached line numbers stay in step with the offset under any
//! sequence of movements, and goto agrees with a fresh scan.

use core_text::{Position, span};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Move {
    Right,
    Left,
    Up(bool),
    Down(bool),
    LineStart(bool),
    LineEnd,
    Goto(usize),
    GotoLine(usize),
}

fn moves() -> impl Strategy<Value = Move> {
    prop_oneof![
        Just(Move::Right),
        Just(Move::Left),
        any::<bool>().prop_map(Move::Up),
        any::<bool>().prop_map(Move::Down),
        any::<bool>().prop_map(Move::LineStart),
        Just(Move::LineEnd),
        any::<usize>().prop_map(Move::Goto),
        (0usize..12).prop_map(Move::GotoLine),
    ]
}

fn doc() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"ab \t\n\xC3\xA9".to_vec()), 0..60)
}

proptest! {
    #[test]
    fn line_cache_tracks_offset(
        text in doc(),
        tab_stop in 1usize..9,
        ms in prop::collection::vec(moves(), 0..40),
    ) {
        let mut p = Position::default();
        for m in &ms {
            match *m {
                Move::Right => p.right(&text, tab_stop),
                Move::Left => p.left(&text, tab_stop),
                Move::Up(keep) => p.up(&text, tab_stop, keep),
                Move::Down(keep) => p.down(&text, tab_stop, keep),
                Move::LineStart(smart) => p.line_start(&text, tab_stop, smart),
                Move::LineEnd => p.line_end(&text, tab_stop),
                Move::Goto(off) => p.goto(&text, off % (text.len() + 1), tab_stop),
                Move::GotoLine(n) => p.goto_line(&text, n),
            }
            prop_assert!(p.off <= text.len());
            prop_assert_eq!(p.line, span::count_newlines(&text[..p.off]));
        }
    }

    #[test]
    fn goto_matches_fresh_position(
        text in doc(),
        tab_stop in 1usize..9,
        from in any::<usize>(),
        to in any::<usize>(),
    ) {
        let len = text.len() + 1;
        let mut p = Position::at(&text, from % len, tab_stop);
        p.goto(&text, to % len, tab_stop);
        prop_assert_eq!(p, Position::at(&text, to % len, tab_stop));
    }
}
