mod common;

use common::{session_at, type_str};
use linedit_core::{Direction, EditSession, Position};
use pretty_assertions::assert_eq;

fn undo_texts(session: &mut EditSession) -> Vec<String> {
    let mut out = vec![session.text()];
    while session.undo().unwrap() {
        out.push(session.text());
    }
    out
}

#[test]
fn test_each_boundary_character_is_its_own_step() {
    let mut session = EditSession::new("");
    type_str(&mut session, "a.b(c)");
    assert_eq!(
        undo_texts(&mut session),
        ["a.b(c)", "a.b(c", "a.b(", "a.b", "a.", "a", ""]
    );
}

#[test]
fn test_boundary_without_pending_run_starts_a_run() {
    let mut session = EditSession::new("");
    type_str(&mut session, "x  y");
    // 'x' then ' ' are committed; the second space has no run to end and starts one with 'y'.
    assert_eq!(undo_texts(&mut session), ["x  y", "x ", "x", ""]);
}

#[test]
fn test_typing_run_lands_cursor_at_run_start() {
    let mut session = session_at("fn ()", 0, 3);
    type_str(&mut session, "main");
    assert_eq!(session.text(), "fn main()");
    session.undo().unwrap();
    assert_eq!(session.text(), "fn ()");
    assert_eq!(session.cursor(), Position::new(0, 3));
}

#[test]
fn test_structural_edits_flush_pending_run() {
    let mut session = EditSession::new("");
    type_str(&mut session, "abc");
    session.enter().unwrap();
    type_str(&mut session, "def");
    session.backspace(false).unwrap();
    assert_eq!(session.text(), "abc\nde");
    assert_eq!(undo_texts(&mut session), ["abc\nde", "abc\ndef", "abc\n", "abc", ""]);
}

#[test]
fn test_focus_loss_commits_run() {
    let mut session = EditSession::new("");
    type_str(&mut session, "ab");
    assert!(session.flush_typing());
    assert!(!session.flush_typing());
    type_str(&mut session, "cd");
    assert_eq!(undo_texts(&mut session), ["abcd", "ab", ""]);
}

#[test]
fn test_cursor_move_splits_runs() {
    let mut session = EditSession::new("");
    type_str(&mut session, "ab");
    session.move_cursor(Direction::LineStart, false);
    type_str(&mut session, "xy");
    assert_eq!(undo_texts(&mut session), ["xyab", "ab", ""]);
}

#[test]
fn test_multi_char_insert_char_coalesces_like_keystrokes() {
    let mut session = EditSession::new("");
    session.insert_char("one two").unwrap();
    assert_eq!(undo_texts(&mut session), ["one two", "one ", "one", ""]);
}

#[test]
fn test_insert_char_with_newline_is_a_block() {
    let mut session = EditSession::new("");
    session.insert_char("a\nb").unwrap();
    assert_eq!(session.lines(), ["a", "b"]);
    assert_eq!(undo_texts(&mut session), ["a\nb", ""]);
}
