#![allow(dead_code)]

use linedit_core::{EditSession, Position};

/// Route `tracing` output through the test harness so it shows up on failure.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn session_at(text: &str, line: usize, column: usize) -> EditSession {
    init_tracing();
    let mut session = EditSession::new(text);
    session.set_cursor(Position::new(line, column));
    session
}

/// Type `text` one keystroke at a time.
pub fn type_str(session: &mut EditSession, text: &str) {
    for ch in text.chars() {
        session.insert_char(&ch.to_string()).unwrap();
    }
}

pub fn lines(session: &EditSession) -> Vec<&str> {
    session.lines().iter().map(String::as_str).collect()
}
