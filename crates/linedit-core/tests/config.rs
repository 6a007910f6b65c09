mod common;

use std::io::Write;

use common::init_tracing;
use linedit_core::{ConfigError, EditSession, EditorConfig, IndentStyle, TabKeyBehavior};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

#[test]
fn test_load_from_file() {
    init_tracing();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "tab_width = 2\ntab_key = \"tab\"\nindent = \"none\"\nmax_undo_depth = 10\nauto_highlight = false"
    )
    .unwrap();

    let config = EditorConfig::load(file.path()).unwrap();
    assert_eq!(
        config,
        EditorConfig {
            tab_width: 2,
            tab_key: TabKeyBehavior::Tab,
            indent: IndentStyle::None,
            max_undo_depth: 10,
            auto_highlight: false,
        }
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EditorConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "tab_width = \"wide\"").unwrap();
    let err = EditorConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_zero_undo_depth_is_rejected() {
    let err = EditorConfig::from_toml_str("max_undo_depth = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("max_undo_depth"));
}

#[test]
fn test_session_uses_loaded_settings() {
    let config = EditorConfig::from_toml_str("tab_width = 2\nindent = \"auto\"").unwrap();
    let mut session = EditSession::with_config("if x:", config);
    session.set_cursor(linedit_core::Position::new(0, 5));
    session.enter().unwrap();
    assert_eq!(session.lines(), ["if x:", "  "]);
    session.tab().unwrap();
    assert_eq!(session.lines(), ["if x:", "    "]);
}
