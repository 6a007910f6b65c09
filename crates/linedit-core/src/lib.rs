#![warn(missing_docs)]
//! linedit core - headless text buffer and edit-history engine
//!
//! # Overview
//!
//! `linedit-core` is the model behind a text editing widget: a document stored as a flat array
//! of lines, a cursor with an optional selection, token-aware navigation and deletion, and an
//! undo/redo log that coalesces typing into word-sized steps. Rendering, file I/O and the lexer
//! that classifies tokens for highlighting all live outside; the engine only consumes a
//! [`Tokenizer`] and a [`Clipboard`] through small traits.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditSession (commands, notifications)      │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  EditHistory         │  HighlightOverlay    │  ← Undo log / spans
//! ├──────────────────────┴──────────────────────┤
//! │  CursorSelection + token boundaries         │  ← Navigation
//! ├─────────────────────────────────────────────┤
//! │  TextBuffer (Vec of lines)                  │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use linedit_core::{Command, CursorCommand, EditCommand, EditSession, Position};
//!
//! let mut session = EditSession::new("fn main() {}");
//! session
//!     .execute(Command::Cursor(CursorCommand::MoveTo { line: 0, column: 11 }))
//!     .unwrap();
//! session.execute(Command::Edit(EditCommand::Enter)).unwrap();
//! for ch in "body".chars() {
//!     session.insert_char(&ch.to_string()).unwrap();
//! }
//!
//! assert_eq!(session.lines(), ["fn main() {", "    body}"]);
//! assert_eq!(session.cursor(), Position::new(1, 8));
//!
//! // "body" was typed as one word, so one undo removes all of it.
//! session.undo().unwrap();
//! assert_eq!(session.lines(), ["fn main() {", "    }"]);
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - line storage and multi-line splicing
//! - [`token`] - character classes and token boundaries
//! - [`cursor`] - cursor movement and selection editing
//! - [`history`] - undo/redo actions with typing coalescing
//! - [`highlight`] - tokenizer contract and per-line span overlay
//! - [`indent`] - Enter/Backspace indentation policies
//! - [`clipboard`] - clipboard contract
//! - [`config`] - TOML configuration
//! - [`commands`] - `EditSession` and the command enums
//! - [`state`] - change notifications

pub mod buffer;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod error;
pub mod highlight;
pub mod history;
pub mod indent;
pub mod selection;
pub mod state;
mod text;
pub mod token;

pub use buffer::{Position, TextBuffer};
pub use clipboard::{Clipboard, MemoryClipboard};
pub use commands::{
    ClipboardCommand, Command, CommandResult, CursorCommand, EditCommand, EditSession,
};
pub use config::{ConfigError, EditorConfig, IndentStyle, TabKeyBehavior};
pub use cursor::{CursorSelection, DeletedSelection, Direction};
pub use error::EditError;
pub use highlight::{HighlightOverlay, Span, Tokenizer, TokenizerError};
pub use history::{Action, ActionKind, DEFAULT_MAX_UNDO_DEPTH, EditHistory};
pub use indent::{AutoIndent, IndentPolicy, PlainNewline};
pub use selection::{Selection, SelectionDirection};
pub use state::{StateChange, StateChangeCallback, StateChangeType};
pub use token::{CharClass, classify, is_boundary_char, token_boundaries};
