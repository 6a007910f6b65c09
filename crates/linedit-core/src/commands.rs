//! Command surface: one editing session over a document.
//!
//! [`EditSession`] owns the buffer, cursor, history and highlight overlay and turns each
//! keystroke-level request into buffer splices plus history records. Every public entry point
//! clamps the cursor into the buffer first; the components underneath trust their inputs.
//!
//! # Example
//!
//! ```rust
//! use linedit_core::{Direction, EditSession, Position};
//!
//! let mut session = EditSession::new("abc\ndef");
//! session.move_cursor(Direction::LineEnd, false);
//! session.enter().unwrap();
//! assert_eq!(session.lines(), ["abc", "", "def"]);
//! assert_eq!(session.cursor(), Position::new(1, 0));
//!
//! session.undo().unwrap();
//! assert_eq!(session.lines(), ["abc", "def"]);
//! assert_eq!(session.cursor(), Position::new(0, 3));
//! ```

use std::fmt;

use tracing::{debug, trace, warn};

use crate::buffer::{Position, TextBuffer};
use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::config::{EditorConfig, TabKeyBehavior};
use crate::cursor::{CursorSelection, Direction};
use crate::error::EditError;
use crate::highlight::{HighlightOverlay, Span, Tokenizer, TokenizerError, sanitize_line};
use crate::history::{Action, EditHistory};
use crate::indent::{IndentPolicy, visual_column};
use crate::selection::Selection;
use crate::state::{StateChange, StateChangeCallback, StateChangeType};
use crate::text::normalize_line_endings;
use crate::token::{is_boundary_char, token_boundaries};

/// Text editing commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Type text at the cursor, character by character (coalesced into word-sized undo steps).
    InsertChar {
        /// Typed text.
        text: String,
    },
    /// Insert a block of text at the cursor as one undo step.
    InsertText {
        /// Text to insert; may contain newlines.
        text: String,
    },
    /// Replace `start..end` with `text`.
    ReplaceRange {
        /// Range start.
        start: Position,
        /// Range end.
        end: Position,
        /// Replacement text.
        text: String,
    },
    /// Delete backwards.
    Backspace {
        /// Delete the whole token before the cursor.
        extended: bool,
    },
    /// Delete forwards.
    DeleteForward {
        /// Delete to the end of the token under the cursor.
        extended: bool,
    },
    /// Line break, indented by the session's indent policy.
    Enter,
    /// Tab key.
    Tab,
    /// Undo
    Undo,
    /// Redo
    Redo,
    /// Commit the in-flight typing run (e.g. on focus loss).
    FlushTyping,
}

/// Cursor commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorCommand {
    /// Move the cursor.
    Move {
        /// Where to.
        direction: Direction,
        /// Extend the selection instead of clearing it.
        extend: bool,
    },
    /// Move to an explicit position (clamped).
    MoveTo {
        /// Target line.
        line: usize,
        /// Target column.
        column: usize,
    },
    /// Select from `anchor` to `active` (both clamped).
    SetSelection {
        /// Fixed end.
        anchor: Position,
        /// Moving end; the cursor goes here.
        active: Position,
    },
    /// Drop the selection.
    ClearSelection,
    /// Select the whole document, or clear the selection if it already covers everything.
    SelectAll,
}

/// Clipboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardCommand {
    /// Copy the selection, then delete it.
    Cut,
    /// Copy the selection.
    Copy,
    /// Insert clipboard text, replacing the selection.
    Paste,
}

/// Editor command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text editing commands
    Edit(EditCommand),
    /// Cursor command
    Cursor(CursorCommand),
    /// Clipboard command
    Clipboard(ClipboardCommand),
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The command changed something.
    Success,
    /// Nothing to do (empty undo stack, no selection to copy, backspace at document start, ...).
    Noop,
    /// Success, returns the resulting cursor position
    Position(Position),
}

impl CommandResult {
    fn from_changed(changed: bool) -> Self {
        if changed { Self::Success } else { Self::Noop }
    }
}

/// First line touched since the last notification, and whether line breaks moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyLines {
    first: usize,
    structural: bool,
}

/// A document plus everything needed to edit it interactively.
pub struct EditSession {
    buffer: TextBuffer,
    cursor: CursorSelection,
    history: EditHistory,
    overlay: HighlightOverlay,
    clipboard: Box<dyn Clipboard>,
    tokenizer: Option<Box<dyn Tokenizer>>,
    indent: Box<dyn IndentPolicy>,
    config: EditorConfig,
    version: u64,
    dirty: Option<DirtyLines>,
    callbacks: Vec<StateChangeCallback>,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("history", &self.history)
            .field("indent", &self.indent)
            .field("config", &self.config)
            .field("version", &self.version)
            .field("has_tokenizer", &self.tokenizer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new("")
    }
}

impl EditSession {
    /// Open `text` with default settings, an in-memory clipboard and no tokenizer.
    pub fn new(text: &str) -> Self {
        Self::with_config(text, EditorConfig::default())
    }

    /// Open `text` with `config`.
    pub fn with_config(text: &str, config: EditorConfig) -> Self {
        let buffer = TextBuffer::new(text);
        let overlay = HighlightOverlay::with_line_count(buffer.line_count());
        Self {
            buffer,
            cursor: CursorSelection::new(),
            history: EditHistory::new(config.max_undo_depth),
            overlay,
            clipboard: Box::new(MemoryClipboard::new()),
            tokenizer: None,
            indent: config.indent_policy(),
            config,
            version: 0,
            dirty: None,
            callbacks: Vec::new(),
        }
    }

    /// Attach a tokenizer and highlight the document right away.
    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.set_tokenizer(Some(tokenizer));
        self
    }

    /// Use `clipboard` for cut, copy and paste.
    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Replace or remove the tokenizer. Spans are recomputed (or cleared) immediately.
    pub fn set_tokenizer(&mut self, tokenizer: Option<Box<dyn Tokenizer>>) {
        self.tokenizer = tokenizer;
        self.refresh_highlighting();
    }

    /// Replace the indentation policy.
    pub fn set_indent_policy(&mut self, policy: Box<dyn IndentPolicy>) {
        self.indent = policy;
    }

    /// Replace the clipboard.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    /// Mutable access to the clipboard, e.g. to seed it before a paste.
    pub fn clipboard_mut(&mut self) -> &mut dyn Clipboard {
        self.clipboard.as_mut()
    }

    /// Active settings.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the whole document. History is cleared and the cursor returns to the start.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = TextBuffer::new(text);
        self.cursor = CursorSelection::new();
        self.history.clear();
        self.mark_dirty(0, true);
        self.document_changed();
    }

    // ---------------------------------------------------------------------
    // Read-only accessors
    // ---------------------------------------------------------------------

    /// Current lines.
    pub fn lines(&self) -> &[String] {
        self.buffer.lines()
    }

    /// Whole document joined with `\n`.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Cursor position.
    pub fn cursor(&self) -> Position {
        self.cursor.cursor()
    }

    /// Current selection (anchor and active end), if non-empty.
    pub fn selection(&self) -> Option<Selection> {
        self.cursor.selection()
    }

    /// Normalized selection range, if a selection exists.
    pub fn selection_range(&self) -> Option<(Position, Position)> {
        self.cursor.normalized_range()
    }

    /// Highlight spans of `line`.
    pub fn spans(&self, line: usize) -> &[Span] {
        debug_assert_eq!(self.overlay.line_count(), self.buffer.line_count());
        self.overlay.spans(line)
    }

    /// The highlight overlay.
    pub fn overlay(&self) -> &HighlightOverlay {
        &self.overlay
    }

    /// The edit history.
    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Document version; bumped by every buffer mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the document differs from the last clean point.
    pub fn is_modified(&self) -> bool {
        !self.history.is_clean()
    }

    /// Record the current state as clean (e.g. after the host saved the file).
    pub fn mark_clean(&mut self) {
        self.history.mark_clean();
    }

    /// Whether [`undo`](Self::undo) would do anything.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo steps available, counting a pending typing run as one.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Redo steps available.
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Register a callback invoked after every state change.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    // ---------------------------------------------------------------------
    // Editing
    // ---------------------------------------------------------------------

    /// Type `text` at the cursor, replacing any selection.
    ///
    /// Identifier characters accumulate into one pending undo step. A boundary character
    /// (whitespace, punctuation, operators) typed while a run is pending commits that run and
    /// becomes an undo step of its own. Text containing a line break is inserted as a block.
    pub fn insert_char(&mut self, text: &str) -> Result<(), EditError> {
        self.clamp_state();
        if text.is_empty() {
            return Ok(());
        }
        if text.contains(['\n', '\r']) {
            return self.insert_text(text).map(|_| ());
        }

        self.delete_selection_action("Delete Selection")?;
        for ch in text.chars() {
            self.type_char(ch)?;
        }
        self.document_changed();
        Ok(())
    }

    fn type_char(&mut self, ch: char) -> Result<(), EditError> {
        let at = self.cursor.cursor();
        let mut buf = [0u8; 4];
        let end = self.buffer.insert(at, ch.encode_utf8(&mut buf))?;

        if is_boundary_char(ch) && self.history.pending_text().is_some() {
            self.history.commit(Action::insert(
                at,
                ch.to_string(),
                at,
                end,
                "Insert Text",
            ));
        } else {
            self.history.extend_run(at, ch);
        }
        self.touch(at.line, "");
        trace!(?ch, line = at.line, column = at.column, "type_char");
        self.cursor.set_cursor(end);
        Ok(())
    }

    /// Insert `text` at the cursor as one undo step, replacing any selection.
    ///
    /// `\r\n` and lone `\r` become `\n`. Returns the cursor position after the insert.
    pub fn insert_text(&mut self, text: &str) -> Result<Position, EditError> {
        self.clamp_state();
        let text = normalize_line_endings(text);
        let mut changed = self.delete_selection_action("Delete Selection")?;
        if !text.is_empty() {
            self.commit_insert(&text, "Insert Text")?;
            changed = true;
        }
        if changed {
            self.document_changed();
        }
        Ok(self.cursor.cursor())
    }

    /// Replace `start..end` with `text`. Both ends are clamped and may be given in either order.
    ///
    /// The deletion and the insertion are separate undo steps.
    pub fn replace_range(
        &mut self,
        start: Position,
        end: Position,
        text: &str,
    ) -> Result<Position, EditError> {
        self.clamp_state();
        self.history.flush();
        let (start, end) = {
            let a = self.buffer.clamp(start);
            let b = self.buffer.clamp(end);
            if a <= b { (a, b) } else { (b, a) }
        };
        let text = normalize_line_endings(text);

        let cursor_before = self.cursor.cursor();
        let mut changed = false;
        if start != end {
            self.commit_delete(start, end, cursor_before, "Replace")?;
            changed = true;
        }
        self.cursor.set_cursor(start);
        if !text.is_empty() {
            self.commit_insert(&text, "Replace")?;
            changed = true;
        }
        if changed {
            self.document_changed();
        }
        Ok(self.cursor.cursor())
    }

    /// Backspace. Returns whether anything was deleted.
    ///
    /// Deletes the selection if there is one. Otherwise removes the line break at column 0,
    /// the token before the cursor when `extended`, or as many characters as the indent
    /// policy asks for.
    pub fn backspace(&mut self, extended: bool) -> Result<bool, EditError> {
        self.clamp_state();
        if self.delete_selection_action("Delete Selection")? {
            self.document_changed();
            return Ok(true);
        }

        let cur = self.cursor.cursor();
        let (start, description) = if cur.column == 0 {
            if cur.line == 0 {
                return Ok(false);
            }
            let prev = cur.line - 1;
            let prev_len = self.buffer.line_length(prev).unwrap_or_default();
            (Position::new(prev, prev_len), "Backspace")
        } else {
            let line = self.buffer.line(cur.line).unwrap_or_default();
            if extended {
                let (token_start, _) = token_boundaries(line, cur.column - 1);
                (Position::new(cur.line, token_start), "Delete Word")
            } else {
                let width = self
                    .indent
                    .backspace_width(line, cur.column)
                    .clamp(1, cur.column);
                (Position::new(cur.line, cur.column - width), "Backspace")
            }
        };

        self.commit_delete(start, cur, cur, description)?;
        self.document_changed();
        Ok(true)
    }

    /// Forward delete. Returns whether anything was deleted.
    ///
    /// Deletes the selection if there is one. At the end of a line the line break goes; with
    /// `extended` the rest of the token under the cursor goes; otherwise one character.
    pub fn delete_forward(&mut self, extended: bool) -> Result<bool, EditError> {
        self.clamp_state();
        if self.delete_selection_action("Delete Selection")? {
            self.document_changed();
            return Ok(true);
        }

        let cur = self.cursor.cursor();
        if cur == self.buffer.end_of_document() {
            return Ok(false);
        }
        let line = self.buffer.line(cur.line).unwrap_or_default();
        let line_len = self.buffer.line_length(cur.line).unwrap_or_default();
        let (end, description) = if cur.column >= line_len {
            (Position::new(cur.line + 1, 0), "Delete")
        } else if extended {
            let (_, token_end) = token_boundaries(line, cur.column);
            (Position::new(cur.line, token_end), "Delete Word")
        } else {
            (Position::new(cur.line, cur.column + 1), "Delete")
        };

        self.commit_delete(cur, end, cur, description)?;
        self.document_changed();
        Ok(true)
    }

    /// Line break plus whatever indentation the indent policy asks for.
    pub fn enter(&mut self) -> Result<(), EditError> {
        self.clamp_state();
        self.delete_selection_action("Delete Selection")?;
        let cur = self.cursor.cursor();
        let line = self.buffer.line(cur.line).unwrap_or_default();
        let mut text = String::from("\n");
        text.push_str(&self.indent.newline_indent(line, cur.column));
        debug!(line = cur.line, column = cur.column, indent = text.len() - 1, "enter");
        self.commit_insert(&text, "New Line")?;
        self.document_changed();
        Ok(())
    }

    /// Tab key: a literal tab or spaces up to the next tab stop.
    pub fn tab(&mut self) -> Result<(), EditError> {
        self.clamp_state();
        self.delete_selection_action("Delete Selection")?;
        let text = match self.config.tab_key {
            TabKeyBehavior::Tab => "\t".to_string(),
            TabKeyBehavior::Spaces => {
                let tab_width = self.config.tab_width.max(1);
                let cur = self.cursor.cursor();
                let line = self.buffer.line(cur.line).unwrap_or_default();
                let x = visual_column(line, cur.column, tab_width);
                " ".repeat(tab_width - x % tab_width)
            }
        };
        self.commit_insert(&text, "Insert Tab")?;
        self.document_changed();
        Ok(())
    }

    /// Undo the last edit. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        self.clamp_state();
        let (cursor_before, selection_before, line, structural) =
            match self.history.undo(&mut self.buffer)? {
                Some(action) => (
                    action.cursor_before,
                    action.selection_before,
                    action.position.line,
                    action.text.contains('\n'),
                ),
                None => return Ok(false),
            };
        self.mark_dirty(line, structural);
        self.cursor.restore(cursor_before, selection_before);
        self.cursor.clamp_to(&self.buffer);
        self.document_changed();
        Ok(true)
    }

    /// Redo the last undone edit. Returns `false` when there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        self.clamp_state();
        let (cursor_after, line, structural) = match self.history.redo(&mut self.buffer)? {
            Some(action) => (
                action.cursor_after,
                action.position.line,
                action.text.contains('\n'),
            ),
            None => return Ok(false),
        };
        self.mark_dirty(line, structural);
        self.cursor.set_cursor(cursor_after);
        self.cursor.clamp_to(&self.buffer);
        self.document_changed();
        Ok(true)
    }

    /// Commit the pending typing run, as on focus loss. Returns whether one was pending.
    pub fn flush_typing(&mut self) -> bool {
        self.history.flush()
    }

    // ---------------------------------------------------------------------
    // Clipboard
    // ---------------------------------------------------------------------

    /// Copy the selection to the clipboard. Returns `false` without a selection.
    pub fn copy(&mut self) -> Result<bool, EditError> {
        self.clamp_state();
        match self.cursor.selected_text(&self.buffer)? {
            Some(text) => {
                self.clipboard.set_text(text);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Copy the selection, then delete it as one undo step.
    pub fn cut(&mut self) -> Result<bool, EditError> {
        if !self.copy()? {
            return Ok(false);
        }
        self.delete_selection_action("Cut")?;
        self.document_changed();
        Ok(true)
    }

    /// Replace the selection with the clipboard text.
    ///
    /// Deleting the selection and inserting the text are separate undo steps; the insert is
    /// never coalesced with typing. Returns `false` when the clipboard holds no text.
    pub fn paste(&mut self) -> Result<bool, EditError> {
        self.clamp_state();
        let Some(text) = self.clipboard.get_text() else {
            return Ok(false);
        };
        let text = normalize_line_endings(&text);
        if text.is_empty() {
            return Ok(false);
        }
        self.delete_selection_action("Delete Selection")?;
        self.commit_insert(&text, "Paste")?;
        self.document_changed();
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Cursor and selection
    // ---------------------------------------------------------------------

    /// Move the cursor, extending the selection when `extend` is set. Commits pending typing.
    pub fn move_cursor(&mut self, direction: Direction, extend: bool) -> Position {
        self.clamp_state();
        self.history.flush();
        let before = self.cursor.clone();
        self.cursor.move_cursor(&self.buffer, direction, extend);
        self.notify_cursor_changes(&before);
        self.cursor.cursor()
    }

    /// Put the cursor at `position` (clamped) and drop the selection.
    pub fn set_cursor(&mut self, position: Position) -> Position {
        self.clamp_state();
        self.history.flush();
        let before = self.cursor.clone();
        self.cursor.set_cursor(self.buffer.clamp(position));
        self.notify_cursor_changes(&before);
        self.cursor.cursor()
    }

    /// Select `anchor..active` (both clamped). The cursor goes to `active`.
    pub fn set_selection(&mut self, anchor: Position, active: Position) {
        self.clamp_state();
        self.history.flush();
        let before = self.cursor.clone();
        self.cursor.set_selection(Selection::new(
            self.buffer.clamp(anchor),
            self.buffer.clamp(active),
        ));
        self.notify_cursor_changes(&before);
    }

    /// Drop the selection without moving the cursor.
    pub fn clear_selection(&mut self) {
        self.clamp_state();
        self.history.flush();
        let before = self.cursor.clone();
        self.cursor.clear_selection();
        self.notify_cursor_changes(&before);
    }

    /// Select the whole document; a second call clears the selection.
    pub fn select_all(&mut self) {
        self.clamp_state();
        self.history.flush();
        let before = self.cursor.clone();
        self.cursor.select_all(&self.buffer);
        self.notify_cursor_changes(&before);
    }

    // ---------------------------------------------------------------------
    // Highlighting
    // ---------------------------------------------------------------------

    /// Re-run the tokenizer over the whole document.
    ///
    /// A tokenizer error leaves the document unhighlighted rather than failing. Returns whether
    /// fresh spans were installed.
    pub fn refresh_highlighting(&mut self) -> bool {
        self.overlay.resync(self.buffer.line_count());
        let Some(tokenizer) = self.tokenizer.as_mut() else {
            self.overlay.clear_spans();
            return false;
        };
        let result = tokenizer.highlight(self.buffer.lines());
        let installed = match result.and_then(|spans| self.install_spans(spans)) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, version = self.version, "highlighting failed; showing plain text");
                self.overlay.clear_spans();
                false
            }
        };
        self.notify(StateChangeType::HighlightingChanged, self.version);
        installed
    }

    /// Version-stamped copy of the document for tokenizing elsewhere.
    pub fn highlight_snapshot(&self) -> (u64, Vec<String>) {
        (self.version, self.buffer.lines().to_vec())
    }

    /// Deliver spans computed from the snapshot taken at `version`.
    ///
    /// Deliveries for an older version are discarded. Returns whether the spans were applied.
    pub fn apply_highlights(&mut self, version: u64, spans: Vec<Vec<Span>>) -> bool {
        if version != self.version {
            warn!(
                delivered = version,
                current = self.version,
                "discarding stale highlight delivery"
            );
            return false;
        }
        let applied = match self.install_spans(spans) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, version, "rejecting highlight delivery");
                self.overlay.clear_spans();
                false
            }
        };
        self.notify(StateChangeType::HighlightingChanged, self.version);
        applied
    }

    // ---------------------------------------------------------------------
    // Command dispatch
    // ---------------------------------------------------------------------

    /// Execute one command.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, EditError> {
        match command {
            Command::Edit(edit_cmd) => self.execute_edit(edit_cmd),
            Command::Cursor(cursor_cmd) => Ok(self.execute_cursor(cursor_cmd)),
            Command::Clipboard(clipboard_cmd) => self.execute_clipboard(clipboard_cmd),
        }
    }

    /// Execute commands in order, stopping at the first error.
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<Vec<CommandResult>, EditError> {
        commands
            .into_iter()
            .map(|command| self.execute(command))
            .collect()
    }

    fn execute_edit(&mut self, command: EditCommand) -> Result<CommandResult, EditError> {
        match command {
            EditCommand::InsertChar { text } => {
                self.insert_char(&text)?;
                Ok(CommandResult::Position(self.cursor()))
            }
            EditCommand::InsertText { text } => {
                self.insert_text(&text).map(CommandResult::Position)
            }
            EditCommand::ReplaceRange { start, end, text } => self
                .replace_range(start, end, &text)
                .map(CommandResult::Position),
            EditCommand::Backspace { extended } => {
                self.backspace(extended).map(CommandResult::from_changed)
            }
            EditCommand::DeleteForward { extended } => self
                .delete_forward(extended)
                .map(CommandResult::from_changed),
            EditCommand::Enter => {
                self.enter()?;
                Ok(CommandResult::Position(self.cursor()))
            }
            EditCommand::Tab => {
                self.tab()?;
                Ok(CommandResult::Position(self.cursor()))
            }
            EditCommand::Undo => self.undo().map(CommandResult::from_changed),
            EditCommand::Redo => self.redo().map(CommandResult::from_changed),
            EditCommand::FlushTyping => Ok(CommandResult::from_changed(self.flush_typing())),
        }
    }

    fn execute_cursor(&mut self, command: CursorCommand) -> CommandResult {
        match command {
            CursorCommand::Move { direction, extend } => {
                CommandResult::Position(self.move_cursor(direction, extend))
            }
            CursorCommand::MoveTo { line, column } => {
                CommandResult::Position(self.set_cursor(Position::new(line, column)))
            }
            CursorCommand::SetSelection { anchor, active } => {
                self.set_selection(anchor, active);
                CommandResult::Success
            }
            CursorCommand::ClearSelection => {
                self.clear_selection();
                CommandResult::Success
            }
            CursorCommand::SelectAll => {
                self.select_all();
                CommandResult::Success
            }
        }
    }

    fn execute_clipboard(&mut self, command: ClipboardCommand) -> Result<CommandResult, EditError> {
        let changed = match command {
            ClipboardCommand::Cut => self.cut()?,
            ClipboardCommand::Copy => self.copy()?,
            ClipboardCommand::Paste => self.paste()?,
        };
        Ok(CommandResult::from_changed(changed))
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn clamp_state(&mut self) {
        self.cursor.clamp_to(&self.buffer);
    }

    /// Delete the selection as its own undo step. Returns whether there was one.
    fn delete_selection_action(&mut self, description: &str) -> Result<bool, EditError> {
        let cursor_before = self.cursor.cursor();
        let Some(deleted) = self.cursor.delete_selection(&mut self.buffer)? else {
            return Ok(false);
        };
        self.touch(deleted.start.line, &deleted.text);
        self.history.commit(
            Action::delete(
                deleted.start,
                deleted.text,
                cursor_before,
                deleted.start,
                description,
            )
            .with_selection_before(Some(deleted.selection)),
        );
        Ok(true)
    }

    fn commit_insert(&mut self, text: &str, description: &str) -> Result<Position, EditError> {
        let at = self.cursor.cursor();
        let end = self.buffer.insert(at, text)?;
        self.touch(at.line, text);
        self.history
            .commit(Action::insert(at, text, at, end, description));
        self.cursor.set_cursor(end);
        Ok(end)
    }

    fn commit_delete(
        &mut self,
        start: Position,
        end: Position,
        cursor_before: Position,
        description: &str,
    ) -> Result<(), EditError> {
        let text = self.buffer.read_range(start, end)?;
        self.buffer.remove_range(start, end)?;
        self.touch(start.line, &text);
        self.history.commit(Action::delete(
            start,
            text,
            cursor_before,
            start,
            description,
        ));
        self.cursor.set_cursor(start);
        Ok(())
    }

    fn install_spans(&mut self, spans: Vec<Vec<Span>>) -> Result<(), TokenizerError> {
        let expected = self.buffer.line_count();
        if spans.len() != expected {
            return Err(TokenizerError::LineCountMismatch {
                expected,
                found: spans.len(),
            });
        }
        let sanitized = spans
            .into_iter()
            .enumerate()
            .map(|(line, spans)| {
                sanitize_line(spans, self.buffer.line_length(line).unwrap_or_default())
            })
            .collect();
        self.overlay.replace_all(sanitized);
        Ok(())
    }

    fn touch(&mut self, line: usize, text: &str) {
        self.mark_dirty(line, text.contains('\n'));
    }

    fn mark_dirty(&mut self, line: usize, structural: bool) {
        self.dirty = Some(match self.dirty {
            Some(dirty) => DirtyLines {
                first: dirty.first.min(line),
                structural: dirty.structural || structural,
            },
            None => DirtyLines {
                first: line,
                structural,
            },
        });
    }

    /// Keep the overlay index-aligned: spans below a line-break change are dropped, spans on
    /// a line edited in place are clipped to its new length.
    fn invalidate_highlights(&mut self) {
        let line_count = self.buffer.line_count();
        match self.dirty.take() {
            Some(DirtyLines {
                first,
                structural: true,
            }) => self.overlay.invalidate_from(first, line_count),
            Some(DirtyLines {
                first,
                structural: false,
            }) => {
                self.overlay.resync(line_count);
                let line_len = self.buffer.line_length(first).unwrap_or_default();
                self.overlay.clip_line(first, line_len);
            }
            None => {
                self.overlay.resync(line_count);
            }
        }
    }

    fn document_changed(&mut self) {
        let old_version = self.version;
        self.version += 1;
        self.invalidate_highlights();
        self.notify(StateChangeType::DocumentModified, old_version);
        if self.config.auto_highlight && self.tokenizer.is_some() {
            self.refresh_highlighting();
        }
    }

    fn notify_cursor_changes(&mut self, before: &CursorSelection) {
        if before.cursor() != self.cursor.cursor() {
            self.notify(StateChangeType::CursorMoved, self.version);
        }
        if before.selection() != self.cursor.selection() {
            self.notify(StateChangeType::SelectionChanged, self.version);
        }
    }

    fn notify(&mut self, change_type: StateChangeType, old_version: u64) {
        let change = StateChange::new(change_type, old_version, self.version);
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::config::IndentStyle;

    fn session_at(text: &str, line: usize, column: usize) -> EditSession {
        let mut session = EditSession::new(text);
        session.set_cursor(Position::new(line, column));
        session
    }

    fn type_str(session: &mut EditSession, text: &str) {
        for ch in text.chars() {
            session.insert_char(&ch.to_string()).unwrap();
        }
    }

    #[test]
    fn test_typing_coalesces_words() {
        let mut session = EditSession::new("");
        type_str(&mut session, "hello world");
        assert_eq!(session.text(), "hello world");

        assert!(session.undo().unwrap());
        assert_eq!(session.text(), "hello ");
        assert_eq!(session.cursor(), Position::new(0, 6));

        assert!(session.undo().unwrap());
        assert_eq!(session.text(), "hello");
        assert!(session.undo().unwrap());
        assert_eq!(session.text(), "");
        assert!(!session.undo().unwrap());
    }

    #[test]
    fn test_enter_scenario() {
        let mut session = session_at("abc\ndef", 0, 3);
        session.enter().unwrap();
        assert_eq!(session.lines(), ["abc", "", "def"]);
        assert_eq!(session.cursor(), Position::new(1, 0));
        session.undo().unwrap();
        assert_eq!(session.lines(), ["abc", "def"]);
        assert_eq!(session.cursor(), Position::new(0, 3));
    }

    #[test]
    fn test_enter_auto_indents() {
        let mut session = session_at("    if x {", 0, 10);
        session.enter().unwrap();
        assert_eq!(session.lines(), ["    if x {", "        "]);
        assert_eq!(session.cursor(), Position::new(1, 8));
    }

    #[test]
    fn test_enter_plain_policy() {
        let config = EditorConfig {
            indent: IndentStyle::None,
            ..EditorConfig::default()
        };
        let mut session = EditSession::with_config("    x", config);
        session.set_cursor(Position::new(0, 5));
        session.enter().unwrap();
        assert_eq!(session.lines(), ["    x", ""]);
    }

    #[test]
    fn test_backspace_at_line_start_joins_lines() {
        let mut session = session_at("ab\ncd", 1, 0);
        assert!(session.backspace(false).unwrap());
        assert_eq!(session.lines(), ["abcd"]);
        assert_eq!(session.cursor(), Position::new(0, 2));
        session.undo().unwrap();
        assert_eq!(session.lines(), ["ab", "cd"]);
        assert_eq!(session.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_backspace_at_document_start_is_noop() {
        let mut session = EditSession::new("abc");
        assert!(!session.backspace(false).unwrap());
        assert!(!session.backspace(true).unwrap());
        assert_eq!(session.version(), 0);
    }

    #[test]
    fn test_extended_backspace_deletes_token() {
        let mut session = session_at("foo bar", 0, 7);
        assert_eq!(session.move_cursor(Direction::WordLeft, false), Position::new(0, 4));
        session.set_cursor(Position::new(0, 7));
        session.backspace(true).unwrap();
        assert_eq!(session.lines(), ["foo "]);
        assert_eq!(session.cursor(), Position::new(0, 4));
    }

    #[test]
    fn test_backspace_to_tab_stop() {
        let mut session = session_at("      x", 0, 6);
        session.backspace(false).unwrap();
        assert_eq!(session.lines(), ["    x"]);
        session.backspace(false).unwrap();
        assert_eq!(session.lines(), ["x"]);
    }

    #[test]
    fn test_delete_forward_joins_and_token() {
        let mut session = session_at("ab\ncd ef", 0, 2);
        session.delete_forward(false).unwrap();
        assert_eq!(session.lines(), ["abcd ef"]);
        session.delete_forward(true).unwrap();
        assert_eq!(session.lines(), ["abef"]);
        session.set_cursor(Position::new(0, 4));
        assert!(!session.delete_forward(false).unwrap());
    }

    #[test]
    fn test_tab_spaces_to_next_stop() {
        let mut session = session_at("ab", 0, 2);
        session.tab().unwrap();
        assert_eq!(session.lines(), ["ab  "]);
        assert_eq!(session.cursor(), Position::new(0, 4));
    }

    #[test]
    fn test_tab_literal() {
        let config = EditorConfig {
            tab_key: TabKeyBehavior::Tab,
            ..EditorConfig::default()
        };
        let mut session = EditSession::with_config("x", config);
        session.tab().unwrap();
        assert_eq!(session.lines(), ["\tx"]);
    }

    #[test]
    fn test_typing_replaces_selection_in_two_steps() {
        let mut session = EditSession::new("hello world");
        session.set_selection(Position::new(0, 6), Position::new(0, 11));
        type_str(&mut session, "there");
        assert_eq!(session.text(), "hello there");

        session.undo().unwrap();
        assert_eq!(session.text(), "hello ");
        session.undo().unwrap();
        assert_eq!(session.text(), "hello world");
        assert_eq!(
            session.selection(),
            Some(Selection::new(Position::new(0, 6), Position::new(0, 11)))
        );
    }

    #[test]
    fn test_cut_and_paste() {
        let mut session = EditSession::new("one two");
        session.set_selection(Position::new(0, 0), Position::new(0, 4));
        assert!(session.cut().unwrap());
        assert_eq!(session.text(), "two");
        session.set_cursor(Position::new(0, 3));
        session.insert_char(" ").unwrap();
        assert!(session.paste().unwrap());
        assert_eq!(session.text(), "two one ");
    }

    #[test]
    fn test_copy_without_selection_is_noop() {
        let mut session = EditSession::new("abc");
        assert!(!session.copy().unwrap());
        assert!(!session.cut().unwrap());
        assert_eq!(session.clipboard_mut().get_text(), None);
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut session = EditSession::new("");
        session.clipboard_mut().set_text("a\r\nb\rc".to_string());
        session.paste().unwrap();
        assert_eq!(session.lines(), ["a", "b", "c"]);
        assert_eq!(session.undo_depth(), 1);
    }

    #[test]
    fn test_moves_flush_pending_run() {
        let mut session = EditSession::new("");
        type_str(&mut session, "ab");
        assert_eq!(session.history().pending_text(), Some("ab"));
        session.move_cursor(Direction::Left, false);
        assert_eq!(session.history().pending_text(), None);
        type_str(&mut session, "x");
        assert_eq!(session.text(), "axb");
        session.undo().unwrap();
        assert_eq!(session.text(), "ab");
    }

    #[test]
    fn test_clear_selection_ends_typing_run() {
        let mut session = EditSession::new("");
        type_str(&mut session, "ab");
        session.clear_selection();
        assert_eq!(session.history().pending_text(), None);
        type_str(&mut session, "cd");
        session.undo().unwrap();
        assert_eq!(session.text(), "ab");
    }

    #[test]
    fn test_redo_after_new_edit_is_gone() {
        let mut session = EditSession::new("");
        type_str(&mut session, "abc");
        session.undo().unwrap();
        assert!(session.can_redo());
        type_str(&mut session, "x");
        assert!(!session.can_redo());
        assert!(!session.redo().unwrap());
    }

    #[test]
    fn test_replace_range_two_steps() {
        let mut session = EditSession::new("let a = 1;");
        session
            .replace_range(Position::new(0, 9), Position::new(0, 8), "42")
            .unwrap();
        assert_eq!(session.text(), "let a = 42;");
        session.undo().unwrap();
        assert_eq!(session.text(), "let a = ;");
        session.undo().unwrap();
        assert_eq!(session.text(), "let a = 1;");
    }

    #[test]
    fn test_modified_tracking() {
        let mut session = EditSession::new("x");
        assert!(!session.is_modified());
        type_str(&mut session, "y");
        assert!(session.is_modified());
        session.mark_clean();
        assert!(!session.is_modified());
        session.undo().unwrap();
        assert!(session.is_modified());
        session.redo().unwrap();
        assert!(!session.is_modified());
    }

    #[test]
    fn test_subscribers_see_versions() {
        let mut session = EditSession::new("");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.subscribe(move |change| {
            sink.lock().unwrap().push(change.clone());
        });

        session.insert_char("a").unwrap();
        session.move_cursor(Direction::Left, false);
        session.move_cursor(Direction::Right, true);

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.iter().map(|c| c.change_type).collect::<Vec<_>>(),
            [
                StateChangeType::DocumentModified,
                StateChangeType::CursorMoved,
                StateChangeType::CursorMoved,
                StateChangeType::SelectionChanged,
            ]
        );
        assert_eq!((seen[0].old_version, seen[0].new_version), (0, 1));
        assert_eq!((seen[1].old_version, seen[1].new_version), (1, 1));
    }

    #[test]
    fn test_execute_routes_commands() {
        let mut session = EditSession::new("ab");
        let results = session
            .execute_batch(vec![
                Command::Cursor(CursorCommand::MoveTo { line: 0, column: 99 }),
                Command::Edit(EditCommand::Enter),
                Command::Edit(EditCommand::InsertChar { text: "c".into() }),
                Command::Cursor(CursorCommand::SelectAll),
                Command::Clipboard(ClipboardCommand::Copy),
                Command::Edit(EditCommand::Undo),
            ])
            .unwrap();
        assert_eq!(results[0], CommandResult::Position(Position::new(0, 2)));
        assert_eq!(results[2], CommandResult::Position(Position::new(1, 1)));
        assert_eq!(results[4], CommandResult::Success);
        assert_eq!(session.lines(), ["ab", ""]);
        assert_eq!(
            session.execute(Command::Edit(EditCommand::Redo)).unwrap(),
            CommandResult::Success
        );
        assert_eq!(
            session.execute(Command::Edit(EditCommand::Redo)).unwrap(),
            CommandResult::Noop
        );
    }
}
