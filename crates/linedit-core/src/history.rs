//! Undo/redo history.
//!
//! Every committed edit is an [`Action`]: an insert or delete of `text` at `position`, plus the
//! cursor before and after. Reverting an action applies the opposite kind at the same position
//! with the same text, so undo never needs a snapshot of the document.
//!
//! Plain typing is coalesced: consecutive characters accumulate in a pending run that becomes
//! a single action when something interrupts it (a boundary character, any other edit, cursor
//! movement, undo/redo, focus loss).
//!
//! # Example
//!
//! ```rust
//! use linedit_core::{EditHistory, Position, TextBuffer};
//!
//! let mut buffer = TextBuffer::new("");
//! let mut history = EditHistory::default();
//!
//! for (column, ch) in "abc".chars().enumerate() {
//!     let at = Position::new(0, column);
//!     buffer.insert(at, &ch.to_string()).unwrap();
//!     history.extend_run(at, ch);
//! }
//!
//! let restore = history.undo(&mut buffer).unwrap();
//! assert_eq!(buffer.text(), "");
//! assert_eq!(restore.map(|action| action.cursor_before), Some(Position::new(0, 0)));
//! ```

use tracing::{debug, trace};

use crate::buffer::{Position, TextBuffer};
use crate::error::EditError;
use crate::selection::Selection;

/// Default number of actions kept on the undo stack.
pub const DEFAULT_MAX_UNDO_DEPTH: usize = 1000;

/// Kind of text mutation an [`Action`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Text was inserted.
    Insert,
    /// Text was deleted.
    Delete,
}

impl ActionKind {
    /// The kind that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            ActionKind::Insert => ActionKind::Delete,
            ActionKind::Delete => ActionKind::Insert,
        }
    }
}

/// One undoable edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Whether `text` was inserted or deleted.
    pub kind: ActionKind,
    /// Where the text starts.
    pub position: Position,
    /// The inserted or deleted text; may span lines.
    pub text: String,
    /// Cursor before the edit (restored on undo).
    pub cursor_before: Position,
    /// Cursor after the edit (restored on redo).
    pub cursor_after: Position,
    /// Selection that existed before the edit, if the edit consumed one.
    pub selection_before: Option<Selection>,
    /// Human-readable label, e.g. for an Edit menu.
    pub description: String,
}

impl Action {
    /// An insert of `text` at `position`.
    pub fn insert(
        position: Position,
        text: impl Into<String>,
        cursor_before: Position,
        cursor_after: Position,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActionKind::Insert,
            position,
            text: text.into(),
            cursor_before,
            cursor_after,
            selection_before: None,
            description: description.into(),
        }
    }

    /// A delete of `text` at `position`.
    pub fn delete(
        position: Position,
        text: impl Into<String>,
        cursor_before: Position,
        cursor_after: Position,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActionKind::Delete,
            position,
            text: text.into(),
            cursor_before,
            cursor_after,
            selection_before: None,
            description: description.into(),
        }
    }

    /// Attach the selection to restore when this action is undone.
    pub fn with_selection_before(mut self, selection: Option<Selection>) -> Self {
        self.selection_before = selection;
        self
    }

    /// Re-apply the action to `buffer`.
    pub fn apply(&self, buffer: &mut TextBuffer) -> Result<(), EditError> {
        apply_kind(self.kind, self.position, &self.text, buffer)
    }

    /// Undo the action on `buffer`.
    pub fn revert(&self, buffer: &mut TextBuffer) -> Result<(), EditError> {
        apply_kind(self.kind.inverse(), self.position, &self.text, buffer)
    }
}

fn apply_kind(
    kind: ActionKind,
    position: Position,
    text: &str,
    buffer: &mut TextBuffer,
) -> Result<(), EditError> {
    match kind {
        ActionKind::Insert => buffer.insert(position, text).map(|_| ()),
        ActionKind::Delete => buffer.delete_checked(position, text),
    }
}

#[derive(Debug, Clone)]
struct PendingRun {
    text: String,
    start: Position,
    end: Position,
}

/// Undo and redo stacks plus the in-flight typing run.
#[derive(Debug)]
pub struct EditHistory {
    undo_stack: Vec<Action>,
    redo_stack: Vec<Action>,
    pending: Option<PendingRun>,
    max_depth: usize,
    /// Clean point, as an `undo_stack.len()`. `None` once it became unreachable.
    clean_index: Option<usize>,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_DEPTH)
    }
}

impl EditHistory {
    /// Create an empty history keeping at most `max_depth` undo actions (at least 1).
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: None,
            max_depth: max_depth.max(1),
            clean_index: Some(0),
        }
    }

    /// Commit `action`, flushing any pending run first so ordering is preserved.
    pub fn commit(&mut self, action: Action) {
        self.flush();
        self.push_committed(action);
    }

    /// Record that `ch` was just typed at `at`.
    ///
    /// Extends the pending run when `at` is where the run ends; otherwise the old run is
    /// committed and a new one starts.
    pub fn extend_run(&mut self, at: Position, ch: char) {
        match self.pending.as_mut() {
            Some(run) if run.end == at => {
                run.text.push(ch);
                run.end.column += 1;
            }
            _ => {
                self.flush();
                self.pending = Some(PendingRun {
                    text: ch.to_string(),
                    start: at,
                    end: Position::new(at.line, at.column + 1),
                });
            }
        }
        // Typing diverges from whatever was undone.
        self.clear_redo_and_adjust_clean();
    }

    /// Commit the pending run, if any. Returns whether something was committed.
    pub fn flush(&mut self) -> bool {
        let Some(run) = self.pending.take() else {
            return false;
        };
        trace!(text = %run.text, line = run.start.line, column = run.start.column, "flush typing run");
        self.push_committed(Action::insert(
            run.start,
            run.text,
            run.start,
            run.end,
            "Insert Text",
        ));
        true
    }

    /// Text typed since the last commit.
    pub fn pending_text(&self) -> Option<&str> {
        self.pending.as_ref().map(|run| run.text.as_str())
    }

    /// Undo the most recent action. Returns the undone action, or `None` if there was nothing
    /// to undo. On error the action stays on the undo stack and `buffer` is unchanged.
    pub fn undo(&mut self, buffer: &mut TextBuffer) -> Result<Option<&Action>, EditError> {
        self.flush();
        let Some(action) = self.undo_stack.pop() else {
            return Ok(None);
        };
        if let Err(err) = action.revert(buffer) {
            self.undo_stack.push(action);
            return Err(err);
        }
        debug!(kind = ?action.kind, description = %action.description, "undo");
        self.redo_stack.push(action);
        Ok(self.redo_stack.last())
    }

    /// Redo the most recently undone action. Mirrors [`undo`](Self::undo).
    pub fn redo(&mut self, buffer: &mut TextBuffer) -> Result<Option<&Action>, EditError> {
        self.flush();
        let Some(action) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(err) = action.apply(buffer) {
            self.redo_stack.push(action);
            return Err(err);
        }
        debug!(kind = ?action.kind, description = %action.description, "redo");
        self.undo_stack.push(action);
        Ok(self.undo_stack.last())
    }

    /// Can undo (a pending run counts)
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.pending.is_some()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo depth, counting a pending run as the single action it will become.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len() + usize::from(self.pending.is_some())
    }

    /// Redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Committed actions, oldest first.
    pub fn undo_stack(&self) -> &[Action] {
        &self.undo_stack
    }

    /// Undone actions; the next one to redo is last.
    pub fn redo_stack(&self) -> &[Action] {
        &self.redo_stack
    }

    /// Description of the action `undo` would revert next.
    pub fn undo_description(&self) -> Option<&str> {
        if self.pending.is_some() {
            return Some("Insert Text");
        }
        self.undo_stack.last().map(|a| a.description.as_str())
    }

    /// Whether the document matches the last clean point (e.g. the last save).
    pub fn is_clean(&self) -> bool {
        self.pending.is_none() && self.clean_index == Some(self.undo_stack.len())
    }

    /// Mark the current state as the clean point.
    pub fn mark_clean(&mut self) {
        self.flush();
        self.clean_index = Some(self.undo_stack.len());
    }

    /// Forget all history. The current state becomes clean.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
        self.clean_index = Some(0);
    }

    fn clear_redo_and_adjust_clean(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }

        // If clean point is in redo area, it becomes unreachable after clearing redo.
        if let Some(clean_index) = self.clean_index
            && clean_index > self.undo_stack.len()
        {
            self.clean_index = None;
        }

        self.redo_stack.clear();
    }

    fn push_committed(&mut self, action: Action) {
        self.clear_redo_and_adjust_clean();

        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.remove(0);
            self.clean_index = match self.clean_index {
                Some(0) | None => None,
                Some(index) => Some(index - 1),
            };
        }

        debug!(
            kind = ?action.kind,
            line = action.position.line,
            column = action.position.column,
            description = %action.description,
            "commit action"
        );
        self.undo_stack.push(action);
    }
}
