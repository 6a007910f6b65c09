//! Cursor position plus optional selection anchor.
//!
//! Movement never reads past buffer bounds: horizontal moves wrap across line boundaries and
//! stop at the document edges, vertical moves clamp the column to the destination line.

use crate::buffer::{Position, TextBuffer};
use crate::error::EditError;
use crate::selection::Selection;
use crate::token::{word_end_after, word_start_before};

/// Cursor movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One character left, wrapping to the end of the previous line.
    Left,
    /// One character right, wrapping to the start of the next line.
    Right,
    /// One line up, column clamped.
    Up,
    /// One line down, column clamped.
    Down,
    /// Start of the previous token (Ctrl+Left).
    WordLeft,
    /// Start of the next token (Ctrl+Right).
    WordRight,
    /// Column 0 of the current line.
    LineStart,
    /// End of the current line.
    LineEnd,
    /// `(0, 0)`.
    DocumentStart,
    /// End of the last line.
    DocumentEnd,
}

/// A selection that was removed from the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedSelection {
    /// Start of the removed range; the cursor now sits here.
    pub start: Position,
    /// The removed text.
    pub text: String,
    /// The selection as it was before removal.
    pub selection: Selection,
}

/// Cursor and selection state for one editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorSelection {
    cursor: Position,
    anchor: Option<Position>,
}

impl CursorSelection {
    /// Cursor at the start of the document, no selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor position (the active end of any selection).
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Selection anchor, if a selection is in progress.
    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// Whether a non-empty selection exists.
    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|anchor| anchor != self.cursor)
    }

    /// The current selection, if non-empty.
    pub fn selection(&self) -> Option<Selection> {
        match self.anchor {
            Some(anchor) if anchor != self.cursor => Some(Selection::new(anchor, self.cursor)),
            _ => None,
        }
    }

    /// `(start, end)` of the selection with `start <= end`.
    pub fn normalized_range(&self) -> Option<(Position, Position)> {
        self.selection().map(|selection| selection.normalized())
    }

    /// Move the cursor to `position` and drop the selection. `position` must already be clamped.
    pub fn set_cursor(&mut self, position: Position) {
        self.cursor = position;
        self.anchor = None;
    }

    /// Replace the selection. The cursor moves to the active end.
    pub fn set_selection(&mut self, selection: Selection) {
        self.anchor = Some(selection.anchor);
        self.cursor = selection.active;
    }

    /// Restore a cursor and optional selection recorded earlier.
    pub fn restore(&mut self, cursor: Position, selection: Option<Selection>) {
        match selection {
            Some(selection) => self.set_selection(selection),
            None => self.set_cursor(cursor),
        }
    }

    /// Drop the selection, keeping the cursor where it is.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Clamp cursor and anchor into `buffer`.
    pub fn clamp_to(&mut self, buffer: &TextBuffer) {
        self.cursor = buffer.clamp(self.cursor);
        self.anchor = self.anchor.map(|anchor| buffer.clamp(anchor));
    }

    /// Move the cursor. With `extend`, the selection grows or shrinks from a stable anchor;
    /// without it, the selection is cleared.
    pub fn move_cursor(&mut self, buffer: &TextBuffer, direction: Direction, extend: bool) {
        let target = Self::target(buffer, self.cursor, direction);
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
        self.cursor = target;
    }

    /// Where a move in `direction` from `from` lands.
    pub fn target(buffer: &TextBuffer, from: Position, direction: Direction) -> Position {
        let line = buffer.line(from.line).unwrap_or_default();
        let line_len = buffer.line_length(from.line).unwrap_or_default();
        let last_line = buffer.line_count() - 1;

        match direction {
            Direction::Left | Direction::WordLeft if from.column == 0 => {
                if from.line == 0 {
                    from
                } else {
                    let prev = from.line - 1;
                    Position::new(prev, buffer.line_length(prev).unwrap_or_default())
                }
            }
            Direction::Right | Direction::WordRight if from.column >= line_len => {
                if from.line >= last_line {
                    from
                } else {
                    Position::new(from.line + 1, 0)
                }
            }
            Direction::Left => Position::new(from.line, from.column - 1),
            Direction::Right => Position::new(from.line, from.column + 1),
            Direction::WordLeft => Position::new(from.line, word_start_before(line, from.column)),
            Direction::WordRight => Position::new(from.line, word_end_after(line, from.column)),
            Direction::Up => {
                if from.line == 0 {
                    from
                } else {
                    buffer.clamp(Position::new(from.line - 1, from.column))
                }
            }
            Direction::Down => {
                if from.line >= last_line {
                    from
                } else {
                    buffer.clamp(Position::new(from.line + 1, from.column))
                }
            }
            Direction::LineStart => Position::new(from.line, 0),
            Direction::LineEnd => Position::new(from.line, line_len),
            Direction::DocumentStart => Position::default(),
            Direction::DocumentEnd => buffer.end_of_document(),
        }
    }

    /// Text covered by the selection.
    pub fn selected_text(&self, buffer: &TextBuffer) -> Result<Option<String>, EditError> {
        match self.normalized_range() {
            Some((start, end)) => buffer.read_range(start, end).map(Some),
            None => Ok(None),
        }
    }

    /// Remove the selected range, put the cursor at its start and return what was removed.
    pub fn delete_selection(
        &mut self,
        buffer: &mut TextBuffer,
    ) -> Result<Option<DeletedSelection>, EditError> {
        let Some(selection) = self.selection() else {
            return Ok(None);
        };
        let (start, end) = selection.normalized();
        let text = buffer.read_range(start, end)?;
        buffer.remove_range(start, end)?;
        self.set_cursor(start);
        Ok(Some(DeletedSelection {
            start,
            text,
            selection,
        }))
    }

    /// Select the whole document. Calling it again while everything is selected clears the
    /// selection.
    pub fn select_all(&mut self, buffer: &TextBuffer) {
        let start = Position::default();
        let end = buffer.end_of_document();
        if self.normalized_range() == Some((start, end)) {
            self.anchor = None;
            return;
        }
        self.anchor = Some(start);
        self.cursor = end;
    }
}
