//! Errors returned by buffer and history operations.

use thiserror::Error;

use crate::buffer::Position;

/// Errors produced by buffer and history operations.
///
/// Positions handed to the public command surface are clamped before they reach the buffer, so
/// these only surface for contract violations (direct buffer use with bad coordinates, or a
/// history entry that no longer matches the document).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("position out of bounds: line {line}, column {column}")]
    /// A position references a nonexistent line or a column past the end of its line.
    OutOfBounds {
        /// Logical line index.
        line: usize,
        /// Column in characters.
        column: usize,
    },

    #[error("invalid range: {start:?}..{end:?}")]
    /// A range whose end precedes its start.
    InvalidRange {
        /// Range start.
        start: Position,
        /// Range end.
        end: Position,
    },

    #[error("text mismatch at {position:?}: expected {expected:?}, found {found:?}")]
    /// A checked delete found different content than the caller claimed to remove.
    TextMismatch {
        /// Where the delete was attempted.
        position: Position,
        /// Text the caller asked to delete.
        expected: String,
        /// Text actually present in the buffer.
        found: String,
    },
}

impl EditError {
    pub(crate) fn out_of_bounds(position: Position) -> Self {
        EditError::OutOfBounds {
            line: position.line,
            column: position.column,
        }
    }
}
