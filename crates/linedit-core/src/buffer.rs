//! Line-addressed text storage.
//!
//! The document is a flat array of lines without terminators. A buffer always holds at least
//! one line: an empty document is a single empty line.
//!
//! Columns count Unicode scalar values (`char`s), not bytes or graphemes.
//!
//! # Example
//!
//! ```rust
//! use linedit_core::{Position, TextBuffer};
//!
//! let mut buffer = TextBuffer::new("fn main() {}");
//! let end = buffer.insert(Position::new(0, 11), "\n    body\n").unwrap();
//! assert_eq!(buffer.lines(), ["fn main() {", "    body", "}"]);
//! assert_eq!(end, Position::new(2, 0));
//! ```

use std::cmp::Ordering;

use crate::error::EditError;
use crate::text::{byte_offset, char_len, end_position, split_lines_preserve_trailing};

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered, index-addressed sequence of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl TextBuffer {
    /// Build a buffer from text; `\n` (or `\r\n`) separates lines.
    pub fn new(text: &str) -> Self {
        Self {
            lines: split_lines_preserve_trailing(text),
        }
    }

    /// Create a buffer holding a single empty line.
    pub fn empty() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Build a buffer from already-split lines. An empty vector yields one empty line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self { lines }
    }

    /// All lines of the document.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of line `index`.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Length in characters of line `index`.
    pub fn line_length(&self, index: usize) -> Option<usize> {
        self.lines.get(index).map(|line| char_len(line))
    }

    /// Whole document joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Total character count, counting each line break as one character.
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|line| char_len(line)).sum::<usize>() + self.lines.len() - 1
    }

    /// Position just past the last character of the document.
    pub fn end_of_document(&self) -> Position {
        let last = self.lines.len() - 1;
        Position::new(last, char_len(&self.lines[last]))
    }

    /// Whether `position` addresses an existing line and a column within it (end-of-line included).
    pub fn is_valid(&self, position: Position) -> bool {
        self.line_length(position.line)
            .is_some_and(|len| position.column <= len)
    }

    /// Clamp `position` into the document: last line at most, end of line at most.
    pub fn clamp(&self, position: Position) -> Position {
        let line = position.line.min(self.lines.len() - 1);
        let column = position.column.min(char_len(&self.lines[line]));
        Position::new(line, column)
    }

    /// Insert `text` at `position` and return the position right after the inserted text.
    ///
    /// `text` may contain `\n`; every newline splits the target line, and whatever followed
    /// `position` ends up after the last inserted segment.
    pub fn insert(&mut self, position: Position, text: &str) -> Result<Position, EditError> {
        let split_at = self.byte_index(position)?;
        let end = end_position(position, text);
        if text.is_empty() {
            return Ok(end);
        }

        let mut segments = text.split('\n');
        let first = segments.next().unwrap_or_default();
        let rest: Vec<&str> = segments.collect();

        let target = &mut self.lines[position.line];
        if rest.is_empty() {
            target.insert_str(split_at, first);
            return Ok(end);
        }

        let tail = target.split_off(split_at);
        target.push_str(first);

        let last_index = rest.len() - 1;
        let new_lines = rest.iter().enumerate().map(|(i, segment)| {
            if i == last_index {
                let mut line = String::with_capacity(segment.len() + tail.len());
                line.push_str(segment);
                line.push_str(&tail);
                line
            } else {
                segment.to_string()
            }
        });
        let at = position.line + 1;
        self.lines.splice(at..at, new_lines);

        Ok(end)
    }

    /// Remove `text` starting at `position`.
    ///
    /// The removed range is computed by walking `text` the same way [`insert`](Self::insert)
    /// would; the buffer content in that range is expected to equal `text`. That is checked only
    /// in debug builds; use [`delete_checked`](Self::delete_checked) when the caller cannot
    /// guarantee it.
    pub fn delete(&mut self, position: Position, text: &str) -> Result<(), EditError> {
        let end = end_position(position, text);
        if !self.is_valid(position) {
            return Err(EditError::out_of_bounds(position));
        }
        if !self.is_valid(end) {
            return Err(EditError::out_of_bounds(end));
        }
        debug_assert_eq!(
            self.read_range(position, end).as_deref(),
            Ok(text),
            "delete text does not match buffer content"
        );
        self.remove_range(position, end)
    }

    /// Like [`delete`](Self::delete), but verifies the content first and leaves the buffer
    /// untouched on mismatch.
    pub fn delete_checked(&mut self, position: Position, text: &str) -> Result<(), EditError> {
        let end = end_position(position, text);
        let found = self.read_range(position, end)?;
        if found != text {
            return Err(EditError::TextMismatch {
                position,
                expected: text.to_string(),
                found,
            });
        }
        self.remove_range(position, end)
    }

    /// Text between `start` (inclusive) and `end` (exclusive), lines joined with `\n`.
    pub fn read_range(&self, start: Position, end: Position) -> Result<String, EditError> {
        if end < start {
            return Err(EditError::InvalidRange { start, end });
        }
        let start_byte = self.byte_index(start)?;
        let end_byte = self.byte_index(end)?;

        if start.line == end.line {
            return Ok(self.lines[start.line][start_byte..end_byte].to_string());
        }

        let mut out = String::new();
        out.push_str(&self.lines[start.line][start_byte..]);
        for line in &self.lines[start.line + 1..end.line] {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out.push_str(&self.lines[end.line][..end_byte]);
        Ok(out)
    }

    /// Remove `start..end`, joining the prefix of the start line with the suffix of the end line.
    pub fn remove_range(&mut self, start: Position, end: Position) -> Result<(), EditError> {
        if end < start {
            return Err(EditError::InvalidRange { start, end });
        }
        let start_byte = self.byte_index(start)?;
        let end_byte = self.byte_index(end)?;

        if start.line == end.line {
            self.lines[start.line].replace_range(start_byte..end_byte, "");
            return Ok(());
        }

        let suffix = self.lines[end.line][end_byte..].to_string();
        self.lines.drain(start.line + 1..=end.line);
        let head = &mut self.lines[start.line];
        head.truncate(start_byte);
        head.push_str(&suffix);
        Ok(())
    }

    fn byte_index(&self, position: Position) -> Result<usize, EditError> {
        self.lines
            .get(position.line)
            .and_then(|line| byte_offset(line, position.column))
            .ok_or_else(|| EditError::out_of_bounds(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_has_one_line() {
        assert_eq!(TextBuffer::new("").line_count(), 1);
        assert_eq!(TextBuffer::from_lines(Vec::<String>::new()).lines(), [""]);
        assert_eq!(TextBuffer::empty().end_of_document(), Position::new(0, 0));
    }

    #[test]
    fn test_insert_single_segment() {
        let mut buffer = TextBuffer::new("Hello");
        let end = buffer.insert(Position::new(0, 5), " World").unwrap();
        assert_eq!(buffer.text(), "Hello World");
        assert_eq!(end, Position::new(0, 11));
    }

    #[test]
    fn test_insert_multi_segment_keeps_tail() {
        let mut buffer = TextBuffer::new("abcXYZ\nlast");
        let end = buffer.insert(Position::new(0, 3), "1\n2\n3").unwrap();
        assert_eq!(buffer.lines(), ["abc1", "2", "3XYZ", "last"]);
        assert_eq!(end, Position::new(2, 1));
    }

    #[test]
    fn test_insert_newline_at_end_of_line() {
        let mut buffer = TextBuffer::new("abc\ndef");
        let end = buffer.insert(Position::new(0, 3), "\n").unwrap();
        assert_eq!(buffer.lines(), ["abc", "", "def"]);
        assert_eq!(end, Position::new(1, 0));
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut buffer = TextBuffer::new("abc");
        assert_eq!(
            buffer.insert(Position::new(0, 4), "x"),
            Err(EditError::OutOfBounds { line: 0, column: 4 })
        );
        assert!(matches!(
            buffer.insert(Position::new(1, 0), "x"),
            Err(EditError::OutOfBounds { .. })
        ));
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_delete_multi_line_merges() {
        let mut buffer = TextBuffer::new("abc1\n2\n3XYZ\nlast");
        buffer.delete(Position::new(0, 3), "1\n2\n3").unwrap();
        assert_eq!(buffer.lines(), ["abcXYZ", "last"]);
    }

    #[test]
    fn test_delete_checked_rejects_mismatch() {
        let mut buffer = TextBuffer::new("hello");
        let err = buffer.delete_checked(Position::new(0, 0), "help").unwrap_err();
        assert!(matches!(err, EditError::TextMismatch { .. }));
        assert_eq!(buffer.text(), "hello");
    }

    #[test]
    fn test_read_range_multiline_and_unicode() {
        let buffer = TextBuffer::new("héllo\nwörld\n👋x");
        assert_eq!(
            buffer
                .read_range(Position::new(0, 1), Position::new(2, 1))
                .unwrap(),
            "éllo\nwörld\n👋"
        );
        assert!(matches!(
            buffer.read_range(Position::new(1, 0), Position::new(0, 0)),
            Err(EditError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_clamp_and_char_count() {
        let buffer = TextBuffer::new("ab\ncde");
        assert_eq!(buffer.clamp(Position::new(9, 9)), Position::new(1, 3));
        assert_eq!(buffer.clamp(Position::new(0, 9)), Position::new(0, 2));
        assert_eq!(buffer.char_count(), 6);
    }
}
