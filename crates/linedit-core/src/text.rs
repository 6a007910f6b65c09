use crate::buffer::Position;

pub(crate) fn split_lines_preserve_trailing(text: &str) -> Vec<String> {
    // `str::split('\n')` preserves trailing empty segments: N newlines => N+1 lines.
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Convert `\r\n` and lone `\r` to `\n`.
pub(crate) fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Byte offset of the `column`-th character of `line`, or `None` past the end.
///
/// `column == char count` maps to `line.len()`.
pub(crate) fn byte_offset(line: &str, column: usize) -> Option<usize> {
    if column == 0 {
        return Some(0);
    }
    match line.char_indices().nth(column) {
        Some((idx, _)) => Some(idx),
        None if line.chars().count() == column => Some(line.len()),
        None => None,
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Position reached by walking `text` from `start` the way an insert would place it.
pub(crate) fn end_position(start: Position, text: &str) -> Position {
    let mut segments = text.split('\n');
    let first = segments.next().unwrap_or_default();
    let mut end = Position::new(start.line, start.column + char_len(first));
    for segment in segments {
        end = Position::new(end.line + 1, char_len(segment));
    }
    end
}
