//! Highlight spans and the tokenizer contract.
//!
//! Lexical rules live outside this crate. A [`Tokenizer`] receives the full document and returns
//! one span list per line; the [`HighlightOverlay`] stores those lists index-aligned with the
//! buffer and is rebuilt wholesale, never patched span by span.

use thiserror::Error;

/// A highlighted sub-range of one line.
///
/// `offset` and `length` count characters within the line. `class` is opaque to the engine;
/// a renderer maps it to a style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    /// First highlighted column.
    pub offset: usize,
    /// Number of highlighted characters.
    pub length: usize,
    /// Token class name, e.g. `"string"`.
    pub class: String,
}

impl Span {
    /// Create a span.
    pub fn new(offset: usize, length: usize, class: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            class: class.into(),
        }
    }

    /// Column just past the span.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Failure reported by a [`Tokenizer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizerError {
    #[error("tokenizer failed: {0}")]
    /// The tokenizer could not process the document.
    Failed(String),

    #[error("tokenizer returned {found} span lists for {expected} lines")]
    /// The result does not line up with the document.
    LineCountMismatch {
        /// Lines in the document that was tokenized.
        expected: usize,
        /// Span lists returned.
        found: usize,
    },
}

/// External lexer that turns a document into per-line spans.
///
/// Implementations must return exactly one list per input line, with non-overlapping spans
/// indexed in characters.
pub trait Tokenizer {
    /// Tokenize the whole document.
    fn highlight(&mut self, lines: &[String]) -> Result<Vec<Vec<Span>>, TokenizerError>;
}

/// Per-line span lists, index-aligned with the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightOverlay {
    lines: Vec<Vec<Span>>,
}

impl HighlightOverlay {
    /// An overlay with `line_count` empty span lists.
    pub fn with_line_count(line_count: usize) -> Self {
        Self {
            lines: vec![Vec::new(); line_count],
        }
    }

    /// Number of span lists held.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Truncate or pad with empty lists so that exactly `line_count` lists are held.
    ///
    /// Returns whether the length changed.
    pub fn resync(&mut self, line_count: usize) -> bool {
        if self.lines.len() == line_count {
            return false;
        }
        self.lines.resize_with(line_count, Vec::new);
        true
    }

    /// Swap in a complete set of span lists.
    pub fn replace_all(&mut self, spans_per_line: Vec<Vec<Span>>) {
        self.lines = spans_per_line;
    }

    /// Drop the span lists of `first_line` and everything below it, then pad with empty lists
    /// to `line_count`.
    ///
    /// Used after an edit that added or removed line breaks: lists below the edit no longer
    /// belong to the line at their index.
    pub fn invalidate_from(&mut self, first_line: usize, line_count: usize) {
        self.lines.truncate(first_line.min(line_count));
        self.lines.resize_with(line_count, Vec::new);
    }

    /// Clip the spans of `line` to `line_len` characters.
    pub fn clip_line(&mut self, line: usize, line_len: usize) {
        if let Some(spans) = self.lines.get_mut(line) {
            *spans = sanitize_line(std::mem::take(spans), line_len);
        }
    }

    /// Drop every span but keep the line count.
    pub fn clear_spans(&mut self) {
        self.lines.iter_mut().for_each(Vec::clear);
    }

    /// Spans for `line`; empty when the line has no highlighting or does not exist.
    pub fn spans(&self, line: usize) -> &[Span] {
        self.lines.get(line).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All span lists.
    pub fn all(&self) -> &[Vec<Span>] {
        &self.lines
    }
}

/// Order `spans`, drop empty ones, clip them to `line_len` and remove overlaps.
pub(crate) fn sanitize_line(mut spans: Vec<Span>, line_len: usize) -> Vec<Span> {
    spans.sort_by_key(|span| span.offset);
    let mut out: Vec<Span> = Vec::with_capacity(spans.len());
    for mut span in spans {
        if span.offset >= line_len || span.length == 0 {
            continue;
        }
        if out.last().is_some_and(|prev| span.offset < prev.end()) {
            continue;
        }
        span.length = span.length.min(line_len - span.offset);
        out.push(span);
    }
    out
}
