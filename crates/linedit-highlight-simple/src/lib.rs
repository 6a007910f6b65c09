//! `linedit-highlight-simple` - Simple (regex-based) tokenizer for `linedit-core`.
//!
//! This crate is intended for lightweight formats (JSON/INI/etc.) where a real lexer is
//! unnecessary. Plug a [`RegexTokenizer`] into an `EditSession` and its highlight overlay is
//! refreshed after every edit.

use linedit_core::{Span, Tokenizer, TokenizerError};
use regex::Regex;

/// A single regex highlighting rule.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    class: String,
    capture_group: Option<usize>,
}

impl RegexRule {
    pub fn new(pattern: &str, class: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            class: class.into(),
            capture_group: None,
        })
    }

    /// Highlight only a capture group of each match.
    ///
    /// Example (INI key):
    /// - pattern: `^\\s*([^=\\s]+)\\s*=`
    /// - capture_group: `1` (the key)
    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = Some(group);
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    fn byte_ranges<'a>(&'a self, line: &'a str) -> Box<dyn Iterator<Item = (usize, usize)> + 'a> {
        match self.capture_group {
            Some(group) => Box::new(
                self.regex
                    .captures_iter(line)
                    .filter_map(move |caps| caps.get(group))
                    .map(|m| (m.start(), m.end())),
            ),
            None => Box::new(self.regex.find_iter(line).map(|m| (m.start(), m.end()))),
        }
    }
}

/// A simple regex-based tokenizer.
///
/// Rules are tried in order; a match overlapping a span produced by an earlier rule is dropped,
/// so list the rules that should win (strings, comments) first.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    rules: Vec<RegexRule>,
}

impl RegexTokenizer {
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }

    /// Spans for one line, sorted by offset (char columns).
    pub fn highlight_line(&self, line: &str) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();

        for rule in &self.rules {
            for (start, end) in rule.byte_ranges(line) {
                let Some(span) = span_from_match(line, start, end, &rule.class) else {
                    continue;
                };
                let overlaps = spans
                    .iter()
                    .any(|s| span.offset < s.end() && s.offset < span.end());
                if !overlaps {
                    spans.push(span);
                }
            }
        }

        spans.sort_by_key(|span| span.offset);
        spans
    }

    /// A small default JSON grammar (strings, numbers, booleans, null).
    pub fn json_default(classes: SimpleJsonClasses) -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            // JSON string (single-line, handles escapes)
            RegexRule::new(r#""(?:\\.|[^"\\])*""#, classes.string)?,
            // JSON number
            RegexRule::new(
                r#"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?"#,
                classes.number,
            )?,
            // JSON boolean / null
            RegexRule::new(r#"\b(?:true|false)\b"#, classes.boolean)?,
            RegexRule::new(r#"\bnull\b"#, classes.null)?,
        ]))
    }

    /// A small default INI grammar (section, key, comment).
    pub fn ini_default(classes: SimpleIniClasses) -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            // Comment: ;... or #...
            RegexRule::new(r#"^\s*[;#].*$"#, classes.comment)?,
            // Section header: [section]
            RegexRule::new(r#"^\s*\[([^\]]+)\]\s*$"#, classes.section)?.with_capture_group(1),
            // Key: key = value
            RegexRule::new(r#"^\s*([^=\s]+)\s*="#, classes.key)?.with_capture_group(1),
        ]))
    }
}

impl Tokenizer for RegexTokenizer {
    fn highlight(&mut self, lines: &[String]) -> Result<Vec<Vec<Span>>, TokenizerError> {
        Ok(lines.iter().map(|line| self.highlight_line(line)).collect())
    }
}

/// Class names produced by [`RegexTokenizer::json_default`].
#[derive(Debug, Clone)]
pub struct SimpleJsonClasses {
    pub string: String,
    pub number: String,
    pub boolean: String,
    pub null: String,
}

impl Default for SimpleJsonClasses {
    fn default() -> Self {
        Self {
            string: CLASS_STRING.to_string(),
            number: CLASS_NUMBER.to_string(),
            boolean: CLASS_BOOLEAN.to_string(),
            null: CLASS_NULL.to_string(),
        }
    }
}

/// Class names produced by [`RegexTokenizer::ini_default`].
#[derive(Debug, Clone)]
pub struct SimpleIniClasses {
    pub section: String,
    pub key: String,
    pub comment: String,
}

impl Default for SimpleIniClasses {
    fn default() -> Self {
        Self {
            section: CLASS_SECTION.to_string(),
            key: CLASS_KEY.to_string(),
            comment: CLASS_COMMENT.to_string(),
        }
    }
}

/// Default class names for `RegexTokenizer`-based grammars.
///
/// These are only identifiers. UI/theme layer is expected to map them to actual colors.
pub const CLASS_STRING: &str = "string";
pub const CLASS_NUMBER: &str = "number";
pub const CLASS_BOOLEAN: &str = "boolean";
pub const CLASS_NULL: &str = "null";
pub const CLASS_SECTION: &str = "section";
pub const CLASS_KEY: &str = "key";
pub const CLASS_COMMENT: &str = "comment";

fn span_from_match(
    line_text: &str,
    match_start_byte: usize,
    match_end_byte: usize,
    class: &str,
) -> Option<Span> {
    if match_start_byte >= match_end_byte || match_end_byte > line_text.len() {
        return None;
    }

    let start_col = line_text[..match_start_byte].chars().count();
    let end_col = line_text[..match_end_byte].chars().count();
    if start_col >= end_col {
        return None;
    }

    Some(Span::new(start_col, end_col - start_col, class))
}
