//! Character classification and token boundaries for word-wise navigation and deletion.
//!
//! A line is split into tokens left to right:
//!
//! - whitespace at the very start of a line is a token of its own (indentation);
//! - a quoted string runs from its opening quote to the matching unescaped quote, or to the
//!   end of the line if it is never closed;
//! - any other token is a maximal run of characters of the same [`CharClass`];
//! - whitespace that follows a token belongs to that token.
//!
//! Attaching trailing whitespace makes word-right land on the first character of the next
//! token, and word-left land on the start of the previous one.

use std::ops::Range;

/// Character category used to find token boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// Alphanumeric characters and `_`.
    Identifier,
    /// One of `+-*/%=<>!&|^~@`.
    Operator,
    /// One of `()[]{},;.`.
    Delimiter,
    /// Any whitespace character.
    Whitespace,
    /// `"` or `'`.
    Quote,
    /// Everything else.
    Other,
}

const OPERATORS: &str = "+-*/%=<>!&|^~@";
const DELIMITERS: &str = "()[]{},;.";

/// Classify a single character.
pub fn classify(ch: char) -> CharClass {
    if ch.is_alphanumeric() || ch == '_' {
        CharClass::Identifier
    } else if ch.is_whitespace() {
        CharClass::Whitespace
    } else if ch == '"' || ch == '\'' {
        CharClass::Quote
    } else if OPERATORS.contains(ch) {
        CharClass::Operator
    } else if DELIMITERS.contains(ch) {
        CharClass::Delimiter
    } else {
        CharClass::Other
    }
}

/// Whether typing `ch` ends a coalesced word run.
pub fn is_boundary_char(ch: char) -> bool {
    classify(ch) != CharClass::Identifier
}

/// Token spans of `line` as character ranges. The spans are contiguous and cover the line.
pub fn tokenize_line(line: &str) -> Vec<Range<usize>> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    let indent_end = skip_whitespace(&chars, 0);
    if indent_end > 0 {
        tokens.push(0..indent_end);
        i = indent_end;
    }

    while i < len {
        let start = i;
        let class = classify(chars[i]);
        i = if class == CharClass::Quote {
            closing_quote_end(&chars, i)
        } else {
            let mut j = i + 1;
            while j < len && classify(chars[j]) == class {
                j += 1;
            }
            j
        };
        i = skip_whitespace(&chars, i);
        tokens.push(start..i);
    }

    tokens
}

/// Boundaries `(start, end)` of the token containing the character at `column`.
///
/// At or past the end of the line the result is an empty span at the line end.
pub fn token_boundaries(line: &str, column: usize) -> (usize, usize) {
    tokenize_line(line)
        .into_iter()
        .find(|token| token.contains(&column))
        .map(|token| (token.start, token.end))
        .unwrap_or_else(|| {
            let len = line.chars().count();
            (len, len)
        })
}

/// Column reached by a word-left move from `column` (token start of the previous character).
pub fn word_start_before(line: &str, column: usize) -> usize {
    if column == 0 {
        return 0;
    }
    token_boundaries(line, column - 1).0
}

/// Column reached by a word-right move from `column` (end of the token under the cursor).
pub fn word_end_after(line: &str, column: usize) -> usize {
    let (start, end) = token_boundaries(line, column);
    if start == end { column } else { end }
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

fn closing_quote_end(chars: &[char], open: usize) -> usize {
    let quote = chars[open];
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify('a'), CharClass::Identifier);
        assert_eq!(classify('_'), CharClass::Identifier);
        assert_eq!(classify('9'), CharClass::Identifier);
        assert_eq!(classify('é'), CharClass::Identifier);
        assert_eq!(classify('+'), CharClass::Operator);
        assert_eq!(classify('@'), CharClass::Operator);
        assert_eq!(classify('.'), CharClass::Delimiter);
        assert_eq!(classify('{'), CharClass::Delimiter);
        assert_eq!(classify('\t'), CharClass::Whitespace);
        assert_eq!(classify('"'), CharClass::Quote);
        assert_eq!(classify('#'), CharClass::Other);
    }

    #[test]
    fn test_word_absorbs_trailing_whitespace() {
        assert_eq!(token_boundaries("foo bar", 6), (4, 7));
        assert_eq!(token_boundaries("foo bar", 0), (0, 4));
        assert_eq!(token_boundaries("foo   bar", 4), (0, 6));
    }

    #[test]
    fn test_leading_whitespace_is_own_token() {
        assert_eq!(token_boundaries("    let x", 2), (0, 4));
        assert_eq!(token_boundaries("    let x", 4), (4, 8));
    }

    #[test]
    fn test_operator_and_delimiter_runs() {
        let line = "a += foo(b);";
        assert_eq!(token_boundaries(line, 2), (2, 5));
        assert_eq!(token_boundaries(line, 5), (5, 8));
        assert_eq!(token_boundaries(line, 8), (8, 9));
        assert_eq!(token_boundaries(line, 10), (10, 12));
    }

    #[test]
    fn test_quoted_string_extends_to_closing_quote() {
        let line = r#"x = "a \" b" + 1"#;
        assert_eq!(token_boundaries(line, 6), (4, 13));
        assert_eq!(token_boundaries("say 'unterminated here", 8), (4, 22));
    }

    #[test]
    fn test_end_of_line_is_empty_span() {
        assert_eq!(token_boundaries("abc", 3), (3, 3));
        assert_eq!(token_boundaries("", 0), (0, 0));
    }

    #[test]
    fn test_tokens_cover_line() {
        let line = "  if (a == 'b') { c.d(); }  ";
        let tokens = tokenize_line(line);
        assert_eq!(tokens.first().map(|t| t.start), Some(0));
        assert_eq!(tokens.last().map(|t| t.end), Some(line.chars().count()));
        for pair in tokens.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_word_moves() {
        assert_eq!(word_start_before("foo bar", 7), 4);
        assert_eq!(word_start_before("foo bar", 4), 0);
        assert_eq!(word_end_after("foo bar", 0), 4);
        assert_eq!(word_end_after("foo bar", 4), 7);
        assert_eq!(word_end_after("foo bar", 7), 7);
    }
}
