//! Indentation strategies for Enter and Backspace.

/// Decides what Enter inserts after the line break and how much plain Backspace removes.
pub trait IndentPolicy: std::fmt::Debug {
    /// Text inserted after `\n` when Enter is pressed at `column` of `line`.
    fn newline_indent(&self, line: &str, column: usize) -> String;

    /// Number of characters plain Backspace removes before `column` of `line` (at least 1).
    fn backspace_width(&self, line: &str, column: usize) -> usize;
}

/// Enter inserts a bare newline; Backspace removes one character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainNewline;

impl IndentPolicy for PlainNewline {
    fn newline_indent(&self, _line: &str, _column: usize) -> String {
        String::new()
    }

    fn backspace_width(&self, _line: &str, _column: usize) -> usize {
        1
    }
}

/// Enter keeps the current indentation and opens a level after `{`, `(`, `[` or `:`.
///
/// Backspace inside an all-space indentation prefix removes back to the previous tab stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoIndent {
    tab_width: usize,
    use_tabs: bool,
}

impl Default for AutoIndent {
    fn default() -> Self {
        Self::new(4, false)
    }
}

impl AutoIndent {
    /// `tab_width` is clamped to at least 1.
    pub fn new(tab_width: usize, use_tabs: bool) -> Self {
        Self {
            tab_width: tab_width.max(1),
            use_tabs,
        }
    }

    /// One indentation level.
    pub fn unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_width)
        }
    }
}

impl IndentPolicy for AutoIndent {
    fn newline_indent(&self, line: &str, column: usize) -> String {
        let before: String = line.chars().take(column).collect();
        let mut indent: String = before
            .chars()
            .take_while(|ch| *ch == ' ' || *ch == '\t')
            .collect();
        if before
            .trim_end()
            .ends_with(|ch| matches!(ch, '{' | '(' | '[' | ':'))
        {
            indent.push_str(&self.unit());
        }
        indent
    }

    fn backspace_width(&self, line: &str, column: usize) -> usize {
        if column == 0 {
            return 1;
        }
        let all_spaces = line.chars().take(column).all(|ch| ch == ' ');
        if !all_spaces {
            return 1;
        }
        match column % self.tab_width {
            0 => self.tab_width,
            rem => rem,
        }
    }
}

/// Display column of `column` when tabs expand to multiples of `tab_width`.
pub fn visual_column(line: &str, column: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    line.chars().take(column).fold(0usize, |x, ch| {
        if ch == '\t' {
            x + (tab_width - x % tab_width)
        } else {
            x + 1
        }
    })
}
