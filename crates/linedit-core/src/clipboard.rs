//! Clipboard text contract.
//!
//! The engine only needs plain text in and out. Hosts bridge this to the platform clipboard;
//! [`MemoryClipboard`] is enough for headless use and tests.

/// Text clipboard used by cut, copy and paste.
pub trait Clipboard: std::fmt::Debug {
    /// Current clipboard text, or `None` when the clipboard holds no text.
    fn get_text(&mut self) -> Option<String>;

    /// Replace the clipboard contents.
    fn set_text(&mut self, text: String);
}

/// Process-local clipboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    /// An empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard pre-filled with `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// Peek at the contents without going through the trait.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) {
        self.text = Some(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.get_text(), None);
        clipboard.set_text("copied".to_string());
        assert_eq!(clipboard.get_text().as_deref(), Some("copied"));
        assert_eq!(MemoryClipboard::with_text("x").text(), Some("x"));
    }
}
