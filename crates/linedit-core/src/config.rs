//! Editor configuration, read from TOML.
//!
//! Every field has a default and unknown keys are ignored, so a partial file (or none at all)
//! is always usable:
//!
//! ```toml
//! tab_width = 2
//! tab_key = "tab"
//! indent = "none"
//! max_undo_depth = 500
//! auto_highlight = false
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::history::DEFAULT_MAX_UNDO_DEPTH;
use crate::indent::{AutoIndent, IndentPolicy, PlainNewline};

/// Failure to load or validate an [`EditorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    /// The TOML could not be deserialized.
    Parse(#[from] toml::de::Error),

    #[error("failed to read config: {0}")]
    /// The file could not be read.
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    /// A value is out of range.
    Invalid(String),
}

/// What the Tab key inserts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabKeyBehavior {
    /// A literal `'\t'`.
    Tab,
    /// Spaces up to the next tab stop.
    #[default]
    Spaces,
}

/// What Enter does with indentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    /// Keep the current indentation, open a level after an opening bracket or `:`.
    #[default]
    Auto,
    /// Bare newline.
    None,
}

/// Settings for an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width of a tab stop in columns.
    pub tab_width: usize,
    /// Tab key behavior.
    pub tab_key: TabKeyBehavior,
    /// Enter key indentation.
    pub indent: IndentStyle,
    /// Undo actions kept before the oldest are dropped.
    pub max_undo_depth: usize,
    /// Re-run the tokenizer after every mutation.
    pub auto_highlight: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            tab_key: TabKeyBehavior::Spaces,
            indent: IndentStyle::Auto,
            max_undo_depth: DEFAULT_MAX_UNDO_DEPTH,
            auto_highlight: true,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            target: "config",
            path = %path.display(),
            tab_width = config.tab_width,
            max_undo_depth = config.max_undo_depth,
            "config_loaded"
        );
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_width == 0 {
            return Err(ConfigError::Invalid("tab_width must be greater than 0".into()));
        }
        if self.max_undo_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_undo_depth must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The indentation policy these settings select.
    pub fn indent_policy(&self) -> Box<dyn IndentPolicy> {
        match self.indent {
            IndentStyle::Auto => Box::new(AutoIndent::new(
                self.tab_width,
                self.tab_key == TabKeyBehavior::Tab,
            )),
            IndentStyle::None => Box::new(PlainNewline),
        }
    }
}
