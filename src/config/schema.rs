/// Configuration schema and defaults for trimsave.
///
/// Defines the TOML-serializable configuration structure with the
/// `[general]`, `[trim]` and `[logging]` sections. Every field has a built-in
/// default; users only set the values they want to override.
use serde::{Deserialize, Serialize};

use crate::session::TrimOptions;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level trimsave configuration.
///
/// Maps directly to `~/.trimsave/config.toml` and `.trimsave.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimsaveConfig {
    pub general: GeneralConfig,
    pub trim: TrimConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [general]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Master switch. When `false`, files are saved untouched.
    pub enabled: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// [trim]
// ---------------------------------------------------------------------------

/// Which passes run on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// Strip tab, vertical tab, form feed and space before line ends.
    pub trailing_whitespace: bool,
    /// Remove surplus blank lines at the end of the buffer.
    pub blank_tail: bool,
    /// Put back the whitespace typed up to the cursor after saving.
    pub preserve_cursor: bool,
    /// Language identifiers whose trailing whitespace is significant.
    pub skip_languages: Vec<String>,
}

impl Default for TrimConfig {
    fn default() -> Self {
        let options = TrimOptions::default();
        Self {
            trailing_whitespace: options.trailing_whitespace,
            blank_tail: options.blank_tail,
            preserve_cursor: options.preserve_cursor,
            skip_languages: options.skip_languages,
        }
    }
}

impl TrimConfig {
    /// Engine options for these settings.
    pub fn options(&self) -> TrimOptions {
        TrimOptions {
            trailing_whitespace: self.trailing_whitespace,
            blank_tail: self.blank_tail,
            preserve_cursor: self.preserve_cursor,
            skip_languages: self.skip_languages.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether session events are appended to the event log.
    pub enabled: bool,
    /// Path to the JSONL event log. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "~/.trimsave/events.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl TrimsaveConfig {
    /// Annotated default config file, written by `trimsave config init`.
    pub fn default_toml() -> String {
        r#"# trimsave configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (TRIMSAVE_*)
#   2. Project config (.trimsave.toml in current directory)
#   3. User global config (~/.trimsave/config.toml)
#   4. Built-in defaults

[general]
enabled = true

[trim]
trailing_whitespace = true   # tab, vertical tab, form feed, space before line ends
blank_tail = true            # drop blank lines after the last line of content
preserve_cursor = true       # restore whitespace typed up to the cursor after save
skip_languages = ["diff"]    # trailing whitespace is significant in patches

[logging]
enabled = false
path = "~/.trimsave/events.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
