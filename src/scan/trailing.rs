//! Trailing whitespace scanner.
//!
//! One regex pass over the whole buffer finds every run of horizontal
//! whitespace that is followed by a line terminator or the buffer end. Each
//! match consumes its terminator, so the next search starts at a line start
//! and a run is always matched from its first char.

use std::sync::LazyLock;

use regex::Regex;

use crate::edit::DeletionRange;
use crate::text::{LineTerminator, TextSnapshot};

/// Language identifiers whose trailing whitespace is significant by default.
pub const DEFAULT_SKIP_LANGUAGES: &[&str] = &["diff"];

/// A whitespace run and the line end that follows it. `\r\n` is listed first
/// so a CRLF pair is consumed as one terminator.
static EOL_WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\t\x0B\x0C ]+(?:\r\n|\n|\r|\x{2029}|\z)")
        .expect("end-of-line whitespace regex must compile")
});

/// Produces the per-line deletions that strip trailing whitespace.
#[derive(Debug, Clone)]
pub struct TrailingWhitespaceScanner {
    skip_languages: Vec<String>,
}

impl Default for TrailingWhitespaceScanner {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_LANGUAGES.iter().map(|s| s.to_string()))
    }
}

impl TrailingWhitespaceScanner {
    pub fn new(skip_languages: impl IntoIterator<Item = String>) -> Self {
        Self {
            skip_languages: skip_languages.into_iter().collect(),
        }
    }

    pub fn skip_languages(&self) -> &[String] {
        &self.skip_languages
    }

    /// Whether documents in `language_id` must keep their trailing whitespace.
    pub fn skips(&self, language_id: Option<&str>) -> bool {
        language_id.is_some_and(|id| self.skip_languages.iter().any(|skip| skip == id))
    }

    /// Deletions for `snapshot`, or none when the language is skipped.
    pub fn scan(&self, snapshot: &TextSnapshot, language_id: Option<&str>) -> Vec<DeletionRange> {
        if self.skips(language_id) {
            return Vec::new();
        }
        scan_ranges(snapshot)
    }
}

/// Deletions for every non-empty trailing run, in ascending order.
pub fn scan_ranges(snapshot: &TextSnapshot) -> Vec<DeletionRange> {
    let text = snapshot.as_str();
    let mut ranges = Vec::new();

    // Byte offsets from the regex are converted to char offsets by walking
    // forward from the previous boundary, so the whole scan stays linear.
    let mut byte_cursor = 0;
    let mut char_cursor = 0;
    let mut advance = |byte: usize| {
        char_cursor += text[byte_cursor..byte].chars().count();
        byte_cursor = byte;
        char_cursor
    };

    for found in EOL_WHITESPACE_RE.find_iter(text) {
        let run = found
            .as_str()
            .trim_end_matches(LineTerminator::is_terminator_char);
        let start = advance(found.start());
        let end = advance(found.start() + run.len());
        ranges.push(DeletionRange::new(start, end));
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_deletions;

    fn trim(text: &str) -> String {
        let snapshot = TextSnapshot::new(text);
        apply_deletions(text, &scan_ranges(&snapshot)).unwrap()
    }

    #[test]
    fn strips_spaces_and_tabs_before_lf() {
        let snapshot = TextSnapshot::new("foo  \nbar\t\n");
        assert_eq!(
            scan_ranges(&snapshot),
            vec![DeletionRange::new(3, 5), DeletionRange::new(9, 10)]
        );
        assert_eq!(trim("foo  \nbar\t\n"), "foo\nbar\n");
    }

    #[test]
    fn strips_before_every_terminator_kind() {
        assert_eq!(trim("a \r\nb\t\rc\x0B\u{2029}d\x0C"), "a\r\nb\rc\u{2029}d");
    }

    #[test]
    fn keeps_interior_whitespace() {
        assert_eq!(trim("a  b \t c  \n"), "a  b \t c\n");
    }

    #[test]
    fn whitespace_only_lines_become_empty() {
        assert_eq!(trim("   \n\t\n  "), "\n\n");
    }

    #[test]
    fn no_trailing_whitespace_yields_nothing() {
        let snapshot = TextSnapshot::new("clean\nlines\n");
        assert!(scan_ranges(&snapshot).is_empty());
        assert!(scan_ranges(&TextSnapshot::new("")).is_empty());
    }

    #[test]
    fn offsets_are_chars_not_bytes() {
        let snapshot = TextSnapshot::new("ünï  \nçödé\t");
        assert_eq!(
            scan_ranges(&snapshot),
            vec![DeletionRange::new(3, 5), DeletionRange::new(10, 11)]
        );
    }

    #[test]
    fn non_breaking_space_is_not_trimmed() {
        assert_eq!(trim("a\u{00A0}\n"), "a\u{00A0}\n");
    }

    #[test]
    fn diff_language_is_skipped() {
        let scanner = TrailingWhitespaceScanner::default();
        let snapshot = TextSnapshot::new("+added  \n \n-removed\t\n");
        assert!(scanner.scan(&snapshot, Some("diff")).is_empty());
        assert_eq!(scanner.scan(&snapshot, Some("rust")).len(), 3);
        assert_eq!(scanner.scan(&snapshot, None).len(), 3);
    }

    #[test]
    fn custom_skip_list() {
        let scanner = TrailingWhitespaceScanner::new(vec!["markdown".to_string()]);
        assert!(scanner.skips(Some("markdown")));
        assert!(!scanner.skips(Some("diff")));
        assert!(!scanner.skips(None));
    }
}
