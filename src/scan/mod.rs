//! Scanners that compute deletions over a [`TextSnapshot`](crate::text::TextSnapshot).
//!
//! - [`trailing`]: horizontal whitespace before every line terminator.
//! - [`blank_tail`]: surplus blank lines at the end of the buffer.
//!
//! Both scanners are total: they never fail on a well-formed snapshot and
//! report ranges in original-snapshot coordinates.

pub mod blank_tail;
pub mod trailing;

pub use blank_tail::{BlankPolicy, BlankTailScanner};
pub use trailing::TrailingWhitespaceScanner;

/// Horizontal whitespace removed before a line end: tab, vertical tab,
/// form feed and space.
pub const TRAILING_WHITESPACE: [char; 4] = ['\t', '\u{0B}', '\u{0C}', ' '];

pub fn is_trailing_whitespace(ch: char) -> bool {
    TRAILING_WHITESPACE.contains(&ch)
}

/// Length in chars of `content` once its trailing whitespace run is removed.
pub fn trimmed_len(content: &str) -> usize {
    content
        .trim_end_matches(is_trailing_whitespace)
        .chars()
        .count()
}
