//! Blank tail scanner: surplus blank lines at the end of a buffer.
//!
//! The last non-blank line keeps its terminator; everything after it goes.
//! A buffer that does not end on a blank line has no blank tail, and a
//! buffer made only of blank lines is deleted completely.

use crate::edit::DeletionRange;
use crate::scan::trimmed_len;
use crate::text::TextSnapshot;

/// Which lines count as blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlankPolicy {
    /// Only lines with no content at all.
    #[default]
    EmptyOnly,
    /// Also lines holding nothing but trailing whitespace. Used when the
    /// trailing whitespace pass runs first, so the tail is judged on the
    /// text as it will be once that pass is applied.
    WhitespaceOnly,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlankTailScanner {
    policy: BlankPolicy,
}

impl BlankTailScanner {
    pub fn new(policy: BlankPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> BlankPolicy {
        self.policy
    }

    /// The single range covering the blank tail, if it is non-empty.
    pub fn scan(&self, snapshot: &TextSnapshot) -> Option<DeletionRange> {
        let lines = snapshot.index().lines();
        let end = snapshot.char_len();
        let last = lines.len() - 1;

        if !self.is_blank(snapshot, last) {
            return None;
        }

        let cut = (0..last)
            .rev()
            .find(|&line| !self.is_blank(snapshot, line))
            .map_or(0, |line| lines[line].next_start());

        (cut < end).then(|| DeletionRange::new(cut, end))
    }

    fn is_blank(&self, snapshot: &TextSnapshot, line: usize) -> bool {
        match self.policy {
            BlankPolicy::EmptyOnly => snapshot.index().lines()[line].is_empty(),
            BlankPolicy::WhitespaceOnly => snapshot
                .line_content(line)
                .is_ok_and(|content| trimmed_len(content) == 0),
        }
    }
}
