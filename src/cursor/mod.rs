//! Cursor whitespace preservation.
//!
//! Before a trim, the whitespace the user typed between the start of the
//! trailing run and the cursor is remembered. After the save it is put back
//! at the end of the same line, together with any blank lines the blank-tail
//! pass removed between that line and the new end of the buffer. The file on
//! disk never contains the restored whitespace.
//!
//! Restoring is guarded: the capture records what the buffer is expected to
//! look like after the trim, and nothing is inserted if the buffer handed to
//! [`plan_restore`] no longer matches.

use serde::Serialize;

use crate::edit::{DeletionRange, Insertion, apply_deletions};
use crate::error::EngineError;
use crate::scan::trimmed_len;
use crate::text::TextSnapshot;

// ---------------------------------------------------------------------------
// Captured state
// ---------------------------------------------------------------------------

/// Whitespace on the cursor's line that the trim is about to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCursorWhitespace {
    /// Cursor line in the pre-trim buffer.
    pub line: usize,
    /// Whitespace between the start of the trailing run and the cursor.
    pub text: String,
    anchor: RestoreAnchor,
}

/// Expected shape of the buffer after the trim.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RestoreAnchor {
    line_count: usize,
    /// Line the capture resolves to once the blank tail is gone.
    resolved_line: usize,
    resolved_content: String,
    /// Terminators the blank-tail pass removed between `resolved_line` and
    /// the captured line, oldest first.
    line_breaks: String,
}

impl CapturedCursorWhitespace {
    /// Number of blank lines that must be recreated before the whitespace.
    pub fn line_delta(&self) -> usize {
        self.line - self.anchor.resolved_line
    }
}

/// Why a restore did not insert anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    LineCountChanged { expected: usize, found: usize },
    LineContentChanged { line: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LineCountChanged { expected, found } => {
                write!(f, "expected {expected} lines after save, found {found}")
            }
            Self::LineContentChanged { line } => write!(f, "line {line} changed after save"),
        }
    }
}

/// Outcome of [`plan_restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestorePlan {
    Insert(Insertion),
    Skip(SkipReason),
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// `(line, whitespace)` the trim would delete between the trailing-run start
/// and `cursor`. The whitespace is empty when the cursor sits before the run.
pub fn whitespace_before_cursor(
    snapshot: &TextSnapshot,
    cursor: usize,
) -> Result<(usize, String), EngineError> {
    let (line, column) = snapshot.index().position_of(cursor)?;
    let content = snapshot.line_content(line)?;

    // A cursor between the chars of a CRLF is at the content end.
    let column = column.min(content.chars().count());
    let run_start = trimmed_len(content);

    let preserved = content
        .chars()
        .skip(run_start)
        .take(column.saturating_sub(run_start))
        .collect();
    Ok((line, preserved))
}

/// Capture the cursor whitespace for a trim that applies `deletions` to
/// `snapshot`. Returns `None` when nothing would need restoring.
pub fn capture(
    snapshot: &TextSnapshot,
    cursor: usize,
    deletions: &[DeletionRange],
) -> Result<Option<CapturedCursorWhitespace>, EngineError> {
    let (line, text) = whitespace_before_cursor(snapshot, cursor)?;
    if text.is_empty() {
        return Ok(None);
    }

    let trimmed = TextSnapshot::new(apply_deletions(snapshot.as_str(), deletions)?);
    let line_count = trimmed.line_count();
    let resolved_line = line.min(line_count - 1);

    let lines = snapshot.index().lines();
    let line_breaks = lines[resolved_line..line]
        .iter()
        .map(|l| l.terminator.as_str())
        .collect();

    Ok(Some(CapturedCursorWhitespace {
        line,
        text,
        anchor: RestoreAnchor {
            line_count,
            resolved_line,
            resolved_content: trimmed.line_content(resolved_line)?.to_string(),
            line_breaks,
        },
    }))
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

/// Compute the insertion that puts the captured whitespace back into
/// `current`, the buffer as it is after the save.
pub fn plan_restore(capture: &CapturedCursorWhitespace, current: &TextSnapshot) -> RestorePlan {
    let anchor = &capture.anchor;

    if current.line_count() != anchor.line_count {
        return RestorePlan::Skip(SkipReason::LineCountChanged {
            expected: anchor.line_count,
            found: current.line_count(),
        });
    }

    let (Ok(line), Ok(content)) = (
        current.index().line(anchor.resolved_line),
        current.line_content(anchor.resolved_line),
    ) else {
        return RestorePlan::Skip(SkipReason::LineContentChanged {
            line: anchor.resolved_line,
        });
    };
    if content != anchor.resolved_content {
        return RestorePlan::Skip(SkipReason::LineContentChanged {
            line: anchor.resolved_line,
        });
    }

    let mut text = String::with_capacity(anchor.line_breaks.len() + capture.text.len());
    text.push_str(&anchor.line_breaks);
    text.push_str(&capture.text);

    RestorePlan::Insert(Insertion {
        offset: line.end,
        text,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_insertion;

    #[test]
    fn captures_whitespace_up_to_cursor() {
        let snapshot = TextSnapshot::new("foo   ");
        assert_eq!(
            whitespace_before_cursor(&snapshot, 5).unwrap(),
            (0, "  ".to_string())
        );
    }

    #[test]
    fn cursor_before_run_captures_nothing() {
        let snapshot = TextSnapshot::new("foo   \n");
        assert_eq!(
            whitespace_before_cursor(&snapshot, 2).unwrap(),
            (0, String::new())
        );
        assert_eq!(
            whitespace_before_cursor(&snapshot, 3).unwrap(),
            (0, String::new())
        );
    }

    #[test]
    fn cursor_on_second_line() {
        let snapshot = TextSnapshot::new("a\n\t b  \nc");
        assert_eq!(
            whitespace_before_cursor(&snapshot, 6).unwrap(),
            (1, " ".to_string())
        );
    }

    #[test]
    fn cursor_inside_crlf_clamps_to_line_end() {
        let snapshot = TextSnapshot::new("x \r\ny");
        assert_eq!(
            whitespace_before_cursor(&snapshot, 3).unwrap(),
            (0, " ".to_string())
        );
    }

    #[test]
    fn cursor_past_end_is_out_of_bounds() {
        let snapshot = TextSnapshot::new("abc");
        assert!(matches!(
            whitespace_before_cursor(&snapshot, 4),
            Err(EngineError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn restores_on_same_line() {
        let snapshot = TextSnapshot::new("foo   ");
        let deletions = [DeletionRange::new(3, 6)];
        let captured = capture(&snapshot, 5, &deletions).unwrap().unwrap();
        assert_eq!(captured.line_delta(), 0);

        let current = TextSnapshot::new("foo");
        let RestorePlan::Insert(insertion) = plan_restore(&captured, &current) else {
            panic!("expected an insertion");
        };
        assert_eq!(insertion.offset, 3);
        assert_eq!(insertion.text, "  ");
    }

    #[test]
    fn recreates_blank_lines_removed_from_tail() {
        let snapshot = TextSnapshot::new("foo\r\n\r\n  \r\n");
        // The blank tail from offset 5 swallows the trailing run on line 2.
        let deletions = [DeletionRange::new(5, 11)];
        let captured = capture(&snapshot, 9, &deletions).unwrap().unwrap();
        assert_eq!(captured.line, 2);
        assert_eq!(captured.line_delta(), 1);

        let current = TextSnapshot::new("foo\r\n");
        let RestorePlan::Insert(insertion) = plan_restore(&captured, &current) else {
            panic!("expected an insertion");
        };
        assert_eq!(insertion.text, "\r\n  ");
        let restored = apply_insertion(current.as_str(), &insertion).unwrap();
        assert_eq!(restored, "foo\r\n\r\n  ");
        assert_eq!(TextSnapshot::new(restored).line_content(2).unwrap(), "  ");
    }

    #[test]
    fn skips_when_line_count_changed() {
        let snapshot = TextSnapshot::new("a\nfoo  \nb");
        let deletions = [DeletionRange::new(5, 7)];
        let captured = capture(&snapshot, 7, &deletions).unwrap().unwrap();

        let current = TextSnapshot::new("a\nfoo\nb\nc");
        assert_eq!(
            plan_restore(&captured, &current),
            RestorePlan::Skip(SkipReason::LineCountChanged {
                expected: 3,
                found: 4,
            })
        );
    }

    #[test]
    fn skips_when_line_content_changed() {
        let snapshot = TextSnapshot::new("a\nfoo  \nb");
        let deletions = [DeletionRange::new(5, 7)];
        let captured = capture(&snapshot, 7, &deletions).unwrap().unwrap();

        let current = TextSnapshot::new("a\nbar\nb");
        assert_eq!(
            plan_restore(&captured, &current),
            RestorePlan::Skip(SkipReason::LineContentChanged { line: 1 })
        );
    }
}
