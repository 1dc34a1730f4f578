//! Trim sessions: one trim-then-restore cycle per save.
//!
//! ```text
//! Idle ──begin_trim──▶ Capturing ──▶ AwaitingRestore ──complete_restore──▶ Idle
//! ```
//!
//! The host calls [`TrimSession::begin_trim`] before persisting and applies
//! the returned deletions as one edit group. After persisting (whether or
//! not the write succeeded) it calls [`TrimSession::complete_restore`] with
//! the buffer as it is now, applies the insertion if one is returned and
//! clears the modified flag when asked to.
//!
//! At most one capture lives in a session. A second `begin_trim` without a
//! restore in between discards the first capture.

pub mod registry;

use std::sync::Arc;

use crate::cursor::{self, CapturedCursorWhitespace, RestorePlan};
use crate::edit::{self, DeletionRange, Insertion};
use crate::error::EngineError;
use crate::events::{EventSink, NullSink, SessionEvent};
use crate::scan::{BlankPolicy, BlankTailScanner, TrailingWhitespaceScanner};
use crate::scan::trailing::DEFAULT_SKIP_LANGUAGES;
use crate::text::TextSnapshot;

pub use registry::{BufferId, SessionRegistry, SubscriptionHandle};

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Which passes a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOptions {
    pub trailing_whitespace: bool,
    pub blank_tail: bool,
    pub preserve_cursor: bool,
    /// Language identifiers whose trailing whitespace is left alone.
    pub skip_languages: Vec<String>,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            trailing_whitespace: true,
            blank_tail: true,
            preserve_cursor: true,
            skip_languages: DEFAULT_SKIP_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Output of [`TrimSession::begin_trim`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrimResult {
    /// Ascending and non-overlapping, in the coordinates of the snapshot
    /// passed to `begin_trim`.
    pub deletions: Vec<DeletionRange>,
    /// The trailing whitespace pass was suppressed for the document language.
    pub language_skipped: bool,
}

impl TrimResult {
    pub fn removed_chars(&self) -> usize {
        edit::removed_chars(&self.deletions)
    }

    pub fn is_noop(&self) -> bool {
        self.deletions.is_empty()
    }
}

/// Output of [`TrimSession::complete_restore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreResult {
    pub insertion: Option<Insertion>,
    /// Clear the buffer's modified flag after applying the insertion.
    pub clear_modified_flag: bool,
}

impl RestoreResult {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Where a session is in its cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Capturing,
    AwaitingRestore {
        capture: Option<CapturedCursorWhitespace>,
    },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Trim state for a single buffer.
pub struct TrimSession {
    buffer: BufferId,
    options: TrimOptions,
    scanner: TrailingWhitespaceScanner,
    state: SessionState,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for TrimSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrimSession")
            .field("buffer", &self.buffer)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl TrimSession {
    pub fn new(buffer: BufferId, options: TrimOptions) -> Self {
        Self::with_sink(buffer, options, Arc::new(NullSink))
    }

    pub fn with_sink(buffer: BufferId, options: TrimOptions, sink: Arc<dyn EventSink>) -> Self {
        let scanner = TrailingWhitespaceScanner::new(options.skip_languages.iter().cloned());
        Self {
            buffer,
            options,
            scanner,
            state: SessionState::Idle,
            sink,
        }
    }

    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    pub fn options(&self) -> &TrimOptions {
        &self.options
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The capture waiting for [`complete_restore`](Self::complete_restore).
    pub fn pending_capture(&self) -> Option<&CapturedCursorWhitespace> {
        match &self.state {
            SessionState::AwaitingRestore { capture } => capture.as_ref(),
            _ => None,
        }
    }

    /// Compute the deletions for `snapshot` and capture the whitespace before
    /// `cursor` when it is about to be deleted.
    ///
    /// Fails with `OutOfBounds` when `cursor` lies past the buffer end; the
    /// session state is left untouched in that case.
    pub fn begin_trim(
        &mut self,
        snapshot: &TextSnapshot,
        cursor: Option<usize>,
        language_id: Option<&str>,
    ) -> Result<TrimResult, EngineError> {
        if let Some(cursor) = cursor {
            snapshot.index().line_of(cursor)?;
        }

        let (deletions, language_skipped) = self.compute_deletions(snapshot, language_id);

        let trailing_active = self.options.trailing_whitespace && !language_skipped;
        let capture = match cursor {
            Some(cursor) if trailing_active && self.options.preserve_cursor => {
                cursor::capture(snapshot, cursor, &deletions)?
            }
            _ => None,
        };

        if let SessionState::AwaitingRestore {
            capture: Some(stale),
        } = &self.state
        {
            self.emit(SessionEvent::CaptureDiscarded { line: stale.line });
        }
        self.state = SessionState::Capturing;
        self.emit(SessionEvent::TrimStarted {
            language: language_id.map(str::to_string),
        });

        if let Some(captured) = &capture {
            self.emit(SessionEvent::Captured {
                line: captured.line,
                chars: captured.text.chars().count(),
            });
        }

        let result = TrimResult {
            deletions,
            language_skipped,
        };
        self.emit(SessionEvent::Trimmed {
            deletions: result.deletions.len(),
            removed_chars: result.removed_chars(),
            language_skipped,
        });
        self.state = SessionState::AwaitingRestore { capture };

        Ok(result)
    }

    /// Finish the cycle against `current`, the buffer after the save.
    ///
    /// A no-op from `Idle`. Always leaves the session `Idle`.
    pub fn complete_restore(&mut self, current: &TextSnapshot) -> RestoreResult {
        let capture = match std::mem::take(&mut self.state) {
            SessionState::AwaitingRestore {
                capture: Some(capture),
            } => capture,
            _ => return RestoreResult::none(),
        };

        match cursor::plan_restore(&capture, current) {
            RestorePlan::Insert(insertion) => {
                self.emit(SessionEvent::Restored {
                    offset: insertion.offset,
                    chars: insertion.text.chars().count(),
                });
                RestoreResult {
                    insertion: Some(insertion),
                    clear_modified_flag: true,
                }
            }
            RestorePlan::Skip(reason) => {
                self.emit(SessionEvent::RestoreSkipped {
                    reason: reason.to_string(),
                });
                RestoreResult::none()
            }
        }
    }

    /// End the cycle without restoring, for a trim that is never written.
    /// Leaves the session `Idle`.
    pub fn abandon(&mut self) {
        if let SessionState::AwaitingRestore {
            capture: Some(stale),
        } = std::mem::take(&mut self.state)
        {
            self.emit(SessionEvent::CaptureDiscarded { line: stale.line });
        }
    }

    /// Trailing runs plus the blank tail, merged into one ascending list.
    fn compute_deletions(
        &self,
        snapshot: &TextSnapshot,
        language_id: Option<&str>,
    ) -> (Vec<DeletionRange>, bool) {
        let language_skipped = self.options.trailing_whitespace && self.scanner.skips(language_id);
        let trailing_active = self.options.trailing_whitespace && !language_skipped;

        let mut deletions = if trailing_active {
            self.scanner.scan(snapshot, language_id)
        } else {
            Vec::new()
        };

        if self.options.blank_tail {
            let policy = if trailing_active {
                BlankPolicy::WhitespaceOnly
            } else {
                BlankPolicy::EmptyOnly
            };
            if let Some(tail) = BlankTailScanner::new(policy).scan(snapshot) {
                deletions.retain(|range| range.start < tail.start);
                deletions.push(tail);
            }
        }

        (deletions, language_skipped)
    }

    fn emit(&self, event: SessionEvent) {
        self.sink.record(self.buffer.0, &event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
