//! Event log reporter: aggregation for `trimsave stats`.

use std::collections::HashSet;
use std::path::Path;

use crate::events::{self, LogEntry, SessionEvent};

/// Summary statistics over the event log.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Stats {
    /// Completed `begin_trim` calls.
    pub trims: usize,
    /// Distinct buffers seen.
    pub buffers: usize,
    pub deletions: usize,
    pub removed_chars: usize,
    /// Trims whose trailing pass was skipped for the document's language.
    pub language_skips: usize,
    pub captures: usize,
    pub discarded_captures: usize,
    pub restores: usize,
    pub skipped_restores: usize,
}

impl Stats {
    /// Share of captures that were restored, 0.0–100.0.
    pub fn restore_pct(&self) -> f64 {
        if self.captures == 0 {
            0.0
        } else {
            (self.restores as f64 / self.captures as f64) * 100.0
        }
    }

    /// Average chars removed per trim.
    pub fn avg_removed_chars(&self) -> f64 {
        if self.trims == 0 {
            0.0
        } else {
            self.removed_chars as f64 / self.trims as f64
        }
    }
}

/// Compute stats from the log at `path`, optionally limited to the last
/// `days` days.
pub fn compute_stats(path: &Path, days: Option<u32>) -> Stats {
    let entries = events::read_entries_since_days(path, days);
    build_stats(&entries)
}

pub fn build_stats(entries: &[LogEntry]) -> Stats {
    let mut stats = Stats::default();
    let mut buffers = HashSet::new();

    for entry in entries {
        buffers.insert(entry.buffer);
        match &entry.event {
            SessionEvent::Trimmed {
                deletions,
                removed_chars,
                language_skipped,
            } => {
                stats.trims += 1;
                stats.deletions += deletions;
                stats.removed_chars += removed_chars;
                if *language_skipped {
                    stats.language_skips += 1;
                }
            }
            SessionEvent::Captured { .. } => stats.captures += 1,
            SessionEvent::CaptureDiscarded { .. } => stats.discarded_captures += 1,
            SessionEvent::Restored { .. } => stats.restores += 1,
            SessionEvent::RestoreSkipped { .. } => stats.skipped_restores += 1,
            SessionEvent::Subscribed
            | SessionEvent::Unsubscribed
            | SessionEvent::TrimStarted { .. } => {}
        }
    }

    stats.buffers = buffers.len();
    stats
}
