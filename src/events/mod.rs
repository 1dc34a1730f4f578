//! Session events and the sinks that record them.
//!
//! A [`TrimSession`](crate::session::TrimSession) reports each state
//! transition to an injectable [`EventSink`]. Sinks are optional: the engine
//! behaves identically with [`NullSink`]. The [`JsonlSink`] appends one JSON
//! object per line to `~/.trimsave/events.jsonl` (or a configured path) and
//! is read back by [`reporter`] for `trimsave stats`.
//!
//! All file I/O here is best-effort. A failure to log never fails a trim.

pub mod reporter;

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A state transition of one trim session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    Subscribed,
    Unsubscribed,
    /// `begin_trim` entered; the session is capturing.
    TrimStarted {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        language: Option<String>,
    },
    /// A capture from an earlier trim was never restored and is dropped.
    CaptureDiscarded { line: usize },
    Captured { line: usize, chars: usize },
    /// `begin_trim` finished; the session awaits the restore.
    Trimmed {
        deletions: usize,
        removed_chars: usize,
        language_skipped: bool,
    },
    Restored { offset: usize, chars: usize },
    RestoreSkipped { reason: String },
}

/// Receives session events. Implementations must not panic.
pub trait EventSink: Send + Sync {
    fn record(&self, buffer: u64, event: &SessionEvent);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _buffer: u64, _event: &SessionEvent) {}
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(u64, SessionEvent)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(u64, SessionEvent)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events for one buffer, in order.
    pub fn events_for(&self, buffer: u64) -> Vec<SessionEvent> {
        self.events()
            .into_iter()
            .filter(|(b, _)| *b == buffer)
            .map(|(_, event)| event)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn record(&self, buffer: u64, event: &SessionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push((buffer, event.clone()));
        }
    }
}

// ---------------------------------------------------------------------------
// JSONL log
// ---------------------------------------------------------------------------

/// One line of the JSONL event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub buffer: u64,
    #[serde(flatten)]
    pub event: SessionEvent,
}

/// Appends events to a JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sink writing to `~/.trimsave/events.jsonl`, if a home directory exists.
    pub fn default_location() -> Option<Self> {
        default_log_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlSink {
    fn record(&self, buffer: u64, event: &SessionEvent) {
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            buffer,
            event: event.clone(),
        };
        let _ = append_entry(&self.path, &entry);
    }
}

fn append_entry(path: &Path, entry: &LogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Path of the default event log: `~/.trimsave/events.jsonl`.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".trimsave").join("events.jsonl"))
}

/// Expand a leading `~/` against the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

// ---------------------------------------------------------------------------
// Reading the log
// ---------------------------------------------------------------------------

/// Read all entries from a JSONL log.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries(path: &Path) -> Vec<LogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<LogEntry>(&line).ok())
        .collect()
}

/// Read entries from the last `days` days, or all of them if `days` is `None`.
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<LogEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    entries
        .into_iter()
        .filter(|entry| entry.timestamp >= cutoff)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
