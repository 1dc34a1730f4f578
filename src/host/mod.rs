//! Host adapter: the save cycle around a [`SessionRegistry`].
//!
//! A host keeps its buffers as [`Document`]s and persists them through a
//! [`Persist`] implementation. [`save_document`] brackets the write with the
//! two session calls:
//!
//! 1. `begin_trim` on the current text, deletions applied as one edit group
//! 2. the write itself
//! 3. `complete_restore` on the written text, run even if the write failed
//!
//! Documents whose buffer is not subscribed are written untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::edit::{self, DeletionRange, Insertion};
use crate::error::EngineError;
use crate::session::{BufferId, SessionRegistry, TrimOptions, TrimResult, TrimSession};
use crate::text::TextSnapshot;

/// File names whose contents are patches.
static PATCH_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:diff|patch|rej)$").expect("patch file regex must compile")
});

/// Language identifier for a file name, as far as trimming cares.
pub fn detect_language(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    PATCH_FILE_RE.is_match(name).then_some("diff")
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// An editable buffer with a cursor and a modified flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: BufferId,
    text: String,
    cursor: Option<usize>,
    language: Option<String>,
    modified: bool,
}

impl Document {
    pub fn new(id: BufferId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            cursor: None,
            language: None,
            modified: false,
        }
    }

    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    pub fn snapshot(&self) -> TextSnapshot {
        TextSnapshot::new(self.text.as_str())
    }

    /// Replace the whole text, as typing would.
    pub fn replace_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.modified = true;
        let len = self.text.chars().count();
        self.cursor = self.cursor.map(|cursor| cursor.min(len));
    }

    /// Apply deletions as one edit group. A cursor inside a deleted range
    /// moves to the range start.
    pub fn apply_deletions(&mut self, ranges: &[DeletionRange]) -> Result<(), EngineError> {
        if ranges.iter().all(DeletionRange::is_empty) {
            return Ok(());
        }
        self.text = edit::apply_deletions(&self.text, ranges)?;
        self.modified = true;

        if let Some(cursor) = self.cursor {
            let removed_before: usize = ranges
                .iter()
                .map(|range| range.end.min(cursor).saturating_sub(range.start))
                .sum();
            self.cursor = Some(cursor - removed_before);
        }
        Ok(())
    }

    /// Insert text. A cursor at or after the insertion point moves with it.
    pub fn insert(&mut self, insertion: &Insertion) -> Result<(), EngineError> {
        self.text = edit::apply_insertion(&self.text, insertion)?;
        self.modified = true;

        if let Some(cursor) = self.cursor
            && cursor >= insertion.offset
        {
            self.cursor = Some(cursor + insertion.text.chars().count());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Where a saved document goes.
pub trait Persist {
    fn persist(&mut self, text: &str) -> Result<()>;
}

/// Writes the text to a file.
#[derive(Debug, Clone)]
pub struct FilePersist {
    path: PathBuf,
}

impl FilePersist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persist for FilePersist {
    fn persist(&mut self, text: &str) -> Result<()> {
        fs::write(&self.path, text)
            .with_context(|| format!("failed writing {}", self.path.display()))
    }
}

/// Keeps every saved text in memory; can be told to fail.
#[derive(Debug, Default, Clone)]
pub struct MemoryPersist {
    pub saved: Vec<String>,
    pub fail: bool,
}

impl Persist for MemoryPersist {
    fn persist(&mut self, text: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("simulated write failure");
        }
        self.saved.push(text.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Save cycle
// ---------------------------------------------------------------------------

/// What one save did to the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// The buffer had a session; otherwise nothing was trimmed.
    pub trimmed: bool,
    pub deletions: usize,
    pub removed_chars: usize,
    pub language_skipped: bool,
    pub restored: Option<Insertion>,
}

/// Trim, persist and restore `doc`.
///
/// A failed write is reported after the restore has run, so the user's
/// in-progress whitespace comes back either way. The modified flag is
/// cleared only when the write succeeded.
pub fn save_document(
    registry: &mut SessionRegistry,
    doc: &mut Document,
    persist: &mut dyn Persist,
) -> Result<SaveReport> {
    let Some(session) = registry.session_mut(doc.id()) else {
        persist.persist(doc.text())?;
        doc.set_modified(false);
        return Ok(SaveReport::default());
    };

    let trim = session
        .begin_trim(&doc.snapshot(), doc.cursor(), doc.language())
        .with_context(|| format!("failed to trim {}", doc.id()))?;
    if let Err(err) = doc.apply_deletions(&trim.deletions) {
        session.abandon();
        return Err(err.into());
    }

    let written = persist.persist(doc.text());
    if written.is_ok() {
        doc.set_modified(false);
    }
    let modified_after_write = doc.is_modified();

    let restore = session.complete_restore(&doc.snapshot());
    if let Some(insertion) = &restore.insertion {
        doc.insert(insertion)?;
    }
    if restore.clear_modified_flag {
        doc.set_modified(modified_after_write);
    }

    written?;
    Ok(SaveReport {
        trimmed: true,
        deletions: trim.deletions.len(),
        removed_chars: trim.removed_chars(),
        language_skipped: trim.language_skipped,
        restored: restore.insertion,
    })
}

/// Trim `doc` through its session without changing or writing it.
///
/// The session ends `Idle`; any cursor capture is discarded.
pub fn check_document(
    registry: &mut SessionRegistry,
    doc: &Document,
) -> Result<TrimResult, EngineError> {
    let Some(session) = registry.session_mut(doc.id()) else {
        return Ok(TrimResult::default());
    };
    let trim = session.begin_trim(&doc.snapshot(), doc.cursor(), doc.language())?;
    session.abandon();
    Ok(trim)
}

/// Trim `text` once with a throwaway session, as a save would leave the
/// buffer: whitespace typed up to `cursor` is put back after trimming.
pub fn trim_text(
    text: &str,
    cursor: Option<usize>,
    language: Option<&str>,
    options: &TrimOptions,
) -> Result<String, EngineError> {
    let mut session = TrimSession::new(BufferId(0), options.clone());
    let result = session.begin_trim(&TextSnapshot::new(text), cursor, language)?;
    let trimmed = edit::apply_deletions(text, &result.deletions)?;

    match session
        .complete_restore(&TextSnapshot::new(trimmed.as_str()))
        .insertion
    {
        Some(insertion) => edit::apply_insertion(&trimmed, &insertion),
        None => Ok(trimmed),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
