//! Edit primitives exchanged with the host.
//!
//! Offsets are chars in the coordinates of the snapshot the edit was computed
//! against. Deletions come in ascending, non-overlapping order and are
//! applied in one forward pass.

use serde::Serialize;

use crate::error::EngineError;

/// Half-open `[start, end)` range of chars to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DeletionRange {
    pub start: usize,
    pub end: usize,
}

impl DeletionRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "deletion range {start}..{end} is reversed");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Text to insert at a char offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insertion {
    pub offset: usize,
    pub text: String,
}

/// Total number of chars removed by `ranges`.
pub fn removed_chars(ranges: &[DeletionRange]) -> usize {
    ranges.iter().map(DeletionRange::len).sum()
}

/// Apply ascending, non-overlapping deletions in a single pass.
///
/// Ranges past the end of `text` are rejected before anything is built.
pub fn apply_deletions(text: &str, ranges: &[DeletionRange]) -> Result<String, EngineError> {
    if ranges.is_empty() {
        return Ok(text.to_string());
    }

    let char_len = text.chars().count();
    let mut previous_end = 0;
    for range in ranges {
        if range.start < previous_end || range.start > range.end {
            return Err(EngineError::InvalidState(format!(
                "deletion {}..{} overlaps or precedes offset {previous_end}",
                range.start, range.end
            )));
        }
        if range.end > char_len {
            return Err(EngineError::offset(range.end, char_len));
        }
        previous_end = range.end;
    }

    let mut result = String::with_capacity(text.len());
    let mut pending = ranges.iter().peekable();
    for (offset, ch) in text.chars().enumerate() {
        while pending.next_if(|range| range.end <= offset).is_some() {}
        match pending.peek() {
            Some(range) if range.start <= offset => {}
            _ => result.push(ch),
        }
    }
    Ok(result)
}

/// Insert `insertion.text` at `insertion.offset`.
pub fn apply_insertion(text: &str, insertion: &Insertion) -> Result<String, EngineError> {
    let char_len = text.chars().count();
    if insertion.offset > char_len {
        return Err(EngineError::offset(insertion.offset, char_len));
    }
    let byte = text
        .char_indices()
        .nth(insertion.offset)
        .map_or(text.len(), |(byte, _)| byte);

    let mut result = String::with_capacity(text.len() + insertion.text.len());
    result.push_str(&text[..byte]);
    result.push_str(&insertion.text);
    result.push_str(&text[byte..]);
    Ok(result)
}
