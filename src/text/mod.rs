//! Immutable text snapshots and line addressing.
//!
//! A [`TextSnapshot`] owns the full text of a buffer together with its
//! [`LineOffsetIndex`]. All offsets handed in and out of the engine are
//! counted in Unicode scalar values (`char`s), never bytes.
//!
//! A line ends at the first of `\n`, `\r`, `\r\n` (one unit) or U+2029, or at
//! the end of the buffer. A buffer ending with a terminator therefore has an
//! empty last line, and the empty buffer has exactly one (empty) line.

pub mod index;

use crate::error::EngineError;

pub use index::{Line, LineOffsetIndex};

// ---------------------------------------------------------------------------
// Line terminators
// ---------------------------------------------------------------------------

/// How a line ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTerminator {
    Lf,
    Cr,
    CrLf,
    /// U+2029 PARAGRAPH SEPARATOR.
    ParagraphSeparator,
    /// The last line of the buffer, which has no terminator.
    EndOfBuffer,
}

impl LineTerminator {
    /// The terminator's text (empty for [`LineTerminator::EndOfBuffer`]).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Cr => "\r",
            Self::CrLf => "\r\n",
            Self::ParagraphSeparator => "\u{2029}",
            Self::EndOfBuffer => "",
        }
    }

    /// Length in chars.
    pub fn char_len(self) -> usize {
        match self {
            Self::CrLf => 2,
            Self::EndOfBuffer => 0,
            _ => 1,
        }
    }

    /// Length in UTF-8 bytes.
    pub fn byte_len(self) -> usize {
        self.as_str().len()
    }

    /// Whether `ch` can start a line terminator.
    pub fn is_terminator_char(ch: char) -> bool {
        matches!(ch, '\n' | '\r' | '\u{2029}')
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only view of a buffer's text, indexed by line.
#[derive(Debug, Clone)]
pub struct TextSnapshot {
    text: String,
    index: LineOffsetIndex,
}

impl TextSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let index = LineOffsetIndex::build(&text);
        Self { text, index }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn index(&self) -> &LineOffsetIndex {
        &self.index
    }

    /// Total length in chars; also the offset of the buffer end.
    pub fn char_len(&self) -> usize {
        self.index.char_len()
    }

    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text of a line without its terminator.
    pub fn line_content(&self, line: usize) -> Result<&str, EngineError> {
        let line = self.index.line(line)?;
        Ok(&self.text[line.byte_start..line.byte_end])
    }

    /// Text of a line including its terminator.
    pub fn line_with_terminator(&self, line: usize) -> Result<&str, EngineError> {
        let line = self.index.line(line)?;
        let end = line.byte_end + line.terminator.byte_len();
        Ok(&self.text[line.byte_start..end])
    }

    /// Text between two char offsets.
    pub fn slice(&self, start: usize, end: usize) -> Result<&str, EngineError> {
        if start > end {
            return Err(EngineError::offset(start, end));
        }
        let byte_start = self.byte_offset(start)?;
        let byte_end = self.byte_offset(end)?;
        Ok(&self.text[byte_start..byte_end])
    }

    /// Convert a char offset into a byte offset into [`as_str`](Self::as_str).
    pub fn byte_offset(&self, offset: usize) -> Result<usize, EngineError> {
        let line = self.index.line(self.index.line_of(offset)?)?;
        if offset >= line.end {
            // At the content end or in the middle of a CRLF pair; every
            // terminator char before that point is one byte wide.
            return Ok(line.byte_end + (offset - line.end));
        }
        let content = &self.text[line.byte_start..line.byte_end];
        let byte = content
            .char_indices()
            .nth(offset - line.start)
            .map_or(content.len(), |(byte, _)| byte);
        Ok(line.byte_start + byte)
    }
}

impl From<&str> for TextSnapshot {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextSnapshot {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
