use crate::error::EngineError;
use crate::text::LineTerminator;

/// One line of a snapshot.
///
/// `start..end` is the line's content in chars; the terminator follows at
/// `end`. The byte fields address the same content in the backing string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub start: usize,
    pub end: usize,
    pub terminator: LineTerminator,
    pub(crate) byte_start: usize,
    pub(crate) byte_end: usize,
}

impl Line {
    /// Content length in chars.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Offset of the first char of the next line (or the buffer end).
    pub fn next_start(&self) -> usize {
        self.end + self.terminator.char_len()
    }
}

/// Maps char offsets to lines and back, built in one pass over the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOffsetIndex {
    lines: Vec<Line>,
    char_len: usize,
}

impl LineOffsetIndex {
    pub fn build(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        let mut byte_start = 0;
        let mut offset = 0;

        let mut chars = text.char_indices().peekable();
        while let Some((byte, ch)) = chars.next() {
            let terminator = match ch {
                '\n' => LineTerminator::Lf,
                '\r' => {
                    if chars.next_if(|&(_, next)| next == '\n').is_some() {
                        LineTerminator::CrLf
                    } else {
                        LineTerminator::Cr
                    }
                }
                '\u{2029}' => LineTerminator::ParagraphSeparator,
                _ => {
                    offset += 1;
                    continue;
                }
            };

            lines.push(Line {
                start,
                end: offset,
                terminator,
                byte_start,
                byte_end: byte,
            });
            offset += terminator.char_len();
            start = offset;
            byte_start = byte + terminator.byte_len();
        }

        lines.push(Line {
            start,
            end: offset,
            terminator: LineTerminator::EndOfBuffer,
            byte_start,
            byte_end: text.len(),
        });

        Self {
            lines,
            char_len: offset,
        }
    }

    /// Number of lines; at least one.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Offset of the buffer end.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, line: usize) -> Result<&Line, EngineError> {
        self.lines
            .get(line)
            .ok_or_else(|| EngineError::line(line, self.lines.len()))
    }

    pub fn last_line(&self) -> &Line {
        // `build` always pushes the final line.
        &self.lines[self.lines.len() - 1]
    }

    /// Line containing `offset`. Offsets on a terminator belong to the line
    /// it ends; the buffer end belongs to the last line.
    pub fn line_of(&self, offset: usize) -> Result<usize, EngineError> {
        if offset > self.char_len {
            return Err(EngineError::offset(offset, self.char_len));
        }
        Ok(self.lines.partition_point(|line| line.start <= offset) - 1)
    }

    /// `(start, end)` of a line's content, excluding the terminator.
    pub fn line_range(&self, line: usize) -> Result<(usize, usize), EngineError> {
        self.line(line).map(|line| (line.start, line.end))
    }

    /// `(line, column)` of an offset. The column may exceed the content
    /// length by one when the offset sits between the two chars of a CRLF.
    pub fn position_of(&self, offset: usize) -> Result<(usize, usize), EngineError> {
        let line = self.line_of(offset)?;
        Ok((line, offset - self.lines[line].start))
    }

    /// Offset of `column` on `line`; the column may point at the content end.
    pub fn offset_of(&self, line: usize, column: usize) -> Result<usize, EngineError> {
        let line = self.line(line)?;
        if column > line.len() {
            return Err(EngineError::column(column, line.len()));
        }
        Ok(line.start + column)
    }

    /// Whether `offset` is the first position of some line.
    pub fn starts_line(&self, offset: usize) -> bool {
        self.line_of(offset)
            .is_ok_and(|line| self.lines[line].start == offset)
    }
}
