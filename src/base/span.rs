//! Byte offsets and line/column conversion.

use rustc_hash::FxHashMap;

use super::position::{Position, Span};

pub use text_size::{TextRange, TextSize};

/// A zero-based line and column, column counted in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// A character whose UTF-8 and UTF-16 lengths differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WideChar {
    /// Byte offset of the character relative to the start of its line.
    start: u32,
    len_utf8: u32,
    len_utf16: u32,
}

/// Maps byte offsets to line/column pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    len: TextSize,
    line_starts: Vec<TextSize>,
    wide_chars: FxHashMap<u32, Vec<WideChar>>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        let mut wide_chars: FxHashMap<u32, Vec<WideChar>> = FxHashMap::default();
        let mut line = 0u32;
        let mut line_start = 0usize;

        for (offset, ch) in text.char_indices() {
            if ch == '\n' {
                line += 1;
                line_start = offset + 1;
                line_starts.push(TextSize::new(line_start as u32));
                continue;
            }
            let len_utf8 = ch.len_utf8() as u32;
            if len_utf8 > 1 {
                wide_chars.entry(line).or_default().push(WideChar {
                    start: (offset - line_start) as u32,
                    len_utf8,
                    len_utf16: ch.len_utf16() as u32,
                });
            }
        }

        Self {
            len: TextSize::of(text),
            line_starts,
            wide_chars,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a line/column pair. Offsets past the end of
    /// the text clamp to the end.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let byte_col = u32::from(offset - self.line_starts[line]);
        LineCol {
            line: line as u32,
            col: self.utf16_col(line as u32, byte_col),
        }
    }

    pub fn position(&self, offset: TextSize) -> Position {
        let lc = self.line_col(offset);
        Position::new(lc.line, lc.col)
    }

    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.position(range.start()), self.position(range.end()))
    }

    fn utf16_col(&self, line: u32, byte_col: u32) -> u32 {
        let Some(chars) = self.wide_chars.get(&line) else {
            return byte_col;
        };
        let mut col = byte_col;
        for ch in chars {
            if ch.start >= byte_col {
                break;
            }
            col -= ch.len_utf8 - ch.len_utf16;
        }
        col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_ascii() {
        let index = LineIndex::new("syntax = \"proto3\";\nmessage Foo {}\n");
        assert_eq!(index.line_col(TextSize::new(0)), LineCol { line: 0, col: 0 });
        assert_eq!(index.line_col(TextSize::new(19)), LineCol { line: 1, col: 0 });
        assert_eq!(index.line_col(TextSize::new(27)), LineCol { line: 1, col: 8 });
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_line_col_counts_utf16_units() {
        // 'é' is 2 bytes / 1 unit, '𝄞' is 4 bytes / 2 units
        let text = "// é𝄞 x";
        let index = LineIndex::new(text);
        let x = text.find('x').unwrap() as u32;
        assert_eq!(index.line_col(TextSize::new(x)), LineCol { line: 0, col: 7 });
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let index = LineIndex::new("ab");
        assert_eq!(index.line_col(TextSize::new(99)), LineCol { line: 0, col: 2 });
    }
}
