use line_index::{LineIndex, TextSize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based line/column pair. The column counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets of one text to [`Location`]s.
///
/// Build it once per file and query it for every diagnostic; the line table is
/// computed up front.
///
/// ```
/// use ferroloc_syntax::location::{Location, LocationMapper};
///
/// let text = "first\nsecond";
/// let mapper = LocationMapper::new(text);
/// assert_eq!(mapper.locate(0), Location::new(1, 1));
/// assert_eq!(mapper.locate(8), Location::new(2, 3));
/// assert_eq!(mapper.locate(text.len()), Location::new(2, 7));
/// ```
pub struct LocationMapper<'a> {
    text: &'a str,
    index: LineIndex,
}

impl<'a> LocationMapper<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            index: LineIndex::new(text),
        }
    }

    /// Locates `offset`. Offsets past the end are clamped to end-of-file and
    /// offsets inside a multi-byte character snap back to its first byte.
    pub fn locate(&self, offset: usize) -> Location {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }

        let size = u32::try_from(offset).map(TextSize::from).unwrap_or_default();
        let line_col = self.index.line_col(size);
        let line_start = offset - line_col.col as usize;
        let column = self.text[line_start..offset].chars().count();

        Location {
            line: line_col.line + 1,
            column: column as u32 + 1,
        }
    }
}

/// One-shot convenience over [`LocationMapper`].
pub fn locate(text: &str, offset: usize) -> Location {
    LocationMapper::new(text).locate(offset)
}
