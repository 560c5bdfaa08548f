//! Line/column rendering for byte offsets into source text.

use std::fmt::{Display, Formatter};

/// A 1-based line and column pair, computed from a byte offset into the
/// original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Compute the position of `pointer` (a byte offset) within `text`.
    ///
    /// `text` is assumed to be valid UTF-8, consistent with the rest of the
    /// toolkit's treatment of input as text rather than arbitrary bytes.
    pub fn of(text: &[u8], pointer: usize) -> Self {
        let bound = pointer.min(text.len());
        let mut line = 1usize;
        let mut last_break = None;
        for (i, b) in text[..bound].iter().enumerate() {
            if *b == b'\n' {
                line += 1;
                last_break = Some(i);
            }
        }
        let column_start = last_break.map_or(0, |i| i + 1);
        let column = String::from_utf8_lossy(&text[column_start..bound]).chars().count() + 1;
        Position::new(line, column)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}
