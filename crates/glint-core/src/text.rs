//! Line bookkeeping for bounds checks.
//!
//! The analysis never reads source text. It only needs to know how many lines
//! the file has and how long each one is, so that spans handed over by the
//! provider can be checked against the file they claim to describe.

use serde::{Deserialize, Serialize};

use crate::span::{Position, SourceSpan};

/// Per-line lengths of a source file, in chars, excluding line terminators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIndex {
    lengths: Vec<u32>,
}

impl LineIndex {
    /// Build the index from source text.
    ///
    /// `\n`, `\r\n` and lone `\r` all end a line. A trailing newline does not
    /// start a new, empty line of its own, but the position just past it is
    /// still considered in bounds (see [`LineIndex::contains`]).
    pub fn from_source(source: &str) -> Self {
        let mut lengths = Vec::new();
        let mut current = 0u32;
        let mut chars = source.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\n' => {
                    lengths.push(current);
                    current = 0;
                }
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    lengths.push(current);
                    current = 0;
                }
                _ => current += 1,
            }
        }
        if current > 0 || lengths.is_empty() {
            lengths.push(current);
        }
        LineIndex { lengths }
    }

    /// Number of lines in the file.
    pub fn line_count(&self) -> u32 {
        self.lengths.len() as u32
    }

    /// Length of a 1-indexed line, or `None` if the line does not exist.
    pub fn line_len(&self, line: u32) -> Option<u32> {
        if line == 0 {
            return None;
        }
        self.lengths.get(line as usize - 1).copied()
    }

    /// True if `pos` names a real character position or the position just past
    /// the end of a line. The first column of the line after the last one is
    /// also accepted, since a node ending with a newline ends there.
    pub fn contains(&self, pos: Position) -> bool {
        if pos.col == 0 {
            return false;
        }
        match self.line_len(pos.line) {
            Some(len) => pos.col <= len + 1,
            None => pos.line == self.line_count() + 1 && pos.col == 1,
        }
    }

    /// True if both ends of `span` are in bounds.
    pub fn contains_span(&self, span: &SourceSpan) -> bool {
        self.contains(span.start) && self.contains(span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_lines_and_lengths() {
        let index = LineIndex::from_source("ab\n\ncdef\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_len(1), Some(2));
        assert_eq!(index.line_len(2), Some(0));
        assert_eq!(index.line_len(3), Some(4));
        assert_eq!(index.line_len(4), None);
        assert_eq!(index.line_len(0), None);
    }

    #[test]
    fn no_trailing_newline() {
        let index = LineIndex::from_source("x = 1");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_len(1), Some(5));
    }

    #[test]
    fn crlf_line_endings() {
        let index = LineIndex::from_source("a\r\nbc\r\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_len(2), Some(2));
    }

    #[test]
    fn columns_count_chars() {
        let index = LineIndex::from_source("s = 'ñé'\n");
        assert_eq!(index.line_len(1), Some(8));
    }

    #[test]
    fn bounds() {
        let index = LineIndex::from_source("abc\nd\n");
        assert!(index.contains(Position::new(1, 1)));
        assert!(index.contains(Position::new(1, 4)));
        assert!(!index.contains(Position::new(1, 5)));
        assert!(!index.contains(Position::new(1, 0)));
        assert!(index.contains(Position::new(3, 1)));
        assert!(!index.contains(Position::new(3, 2)));
        assert!(!index.contains(Position::new(9, 1)));
        assert!(index.contains_span(&SourceSpan::new(1, 1, 2, 2)));
        assert!(!index.contains_span(&SourceSpan::new(1, 1, 2, 3)));
    }
}
