//! Source positions and spans.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Columns count Unicode scalar values, not bytes
//! - Spans are **half-open**: `end` is the position just past the last character

use serde::{Deserialize, Serialize};

/// A 1-indexed line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, chars).
    pub col: u32,
}

impl Position {
    pub fn new(line: u32, col: u32) -> Self {
        Position { line, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A half-open source range `[start, end)`.
///
/// Ordering is lexicographic on `(start, end)`, which is the order the report
/// uses for its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    /// Create a span from its four scalar coordinates.
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        SourceSpan {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Create a span between two positions.
    pub fn between(start: Position, end: Position) -> Self {
        SourceSpan { start, end }
    }

    /// True when `start <= end`.
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// True if `other` lies entirely within this span.
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if `other` lies within this span without touching either boundary.
    ///
    /// Used for interior comments: a comment that starts exactly where a node
    /// starts is not inside it.
    pub fn strictly_contains(&self, other: &SourceSpan) -> bool {
        self.start < other.start && other.end <= self.end
    }
}

impl std::fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_start_then_end() {
        let a = SourceSpan::new(1, 1, 1, 5);
        let b = SourceSpan::new(1, 1, 2, 1);
        let c = SourceSpan::new(1, 2, 1, 3);
        let mut spans = vec![c, b, a];
        spans.sort();
        assert_eq!(spans, vec![a, b, c]);
    }

    #[test]
    fn containment() {
        let outer = SourceSpan::new(3, 1, 6, 2);
        let inner = SourceSpan::new(4, 5, 4, 9);
        assert!(outer.contains(&inner));
        assert!(outer.strictly_contains(&inner));
        assert!(!inner.contains(&outer));

        let same_start = SourceSpan::new(3, 1, 3, 4);
        assert!(outer.contains(&same_start));
        assert!(!outer.strictly_contains(&same_start));
    }

    #[test]
    fn well_formed() {
        assert!(SourceSpan::new(2, 3, 2, 3).is_well_formed());
        assert!(!SourceSpan::new(2, 3, 1, 9).is_well_formed());
    }

    #[test]
    fn display() {
        assert_eq!(SourceSpan::new(1, 2, 3, 4).to_string(), "1:2-3:4");
    }
}
