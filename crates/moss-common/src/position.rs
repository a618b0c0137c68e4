//! Source positions and spans.
//!
//! Every diagnostic points at a [`SourcePosition`]; every parsed compound
//! selector records the [`Span`] of text it came from so later phases can
//! quote the original source.

use std::fmt;

use serde::Serialize;

/// A position in source text.
///
/// Lines and columns are 1-based, the way editors and error messages count
/// them. `offset` is the 0-based character offset into the file, so two
/// positions in the same file can be compared cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourcePosition {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// 0-based character offset.
    pub offset: usize,
}

impl SourcePosition {
    /// The start of an input: line 1, column 1, offset 0.
    #[must_use]
    pub const fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Create a position from explicit coordinates.
    #[must_use]
    pub const fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A half-open range of character offsets into the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Offset of the first character covered.
    pub start: usize,
    /// Offset one past the last character covered.
    pub end: usize,
}

impl Span {
    /// Create a span covering `start..end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no characters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}
