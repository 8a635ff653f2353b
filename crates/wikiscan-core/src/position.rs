//! Source location tracking for tokens.
//!
//! Every token carries the `SourcePosition` of its first character.
//! Positions are what diagnostics downstream report, so they are 1-based
//! on both axes, the way editors display them.

use std::fmt;

/// A line/column location in the source text.
///
/// Both fields are 1-based. Columns count `char`s, not bytes or grapheme
/// clusters: every consumed character moves the column by exactly one.
///
/// # Example
///
/// ```rust
/// use wikiscan_core::position::SourcePosition;
///
/// let pos = SourcePosition::new(2, 5);
/// assert_eq!(pos.to_string(), "2:5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePosition {
    /// Line number, starting at 1.
    pub line: u32,
    /// Column number, starting at 1.
    pub column: u32,
}

impl SourcePosition {
    /// The position of the first character of any input.
    pub const START: SourcePosition = SourcePosition { line: 1, column: 1 };

    /// Create a position from a line and column.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for SourcePosition {
    #[inline]
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
