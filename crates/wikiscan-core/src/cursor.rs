//! Character-level scan cursor with line/column tracking.
//!
//! The cursor walks an immutable input left to right, one `char` at a time,
//! and keeps three counters in step: the byte offset into the input, the
//! 1-based line, and the 1-based column.
//!
//! # Contract
//!
//! - Lookahead (`peek`, `peek_back`, `match_str`, `is_at_end`) never mutates.
//!   Reads past either end return [`EOF_CHAR`] instead of failing.
//! - `advance` is the only way position moves forward. Every consumed `\n`
//!   bumps the line and resets the column to 1; every other consumed `char`
//!   moves the column by one.
//! - `set_position` is an escape hatch that moves the offset without
//!   touching line or column. Prefer `mark`/`reset`, which restore all three.
//!
//! # Building tokens
//!
//! Take a [`Mark`] before consuming a lexeme and hand it to
//! [`ScanCursor::token_from`]. The token's position is the mark's, so it is
//! right even when the lexeme spans lines.
//!
//! [`ScanCursor::create_token`] rebuilds the start column from the current
//! column and the length of `text`. It is only correct when `text` was
//! consumed by the immediately preceding `advance` calls and contained no
//! newline. Debug builds assert this; release builds clamp to column 1.

use memchr::{memchr_iter, memrchr};

use crate::position::SourcePosition;
use crate::token::{Callout, CalloutKind, Token, TokenKind};

/// Returned by reads outside the input.
pub const EOF_CHAR: char = '\0';

/// A saved cursor state.
///
/// Marks are cheap to copy and restore the offset, line and column together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    offset: usize,
    line: u32,
    column: u32,
}

impl Mark {
    /// Byte offset at the time of the mark.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Line/column at the time of the mark.
    #[inline]
    pub const fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column)
    }
}

/// Scan cursor over one input document.
///
/// One document, one cursor: the cursor is not meant to be shared, and
/// every handler call receives it by `&mut`.
#[derive(Debug, Clone)]
pub struct ScanCursor<'a> {
    /// The complete input text.
    input: &'a str,
    /// Current byte offset, always on a char boundary.
    offset: usize,
    /// Current line (1-based).
    line: u32,
    /// Current column (1-based).
    column: u32,
}

impl<'a> ScanCursor<'a> {
    /// Create a cursor at the start of `input` (offset 0, line 1, column 1).
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Check if all input has been consumed.
    #[inline(always)]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Current byte offset.
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current line.
    #[inline(always)]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column.
    #[inline(always)]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Current line and column.
    ///
    /// The raw scan position, the thing [`set_position`](Self::set_position)
    /// accepts, is [`offset`](Self::offset).
    ///
    /// ```
    /// use wikiscan_core::{ScanCursor, SourcePosition};
    ///
    /// let mut cursor = ScanCursor::new("ab\ncd");
    /// cursor.advance(4);
    /// assert_eq!(cursor.offset(), 4);
    /// assert_eq!(cursor.position(), SourcePosition::new(2, 2));
    /// ```
    #[inline]
    pub fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column)
    }

    /// The whole input, including what has already been consumed.
    #[inline(always)]
    pub fn raw_input(&self) -> &'a str {
        self.input
    }

    /// The unconsumed remainder of the input.
    #[inline(always)]
    pub fn remaining(&self) -> &'a str {
        self.input.get(self.offset..).unwrap_or("")
    }

    /// Peek `lookahead` chars past the current one without consuming.
    ///
    /// `peek(0)` is the current char. Returns [`EOF_CHAR`] past the end.
    #[inline]
    pub fn peek(&self, lookahead: usize) -> char {
        self.remaining().chars().nth(lookahead).unwrap_or(EOF_CHAR)
    }

    /// The char just before the cursor, or [`EOF_CHAR`] at the start.
    #[inline]
    pub fn peek_back(&self) -> char {
        self.input
            .get(..self.offset)
            .and_then(|before| before.chars().next_back())
            .unwrap_or(EOF_CHAR)
    }

    /// Check if the cursor sits at the start of a line.
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.offset == 0 || self.peek_back() == '\n'
    }

    /// Check if the remaining input starts with `literal`.
    ///
    /// The empty literal always matches. A literal longer than the remaining
    /// input never does.
    #[inline]
    pub fn match_str(&self, literal: &str) -> bool {
        self.remaining().starts_with(literal)
    }

    /// Consume `count` chars and return the char that was current before
    /// the move.
    ///
    /// At end of input this returns [`EOF_CHAR`] and changes nothing. A
    /// `count` larger than what remains stops at the end. `advance(0)`
    /// returns the current char without moving.
    pub fn advance(&mut self, count: usize) -> char {
        let rest = self.remaining();
        let Some(current) = rest.chars().next() else {
            return EOF_CHAR;
        };

        let end = rest
            .char_indices()
            .nth(count)
            .map_or(rest.len(), |(idx, _)| idx);

        self.offset += end;
        self.track(&rest[..end]);
        current
    }

    /// Consume a single char. Same as `advance(1)`.
    #[inline]
    pub fn bump(&mut self) -> char {
        self.advance(1)
    }

    /// Consume chars while `pred` holds and return the consumed slice.
    pub fn advance_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let rest = self.remaining();
        let end = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(rest.len(), |(idx, _)| idx);

        self.offset += end;
        self.track(&rest[..end]);
        &rest[..end]
    }

    /// Move line/column over a consumed slice.
    ///
    /// Uses `memchr` for the newline scan so long skips stay cheap.
    #[inline]
    fn track(&mut self, consumed: &str) {
        let bytes = consumed.as_bytes();
        match memrchr(b'\n', bytes) {
            None => {
                self.column += consumed.chars().count() as u32;
            }
            Some(last) => {
                self.line += memchr_iter(b'\n', bytes).count() as u32;
                self.column = 1 + consumed[last + 1..].chars().count() as u32;
            }
        }
    }

    /// Snapshot the current offset, line and column.
    #[inline]
    pub fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Restore a snapshot taken with [`mark`](Self::mark).
    #[inline]
    pub fn reset(&mut self, mark: Mark) {
        self.offset = self.clamp_offset(mark.offset);
        self.line = mark.line;
        self.column = mark.column;
    }

    /// Move to a byte offset without recomputing line or column.
    ///
    /// The offset is clamped to the input length and moved back to the
    /// nearest char boundary. Keeping line and column meaningful afterwards
    /// is the caller's job; [`reset`](Self::reset) is usually what you want.
    #[inline]
    pub fn set_position(&mut self, offset: usize) {
        self.offset = self.clamp_offset(offset);
    }

    fn clamp_offset(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.input.len());
        while !self.input.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// The input between `mark` and the current offset.
    #[inline]
    pub fn slice_from(&self, mark: Mark) -> &'a str {
        self.input.get(mark.offset..self.offset).unwrap_or("")
    }

    /// Build a token from everything consumed since `mark`.
    ///
    /// The token starts at the mark's position, so this is correct for
    /// lexemes that cross line breaks.
    #[inline]
    pub fn token_from(&self, mark: Mark, kind: TokenKind) -> Token {
        Token::new(kind, self.slice_from(mark), mark.position())
    }

    /// Build a token whose start column is recovered from the current
    /// column and the length of `text`.
    ///
    /// `text` must be exactly what the preceding `advance` calls consumed,
    /// with no newline in it.
    pub fn create_token(&self, kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, self.retreat(text))
    }

    /// Like [`create_token`](Self::create_token), with callout metadata.
    ///
    /// Only [`TokenKind::CalloutOpen`] carries callout metadata; `kind` must
    /// be that.
    pub fn create_callout_token(
        &self,
        kind: TokenKind,
        text: &str,
        callout_kind: CalloutKind,
        callout_title: &str,
    ) -> Token {
        debug_assert_eq!(
            kind,
            TokenKind::CalloutOpen,
            "callout metadata on a non-callout token"
        );
        self.create_token(kind, text)
            .with_callout(Callout::new(callout_kind, callout_title))
    }

    fn retreat(&self, text: &str) -> SourcePosition {
        let len = text.chars().count() as u32;
        debug_assert!(
            len < self.column,
            "token text {text:?} is longer than the consumed part of line {}",
            self.line
        );
        SourcePosition::new(self.line, self.column.saturating_sub(len).max(1))
    }
}
