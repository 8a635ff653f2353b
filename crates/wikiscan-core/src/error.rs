use crate::position::SourcePosition;
use std::fmt;

/// Error kinds for categorizing lexer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// No registered handler accepted the current character
    UnhandledChar,
    /// A handler reported success without consuming any input
    Stalled,
}

/// A lexer failure with the location where the driver gave up.
///
/// The cursor itself never fails; these come from the driver loop when
/// the handler set cannot make progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Human-readable error message
    pub message: String,
    /// Byte offset of the offending input
    pub offset: usize,
    /// Line/column of the offending input
    pub position: SourcePosition,
    /// Error categorization
    pub kind: LexErrorKind,
}

impl LexError {
    /// Create an error for a character no handler claimed.
    pub fn unhandled_char(ch: char, offset: usize, position: SourcePosition) -> Self {
        Self {
            message: format!("unhandled character {:?}", ch),
            offset,
            position,
            kind: LexErrorKind::UnhandledChar,
        }
    }

    /// Create an error for a handler that claimed input without consuming it.
    pub fn stalled(handler: &str, offset: usize, position: SourcePosition) -> Self {
        Self {
            message: format!("handler '{}' made no progress", handler),
            offset,
            position,
            kind: LexErrorKind::Stalled,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {} (byte {})",
            self.message, self.position, self.offset
        )
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_offset() {
        let err = LexError::unhandled_char('é', 7, SourcePosition::new(2, 3));
        assert_eq!(err.kind, LexErrorKind::UnhandledChar);
        assert_eq!(err.to_string(), "unhandled character 'é' at 2:3 (byte 7)");
    }

    #[test]
    fn stalled_names_the_handler() {
        let err = LexError::stalled("heading", 0, SourcePosition::START);
        assert_eq!(err.kind, LexErrorKind::Stalled);
        assert_eq!(err.to_string(), "handler 'heading' made no progress at 1:1 (byte 0)");
    }
}
