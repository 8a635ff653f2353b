//! # wikiscan Core
//!
//! A position-tracking scan cursor and token model for wiki-style markup.
//!
//! The [`ScanCursor`] walks the input one character at a time, keeping the
//! byte offset, line and column in step. Handlers inspect the cursor with
//! side-effect-free lookahead, consume one construct, and build a [`Token`]
//! whose position points at the start of the lexeme.
//!
//! ## Quick Start
//!
//! ```rust
//! use wikiscan_core::{tokenize, TokenKind};
//!
//! let tokens = tokenize("== Title ==\nSome **bold** text").unwrap();
//!
//! let heading = &tokens[0];
//! assert_eq!(heading.kind, TokenKind::HeadingOpen);
//! assert_eq!((heading.position.line, heading.position.column), (1, 1));
//! assert!(tokens.last().unwrap().is_eof());
//! ```
//!
//! ## Driving the cursor by hand
//!
//! ```rust
//! use wikiscan_core::{ScanCursor, TokenKind};
//!
//! let mut cursor = ScanCursor::new("**bold**");
//! assert!(cursor.match_str("**"));
//!
//! let start = cursor.mark();
//! cursor.advance(2);
//! let token = cursor.token_from(start, TokenKind::BoldOpen);
//!
//! assert_eq!(token.text, "**");
//! assert_eq!(token.position.column, 1);
//! ```

pub mod cursor;
pub mod error;
pub mod handlers;
pub mod lexer;
pub mod position;
pub mod token;

pub use cursor::{Mark, ScanCursor, EOF_CHAR};
pub use error::{LexError, LexErrorKind};
pub use handlers::{Interwiki, LexState, LinkTarget, LinkTargetError, TokenHandler, Triggers};
pub use lexer::{tokenize, Lexer};
pub use position::SourcePosition;
pub use token::{Attributes, Callout, CalloutKind, Token, TokenKind};
