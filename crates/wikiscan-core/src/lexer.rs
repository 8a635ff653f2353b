//! Handler-driven lexer.
//!
//! The lexer owns an ordered set of [`TokenHandler`]s. For each position it
//! tries handlers from highest to lowest priority and keeps the first one
//! that consumes input. The token stream always ends with one `Eof` token.

use tracing::{debug, trace};

use crate::cursor::ScanCursor;
use crate::error::LexError;
use crate::handlers::{default_handlers, LexState, TokenHandler};
use crate::token::{Token, TokenKind};

/// Tokenize `input` with the default handler set.
///
/// # Example
///
/// ```rust
/// use wikiscan_core::{tokenize, TokenKind};
///
/// let tokens = tokenize("**bold**").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [TokenKind::BoldOpen, TokenKind::Text, TokenKind::BoldClose, TokenKind::Eof]
/// );
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new().tokenize(input)
}

/// Lexer with a configurable handler set.
pub struct Lexer {
    /// Handlers sorted by descending priority.
    handlers: Vec<Box<dyn TokenHandler>>,
}

impl Lexer {
    /// Create a lexer with the default handlers.
    pub fn new() -> Self {
        let mut lexer = Self::empty();
        for handler in default_handlers() {
            lexer.insert(handler);
        }
        lexer
    }

    /// Create a lexer with no handlers at all.
    ///
    /// Useful for tests and for restricted dialects built from a handful of
    /// handlers.
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler. Among equal priorities, earlier registrations win.
    pub fn register(&mut self, handler: impl TokenHandler + 'static) {
        self.insert(Box::new(handler));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_handler(mut self, handler: impl TokenHandler + 'static) -> Self {
        self.register(handler);
        self
    }

    fn insert(&mut self, handler: Box<dyn TokenHandler>) {
        self.handlers.push(handler);
        self.handlers.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Handler names in the order they are tried.
    pub fn handler_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|h| h.name())
    }

    /// Tokenize the input.
    ///
    /// Fails only when the handler set cannot make progress: no handler
    /// claims the current character, or one claims it without consuming.
    #[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        let mut cursor = ScanCursor::new(input);
        let mut state = LexState::new();

        while !cursor.is_at_end() {
            self.step(&mut cursor, &mut state)?;
        }

        if !state.open_kinds().is_empty() {
            debug!(open = ?state.open_kinds(), "input ended with open constructs");
        }

        state.push(cursor.token_from(cursor.mark(), TokenKind::Eof));
        let tokens = state.into_tokens();
        debug!(count = tokens.len(), "tokenize complete");
        Ok(tokens)
    }

    /// Run handlers at the current position until one consumes input.
    fn step(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> Result<(), LexError> {
        let start = cursor.mark();
        let current = cursor.peek(0);

        for handler in &self.handlers {
            if !handler.triggers().accepts(current) {
                continue;
            }

            let emitted = state.tokens().len();
            if !handler.handle(cursor, state) {
                cursor.reset(start);
                continue;
            }

            if cursor.offset() == start.offset() {
                return Err(LexError::stalled(
                    handler.name(),
                    start.offset(),
                    start.position(),
                ));
            }

            for token in &state.tokens()[emitted..] {
                trace!(handler = handler.name(), kind = %token.kind, at = %token.position, "token");
            }
            return Ok(());
        }

        Err(LexError::unhandled_char(
            current,
            start.offset(),
            start.position(),
        ))
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}
