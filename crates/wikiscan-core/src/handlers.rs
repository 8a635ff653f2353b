//! Per-construct recognizers.
//!
//! Each handler looks at the cursor, decides whether its construct starts
//! here, consumes exactly that construct and pushes the token(s) for it.
//! Handlers are stateless; nesting state (which constructs are open) lives
//! in [`LexState`] and is shared by all handlers for one run.
//!
//! A handler that returns `false` may have moved the cursor while looking ahead;
//! the lexer rewinds it before trying the next handler.

use std::fmt;

use memchr::memchr2;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::cursor::{ScanCursor, EOF_CHAR};
use crate::token::{Attributes, Callout, CalloutKind, Token, TokenKind};

/// Leading characters a handler can start on.
#[derive(Debug, Clone, Copy)]
pub enum Triggers {
    /// Try the handler on every character.
    Any,
    /// Only try the handler when the current char is one of these.
    Chars(&'static [char]),
}

impl Triggers {
    /// Check if a handler with these triggers should be tried on `c`.
    #[inline]
    pub fn accepts(&self, c: char) -> bool {
        match self {
            Triggers::Any => true,
            Triggers::Chars(chars) => chars.contains(&c),
        }
    }
}

/// Tokens produced so far plus the stack of constructs still open.
#[derive(Debug, Default)]
pub struct LexState {
    tokens: Vec<Token>,
    open: Vec<TokenKind>,
}

impl LexState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token.
    #[inline]
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Tokens emitted so far.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Opening kinds still waiting for their close, innermost last.
    #[inline]
    pub fn open_kinds(&self) -> &[TokenKind] {
        &self.open
    }

    /// Index of the innermost unclosed `open` kind.
    #[inline]
    pub fn last_unclosed(&self, open: TokenKind) -> Option<usize> {
        self.open.iter().rposition(|&kind| kind == open)
    }

    /// Check if an `open` kind is waiting for its close.
    #[inline]
    pub fn is_open(&self, open: TokenKind) -> bool {
        self.last_unclosed(open).is_some()
    }

    /// The innermost of `candidates` on the open stack.
    pub fn innermost(&self, candidates: &[TokenKind]) -> Option<TokenKind> {
        self.open
            .iter()
            .rev()
            .copied()
            .find(|kind| candidates.contains(kind))
    }

    /// Record that an opening kind was emitted.
    #[inline]
    pub fn push_open(&mut self, open: TokenKind) {
        self.open.push(open);
    }

    /// Remove the innermost `open` kind from the stack, if any.
    pub fn close(&mut self, open: TokenKind) {
        if let Some(idx) = self.last_unclosed(open) {
            self.open.remove(idx);
        }
    }

    /// Finish the run and hand back the tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

/// A recognizer for one markup construct.
pub trait TokenHandler {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Handlers with higher priority are tried first.
    fn priority(&self) -> u8;

    /// Characters this handler can start on.
    fn triggers(&self) -> Triggers {
        Triggers::Any
    }

    /// Consume one construct and push its token(s). Returns `false` if the
    /// construct does not start at the cursor.
    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool;
}

/// The standard handler set, unsorted.
pub fn default_handlers() -> Vec<Box<dyn TokenHandler>> {
    vec![
        Box::new(TripleParenHandler),
        Box::new(PseudoHtmlHandler),
        Box::new(FormattingHandler),
        Box::new(MiscHandler),
        Box::new(HeadingHandler),
        Box::new(LinkHandler),
        Box::new(CitationHandler),
        Box::new(ImageHandler),
        Box::new(FootnoteHandler),
        Box::new(WhitespaceHandler),
        Box::new(TextHandler),
    ]
}

/// Consume `delim` (already matched) and push a token of `kind`.
#[inline]
fn emit(cursor: &mut ScanCursor<'_>, state: &mut LexState, delim: &str, kind: TokenKind) {
    let mark = cursor.mark();
    cursor.advance(delim.chars().count());
    state.push(cursor.token_from(mark, kind));
}

// =============================================================================
// Triple parentheses: (((command|date)))
// =============================================================================

const TRIPLE_PAREN_COMMANDS: [&str; 3] = ["unfinished", "contextwarn", "external"];

/// `(((command|date)))` annotations.
pub struct TripleParenHandler;

impl TripleParenHandler {
    /// Split and validate `command|date` content.
    fn parse_content(content: &str) -> Option<(&str, &str)> {
        let mut parts = content.split('|');
        let command = parts.next()?.trim();
        let date = parts.next()?.trim();
        if parts.next().is_some() {
            return None;
        }

        let date_ok = !date.is_empty()
            && date.chars().all(|c| {
                c.is_ascii_alphanumeric() || c.is_whitespace() || "-/:,.".contains(c)
            });

        (TRIPLE_PAREN_COMMANDS.contains(&command) && date_ok).then_some((command, date))
    }
}

impl TokenHandler for TripleParenHandler {
    fn name(&self) -> &'static str {
        "triple-paren"
    }

    fn priority(&self) -> u8 {
        111
    }

    fn triggers(&self) -> Triggers {
        Triggers::Chars(&['('])
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        if !cursor.match_str("(((") {
            return false;
        }

        // Valid content has no parentheses, so the first one must start `)))`.
        let body = &cursor.remaining()[3..];
        let Some(close) = memchr2(b'(', b')', body.as_bytes()) else {
            return false;
        };
        if !body[close..].starts_with(")))") {
            return false;
        }
        let content = &body[..close];
        let Some((command, date)) = Self::parse_content(content) else {
            return false;
        };

        let mark = cursor.mark();
        cursor.advance(content.chars().count() + 6);
        let token = cursor
            .token_from(mark, TokenKind::TripleParentheses)
            .with_attribute("command", command)
            .with_attribute("date", date);
        state.push(token);
        true
    }
}

// =============================================================================
// Pseudo-HTML tags: <callout>, <sub>, <table>, ...
// =============================================================================

/// Tag name, opening kind, closing kind (`None` for single markers).
const TAGS: [(&str, TokenKind, Option<TokenKind>); 12] = [
    ("callout", TokenKind::CalloutOpen, Some(TokenKind::CalloutClose)),
    ("sub", TokenKind::SubOpen, Some(TokenKind::SubClose)),
    ("sup", TokenKind::SupOpen, Some(TokenKind::SupClose)),
    ("blockquote", TokenKind::BlockquoteOpen, Some(TokenKind::BlockquoteClose)),
    ("table", TokenKind::TableOpen, Some(TokenKind::TableClose)),
    ("thead", TokenKind::TheadOpen, Some(TokenKind::TheadClose)),
    ("tbody", TokenKind::TbodyOpen, Some(TokenKind::TbodyClose)),
    ("tfoot", TokenKind::TfootOpen, Some(TokenKind::TfootClose)),
    ("tr", TokenKind::TrOpen, Some(TokenKind::TrClose)),
    ("td", TokenKind::TdOpen, Some(TokenKind::TdClose)),
    ("th", TokenKind::ThOpen, Some(TokenKind::ThClose)),
    ("affili", TokenKind::Affili, None),
];

/// HTML-like tags for callouts, sub/superscript, block quotes, tables and
/// affiliation markers.
pub struct PseudoHtmlHandler;

impl PseudoHtmlHandler {
    fn lookup(name: &str) -> Option<(TokenKind, Option<TokenKind>)> {
        TAGS.iter()
            .find(|(tag, _, _)| *tag == name)
            .map(|&(_, open, close)| (open, close))
    }

    /// Check that a `>` comes before the next `<` after the one at the cursor.
    fn has_tag_end(cursor: &ScanCursor<'_>) -> bool {
        let after = cursor.remaining().as_bytes().get(1..).unwrap_or_default();
        matches!(memchr2(b'>', b'<', after).map(|i| after[i]), Some(b'>'))
    }

    /// Parse `name=value` / `name="quoted value"` pairs up to `>`.
    ///
    /// No scan crosses a `<`: a tag always ends before the next one starts.
    fn parse_attributes(cursor: &mut ScanCursor<'_>) -> Attributes {
        let mut attributes = Attributes::new();

        loop {
            cursor.advance_while(char::is_whitespace);
            if cursor.is_at_end() || cursor.peek(0) == '>' {
                break;
            }

            let name = cursor.advance_while(|c| c.is_ascii_alphabetic());
            if name.is_empty() {
                break;
            }

            cursor.advance_while(|c| c.is_whitespace() || c == '=');

            let value = if cursor.peek(0) == '"' {
                cursor.bump();
                let value = cursor.advance_while(|c| c != '"' && c != '<');
                if cursor.peek(0) == '"' {
                    cursor.bump();
                }
                value
            } else {
                cursor.advance_while(|c| !c.is_whitespace() && c != '>' && c != '<')
            };

            attributes.insert(name.to_string(), value.to_string());
        }

        attributes
    }

    /// Skip to and consume the closing `>`. Fails if a `<` or the end of
    /// input comes first.
    fn finish_tag(cursor: &mut ScanCursor<'_>) -> bool {
        cursor.advance_while(|c| c != '>' && c != '<');
        if cursor.peek(0) != '>' {
            return false;
        }
        cursor.bump();
        true
    }

    fn handle_open(cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        let mark = cursor.mark();
        cursor.bump();

        let name = cursor.advance_while(|c| c.is_ascii_alphabetic());
        let Some((open, close)) = Self::lookup(name) else {
            return false;
        };
        if !matches!(cursor.peek(0), '>' | '/' | EOF_CHAR) && !cursor.peek(0).is_whitespace() {
            return false;
        }

        let mut attributes = Self::parse_attributes(cursor);
        if !Self::finish_tag(cursor) {
            return false;
        }

        let mut token = cursor.token_from(mark, open);
        if open == TokenKind::CalloutOpen {
            let kind = CalloutKind::from_attr(attributes.remove("type").as_deref());
            let title = attributes.remove("title").unwrap_or_default();
            token = token.with_callout(Callout::new(kind, title));
        }
        state.push(token.with_attributes(attributes));

        if close.is_some() {
            state.push_open(open);
        }
        true
    }

    fn handle_close(cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        let mark = cursor.mark();
        cursor.advance(2);

        let name = cursor.advance_while(|c| c.is_ascii_alphabetic());
        let Some((open, Some(close))) = Self::lookup(name) else {
            return false;
        };
        if !Self::finish_tag(cursor) {
            return false;
        }

        state.push(cursor.token_from(mark, close));
        state.close(open);
        true
    }
}

impl TokenHandler for PseudoHtmlHandler {
    fn name(&self) -> &'static str {
        "pseudo-html"
    }

    fn priority(&self) -> u8 {
        110
    }

    fn triggers(&self) -> Triggers {
        Triggers::Chars(&['<'])
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        if !Self::has_tag_end(cursor) {
            return false;
        }
        if cursor.match_str("</") {
            Self::handle_close(cursor, state)
        } else {
            Self::handle_open(cursor, state)
        }
    }
}

// =============================================================================
// Inline formatting: ** // __
// =============================================================================

const FORMATTING: [(&str, TokenKind, TokenKind); 3] = [
    ("**", TokenKind::BoldOpen, TokenKind::BoldClose),
    ("//", TokenKind::ItalicOpen, TokenKind::ItalicClose),
    ("__", TokenKind::UnderlineOpen, TokenKind::UnderlineClose),
];

/// Toggling bold, italic and underline markers.
pub struct FormattingHandler;

impl TokenHandler for FormattingHandler {
    fn name(&self) -> &'static str {
        "formatting"
    }

    fn priority(&self) -> u8 {
        100
    }

    fn triggers(&self) -> Triggers {
        Triggers::Chars(&['*', '/', '_'])
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        let Some(&(delim, open, close)) = FORMATTING
            .iter()
            .find(|(delim, _, _)| cursor.match_str(delim))
        else {
            return false;
        };

        if state.is_open(open) {
            emit(cursor, state, delim, close);
            state.close(open);
        } else {
            emit(cursor, state, delim, open);
            state.push_open(open);
        }
        true
    }
}

// =============================================================================
// Line breaks and horizontal rules
// =============================================================================

/// `\\` line breaks and `----` rules.
pub struct MiscHandler;

impl MiscHandler {
    fn is_linebreak(cursor: &ScanCursor<'_>) -> bool {
        cursor.match_str("\\\\") && matches!(cursor.peek(2), ' ' | '\n' | EOF_CHAR)
    }

    fn is_horiz_rule(cursor: &ScanCursor<'_>) -> bool {
        cursor.at_line_start() && cursor.match_str("----") && cursor.peek(4) != '-'
    }
}

impl TokenHandler for MiscHandler {
    fn name(&self) -> &'static str {
        "misc"
    }

    fn priority(&self) -> u8 {
        95
    }

    fn triggers(&self) -> Triggers {
        Triggers::Chars(&['\\', '-'])
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        if Self::is_linebreak(cursor) {
            emit(cursor, state, "\\\\", TokenKind::Linebreak);
            true
        } else if Self::is_horiz_rule(cursor) {
            emit(cursor, state, "----", TokenKind::HorizRule);
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Headings: == Title ==
// =============================================================================

/// `=` runs opening a heading at line start and closing an open heading.
pub struct HeadingHandler;

impl TokenHandler for HeadingHandler {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn priority(&self) -> u8 {
        90
    }

    fn triggers(&self) -> Triggers {
        Triggers::Chars(&['='])
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        let kind = if cursor.at_line_start() {
            TokenKind::HeadingOpen
        } else if state.is_open(TokenKind::HeadingOpen) {
            TokenKind::HeadingClose
        } else {
            return false;
        };

        let mark = cursor.mark();
        cursor.advance_while(|c| c == '=');
        state.push(cursor.token_from(mark, kind));

        if kind == TokenKind::HeadingOpen {
            state.push_open(TokenKind::HeadingOpen);
        } else {
            state.close(TokenKind::HeadingOpen);
        }
        true
    }
}

// =============================================================================
// Links, citations, images, footnotes
// =============================================================================

/// Constructs whose `|` separators compete; the innermost open one wins.
const PIPE_OWNERS: [TokenKind; 2] = [TokenKind::LinkOpen, TokenKind::ImageOpen];

/// `[[target|label]]` links.
pub struct LinkHandler;

impl TokenHandler for LinkHandler {
    fn name(&self) -> &'static str {
        "link"
    }

    fn priority(&self) -> u8 {
        85
    }

    fn triggers(&self) -> Triggers {
        Triggers::Chars(&['[', ']', '|'])
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        if cursor.match_str("[[") {
            emit(cursor, state, "[[", TokenKind::LinkOpen);
            state.push_open(TokenKind::LinkOpen);
            true
        } else if cursor.match_str("]]") && state.is_open(TokenKind::LinkOpen) {
            emit(cursor, state, "]]", TokenKind::LinkClose);
            state.close(TokenKind::LinkOpen);
            true
        } else if cursor.match_str("|") && state.innermost(&PIPE_OWNERS) == Some(TokenKind::LinkOpen)
        {
            emit(cursor, state, "|", TokenKind::LinkPipe);
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Link targets
// =============================================================================

/// Bytes left unescaped in interwiki ids, as URI components allow.
const ID_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Sites reachable through a `prefix>id` link target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interwiki {
    /// `wp>Article_name`
    Wikipedia,
    /// `yt>video_id`
    YouTube,
}

impl Interwiki {
    /// Look up a prefix, ignoring case.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_lowercase().as_str() {
            "wp" => Some(Interwiki::Wikipedia),
            "yt" => Some(Interwiki::YouTube),
            _ => None,
        }
    }

    pub const fn prefix(self) -> &'static str {
        match self {
            Interwiki::Wikipedia => "wp",
            Interwiki::YouTube => "yt",
        }
    }

    /// Full URL for `id` on this site, with `id` percent-encoded.
    pub fn url(self, id: &str) -> String {
        let id = utf8_percent_encode(id, ID_ESCAPE);
        match self {
            Interwiki::Wikipedia => format!("https://en.wikipedia.org/wiki/{id}"),
            Interwiki::YouTube => format!("https://www.youtube.com/watch?v={id}"),
        }
    }
}

/// What the target part of `[[target|label]]` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    /// `wp>Rust`, `yt>abc123`
    Interwiki { site: Interwiki, id: &'a str },
    /// An `http://` or `https://` URL.
    External(&'a str),
    /// `#section` on the current page.
    Anchor(&'a str),
    /// `namespace/page#anchor`; at least one of page and anchor is present.
    Internal {
        namespace: Option<&'a str>,
        page: Option<&'a str>,
        anchor: Option<&'a str>,
    },
}

/// Why a link target was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTargetError {
    Empty,
    UnknownPrefix(String),
    EmptyAnchor,
    InvalidCharacters,
    MissingPage,
}

impl fmt::Display for LinkTargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTargetError::Empty => f.write_str("empty link target"),
            LinkTargetError::UnknownPrefix(prefix) => write!(f, "unknown wiki prefix: {}", prefix),
            LinkTargetError::EmptyAnchor => f.write_str("empty anchor"),
            LinkTargetError::InvalidCharacters => f.write_str("invalid characters in internal link"),
            LinkTargetError::MissingPage => f.write_str("missing page name"),
        }
    }
}

impl std::error::Error for LinkTargetError {}

impl<'a> LinkTarget<'a> {
    /// Classify a link target. Surrounding whitespace is ignored.
    ///
    /// Checked in order: `prefix>id` interwiki, `http(s)://` URL, `#anchor`,
    /// then internal paths made of ASCII letters, digits and `_-/:#`.
    pub fn parse(target: &'a str) -> Result<Self, LinkTargetError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(LinkTargetError::Empty);
        }

        if let Some((prefix, id)) = target.split_once('>') {
            if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_lowercase()) && !id.is_empty()
            {
                let site = Interwiki::from_prefix(prefix)
                    .ok_or_else(|| LinkTargetError::UnknownPrefix(prefix.to_string()))?;
                return Ok(LinkTarget::Interwiki {
                    site,
                    id: id.trim(),
                });
            }
        }

        if target.starts_with("http://") || target.starts_with("https://") {
            return Ok(LinkTarget::External(target));
        }

        if let Some(anchor) = target.strip_prefix('#') {
            if anchor.is_empty() {
                return Err(LinkTargetError::EmptyAnchor);
            }
            return Ok(LinkTarget::Anchor(anchor));
        }

        if !target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-/:#".contains(c))
        {
            return Err(LinkTargetError::InvalidCharacters);
        }

        let (path, anchor) = match target.split_once('#') {
            Some((path, anchor)) => (path, Some(anchor)),
            None => (target, None),
        };
        let (namespace, page) = match path.rsplit_once('/') {
            Some((namespace, page)) => (Some(namespace), page),
            None => (None, path),
        };

        let namespace = namespace.filter(|ns| !ns.is_empty());
        let page = Some(page).filter(|p| !p.is_empty());
        let anchor = anchor.filter(|a| !a.is_empty());
        if page.is_none() && anchor.is_none() {
            return Err(LinkTargetError::MissingPage);
        }

        Ok(LinkTarget::Internal {
            namespace,
            page,
            anchor,
        })
    }

    /// Check if the target leaves the wiki.
    pub fn is_external(&self) -> bool {
        matches!(self, LinkTarget::Interwiki { .. } | LinkTarget::External(_))
    }

    /// Absolute URL for external and interwiki targets.
    pub fn url(&self) -> Option<String> {
        match *self {
            LinkTarget::Interwiki { site, id } => Some(site.url(id)),
            LinkTarget::External(url) => Some(url.to_string()),
            LinkTarget::Anchor(_) | LinkTarget::Internal { .. } => None,
        }
    }

    /// Normalize an internal link path: drop one leading `/` and collapse
    /// repeated slashes. Anything that is not a valid internal target is
    /// returned unchanged.
    pub fn normalize_internal(target: &str) -> String {
        if !matches!(LinkTarget::parse(target), Ok(LinkTarget::Internal { .. })) {
            return target.to_string();
        }

        let trimmed = target.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let mut normalized = String::with_capacity(trimmed.len());
        for c in trimmed.chars() {
            if c == '/' && normalized.ends_with('/') {
                continue;
            }
            normalized.push(c);
        }
        normalized
    }
}

const CITATION_NEEDED: &str = "[citation needed]";

/// `[citation needed]` markers.
pub struct CitationHandler;

impl TokenHandler for CitationHandler {
    fn name(&self) -> &'static str {
        "citation"
    }

    fn priority(&self) -> u8 {
        84
    }

    fn triggers(&self) -> Triggers {
        Triggers::Chars(&['['])
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        if !cursor.match_str(CITATION_NEEDED) {
            return false;
        }
        emit(cursor, state, CITATION_NEEDED, TokenKind::CitationNeeded);
        true
    }
}

/// `{{path|caption}}` images.
pub struct ImageHandler;

impl TokenHandler for ImageHandler {
    fn name(&self) -> &'static str {
        "image"
    }

    fn priority(&self) -> u8 {
        80
    }

    fn triggers(&self) -> Triggers {
        Triggers::Chars(&['{', '}', '|'])
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        if cursor.match_str("{{") {
            emit(cursor, state, "{{", TokenKind::ImageOpen);
            state.push_open(TokenKind::ImageOpen);
            true
        } else if cursor.match_str("}}") && state.is_open(TokenKind::ImageOpen) {
            emit(cursor, state, "}}", TokenKind::ImageClose);
            state.close(TokenKind::ImageOpen);
            true
        } else if cursor.match_str("|")
            && state.innermost(&PIPE_OWNERS) == Some(TokenKind::ImageOpen)
        {
            emit(cursor, state, "|", TokenKind::ImagePipe);
            true
        } else {
            false
        }
    }
}

/// `((footnote text))`.
pub struct FootnoteHandler;

impl TokenHandler for FootnoteHandler {
    fn name(&self) -> &'static str {
        "footnote"
    }

    fn priority(&self) -> u8 {
        75
    }

    fn triggers(&self) -> Triggers {
        Triggers::Chars(&['(', ')'])
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        if cursor.match_str("((") {
            emit(cursor, state, "((", TokenKind::FootnoteOpen);
            state.push_open(TokenKind::FootnoteOpen);
            true
        } else if cursor.match_str("))") && state.is_open(TokenKind::FootnoteOpen) {
            emit(cursor, state, "))", TokenKind::FootnoteClose);
            state.close(TokenKind::FootnoteOpen);
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Whitespace and text fallback
// =============================================================================

/// Newlines and runs of other whitespace.
pub struct WhitespaceHandler;

impl TokenHandler for WhitespaceHandler {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        let mark = cursor.mark();
        match cursor.peek(0) {
            '\n' => {
                cursor.bump();
                state.push(cursor.token_from(mark, TokenKind::Newline));
                true
            }
            c if c.is_whitespace() => {
                cursor.advance_while(|c| c.is_whitespace() && c != '\n');
                state.push(cursor.token_from(mark, TokenKind::Whitespace));
                true
            }
            _ => false,
        }
    }
}

/// Characters that may start some other construct and so end a text run.
const SPECIAL_CHARS: &[char] = &[
    '_', '*', '/', '[', ']', '=', '|', '-', '`', '\\', '<', '{', '}', '(', ')',
];

/// Fallback: a run of ordinary characters, or one special character that
/// nothing else claimed.
pub struct TextHandler;

impl TokenHandler for TextHandler {
    fn name(&self) -> &'static str {
        "text"
    }

    fn priority(&self) -> u8 {
        1
    }

    fn handle(&self, cursor: &mut ScanCursor<'_>, state: &mut LexState) -> bool {
        if cursor.is_at_end() {
            return false;
        }

        let mark = cursor.mark();
        let run = cursor.advance_while(|c| !c.is_whitespace() && !SPECIAL_CHARS.contains(&c));
        if run.is_empty() {
            cursor.bump();
        }
        state.push(cursor.token_from(mark, TokenKind::Text));
        true
    }
}
