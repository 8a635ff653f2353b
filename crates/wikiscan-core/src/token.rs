//! Token types produced by the handlers.
//!
//! This module contains the lexical categories of the markup language and
//! the token record the lexer emits. Tokens are designed to be:
//!
//! - **Owned**: text and metadata are copied out of the input, so tokens
//!   outlive the cursor that produced them
//! - **Position-tracked**: every token records where its lexeme starts
//! - **Minimal**: only callout-open tokens carry callout metadata, only
//!   tokens with construct-specific attributes carry an attribute map

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::position::SourcePosition;

/// Lexical category of a token.
///
/// The set is closed: new constructs are added by extending this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Run of ordinary characters.
    Text,

    /// `**` opening bold.
    BoldOpen,
    /// `**` closing bold.
    BoldClose,
    /// `//` opening italic.
    ItalicOpen,
    /// `//` closing italic.
    ItalicClose,
    /// `__` opening underline.
    UnderlineOpen,
    /// `__` closing underline.
    UnderlineClose,
    /// Run of `=` at the start of a line.
    HeadingOpen,
    /// Run of `=` closing an open heading.
    HeadingClose,

    /// `----` on its own at the start of a line.
    HorizRule,
    /// `\\` explicit line break.
    Linebreak,
    /// A single `\n`.
    Newline,
    /// Run of whitespace other than `\n`.
    Whitespace,

    /// `<callout ...>`, carries callout metadata.
    CalloutOpen,
    /// `</callout>`.
    CalloutClose,

    /// `<sub>`.
    SubOpen,
    /// `</sub>`.
    SubClose,
    /// `<sup>`.
    SupOpen,
    /// `</sup>`.
    SupClose,

    /// `<table>`.
    TableOpen,
    /// `</table>`.
    TableClose,
    /// `<thead>`.
    TheadOpen,
    /// `</thead>`.
    TheadClose,
    /// `<tbody>`.
    TbodyOpen,
    /// `</tbody>`.
    TbodyClose,
    /// `<tfoot>`.
    TfootOpen,
    /// `</tfoot>`.
    TfootClose,
    /// `<tr>`.
    TrOpen,
    /// `</tr>`.
    TrClose,
    /// `<td>`.
    TdOpen,
    /// `</td>`.
    TdClose,
    /// `<th>`.
    ThOpen,
    /// `</th>`.
    ThClose,

    /// `{{` opening an image.
    ImageOpen,
    /// `|` separating image path and caption.
    ImagePipe,
    /// `}}` closing an image.
    ImageClose,

    /// `[[` opening a link.
    LinkOpen,
    /// `]]` closing a link.
    LinkClose,
    /// `|` separating link target and label.
    LinkPipe,
    /// `((` opening a footnote.
    FootnoteOpen,
    /// `))` closing a footnote.
    FootnoteClose,
    /// `[citation needed]` marker.
    CitationNeeded,
    /// `(((command|date)))` marker.
    TripleParentheses,

    /// `<blockquote>`.
    BlockquoteOpen,
    /// `</blockquote>`.
    BlockquoteClose,
    /// `<affili ...>` affiliation marker.
    Affili,

    /// End of input sentinel, always the last token.
    Eof,
}

impl TokenKind {
    /// Every token kind, in declaration order.
    pub const ALL: [TokenKind; 47] = [
        TokenKind::Text,
        TokenKind::BoldOpen,
        TokenKind::BoldClose,
        TokenKind::ItalicOpen,
        TokenKind::ItalicClose,
        TokenKind::UnderlineOpen,
        TokenKind::UnderlineClose,
        TokenKind::HeadingOpen,
        TokenKind::HeadingClose,
        TokenKind::HorizRule,
        TokenKind::Linebreak,
        TokenKind::Newline,
        TokenKind::Whitespace,
        TokenKind::CalloutOpen,
        TokenKind::CalloutClose,
        TokenKind::SubOpen,
        TokenKind::SubClose,
        TokenKind::SupOpen,
        TokenKind::SupClose,
        TokenKind::TableOpen,
        TokenKind::TableClose,
        TokenKind::TheadOpen,
        TokenKind::TheadClose,
        TokenKind::TbodyOpen,
        TokenKind::TbodyClose,
        TokenKind::TfootOpen,
        TokenKind::TfootClose,
        TokenKind::TrOpen,
        TokenKind::TrClose,
        TokenKind::TdOpen,
        TokenKind::TdClose,
        TokenKind::ThOpen,
        TokenKind::ThClose,
        TokenKind::ImageOpen,
        TokenKind::ImagePipe,
        TokenKind::ImageClose,
        TokenKind::LinkOpen,
        TokenKind::LinkClose,
        TokenKind::LinkPipe,
        TokenKind::FootnoteOpen,
        TokenKind::FootnoteClose,
        TokenKind::CitationNeeded,
        TokenKind::TripleParentheses,
        TokenKind::BlockquoteOpen,
        TokenKind::BlockquoteClose,
        TokenKind::Affili,
        TokenKind::Eof,
    ];

    /// Canonical upper-case name, e.g. `"BOLD_OPEN"`.
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Text => "TEXT",
            TokenKind::BoldOpen => "BOLD_OPEN",
            TokenKind::BoldClose => "BOLD_CLOSE",
            TokenKind::ItalicOpen => "ITALIC_OPEN",
            TokenKind::ItalicClose => "ITALIC_CLOSE",
            TokenKind::UnderlineOpen => "UNDERLINE_OPEN",
            TokenKind::UnderlineClose => "UNDERLINE_CLOSE",
            TokenKind::HeadingOpen => "HEADING_OPEN",
            TokenKind::HeadingClose => "HEADING_CLOSE",
            TokenKind::HorizRule => "HORIZ_RULE",
            TokenKind::Linebreak => "LINEBREAK",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::CalloutOpen => "CALLOUT_OPEN",
            TokenKind::CalloutClose => "CALLOUT_CLOSE",
            TokenKind::SubOpen => "SUB_OPEN",
            TokenKind::SubClose => "SUB_CLOSE",
            TokenKind::SupOpen => "SUP_OPEN",
            TokenKind::SupClose => "SUP_CLOSE",
            TokenKind::TableOpen => "TABLE_OPEN",
            TokenKind::TableClose => "TABLE_CLOSE",
            TokenKind::TheadOpen => "THEAD_OPEN",
            TokenKind::TheadClose => "THEAD_CLOSE",
            TokenKind::TbodyOpen => "TBODY_OPEN",
            TokenKind::TbodyClose => "TBODY_CLOSE",
            TokenKind::TfootOpen => "TFOOT_OPEN",
            TokenKind::TfootClose => "TFOOT_CLOSE",
            TokenKind::TrOpen => "TR_OPEN",
            TokenKind::TrClose => "TR_CLOSE",
            TokenKind::TdOpen => "TD_OPEN",
            TokenKind::TdClose => "TD_CLOSE",
            TokenKind::ThOpen => "TH_OPEN",
            TokenKind::ThClose => "TH_CLOSE",
            TokenKind::ImageOpen => "IMAGE_OPEN",
            TokenKind::ImagePipe => "IMAGE_PIPE",
            TokenKind::ImageClose => "IMAGE_CLOSE",
            TokenKind::LinkOpen => "LINK_OPEN",
            TokenKind::LinkClose => "LINK_CLOSE",
            TokenKind::LinkPipe => "LINK_PIPE",
            TokenKind::FootnoteOpen => "FOOTNOTE_OPEN",
            TokenKind::FootnoteClose => "FOOTNOTE_CLOSE",
            TokenKind::CitationNeeded => "CITATION_NEEDED",
            TokenKind::TripleParentheses => "TRIPLE_PARENTHESES",
            TokenKind::BlockquoteOpen => "BLOCKQUOTE_OPEN",
            TokenKind::BlockquoteClose => "BLOCKQUOTE_CLOSE",
            TokenKind::Affili => "AFFILI",
            TokenKind::Eof => "EOF",
        }
    }
}

impl TokenKind {
    /// The kind that closes this one, if this is an opening kind.
    pub const fn closing(self) -> Option<TokenKind> {
        let close = match self {
            TokenKind::BoldOpen => TokenKind::BoldClose,
            TokenKind::ItalicOpen => TokenKind::ItalicClose,
            TokenKind::UnderlineOpen => TokenKind::UnderlineClose,
            TokenKind::HeadingOpen => TokenKind::HeadingClose,
            TokenKind::CalloutOpen => TokenKind::CalloutClose,
            TokenKind::SubOpen => TokenKind::SubClose,
            TokenKind::SupOpen => TokenKind::SupClose,
            TokenKind::TableOpen => TokenKind::TableClose,
            TokenKind::TheadOpen => TokenKind::TheadClose,
            TokenKind::TbodyOpen => TokenKind::TbodyClose,
            TokenKind::TfootOpen => TokenKind::TfootClose,
            TokenKind::TrOpen => TokenKind::TrClose,
            TokenKind::TdOpen => TokenKind::TdClose,
            TokenKind::ThOpen => TokenKind::ThClose,
            TokenKind::ImageOpen => TokenKind::ImageClose,
            TokenKind::LinkOpen => TokenKind::LinkClose,
            TokenKind::FootnoteOpen => TokenKind::FootnoteClose,
            TokenKind::BlockquoteOpen => TokenKind::BlockquoteClose,
            _ => return None,
        };
        Some(close)
    }

    /// The kind this one closes, if this is a closing kind.
    pub fn opening(self) -> Option<TokenKind> {
        TokenKind::ALL
            .iter()
            .copied()
            .find(|open| open.closing() == Some(self))
    }

    /// Check if this kind opens a paired construct.
    #[inline]
    pub const fn is_open(self) -> bool {
        self.closing().is_some()
    }

    /// Check if this kind closes a paired construct.
    #[inline]
    pub fn is_close(self) -> bool {
        self.opening().is_some()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no token or callout kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown kind: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for TokenKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Severity of a callout block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CalloutKind {
    /// No particular severity.
    #[default]
    Default,
    Success,
    Info,
    Warning,
    Danger,
}

impl CalloutKind {
    /// Lower-case name as written in the `type` attribute.
    pub const fn as_str(self) -> &'static str {
        match self {
            CalloutKind::Default => "default",
            CalloutKind::Success => "success",
            CalloutKind::Info => "info",
            CalloutKind::Warning => "warning",
            CalloutKind::Danger => "danger",
        }
    }

    /// Resolve a `type` attribute value, falling back to `Default` when the
    /// attribute is missing or names no known kind.
    pub fn from_attr(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for CalloutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalloutKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(CalloutKind::Default),
            "success" => Ok(CalloutKind::Success),
            "info" => Ok(CalloutKind::Info),
            "warning" => Ok(CalloutKind::Warning),
            "danger" => Ok(CalloutKind::Danger),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// Callout metadata attached to a `CalloutOpen` token.
///
/// Kind and title travel together; a token has both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Callout {
    /// Severity from the `type` attribute.
    pub kind: CalloutKind,
    /// Title from the `title` attribute (empty when not given).
    pub title: String,
}

impl Callout {
    /// Create callout metadata.
    pub fn new(kind: CalloutKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
        }
    }
}

/// Construct-specific key/value pairs, e.g. `colspan` on a table cell.
pub type Attributes = BTreeMap<String, String>;

/// A classified lexeme.
///
/// The text is the exact slice of input the handler consumed; the
/// position is where that slice starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lexical category.
    pub kind: TokenKind,
    /// The consumed lexeme.
    pub text: String,
    /// Start of the lexeme.
    pub position: SourcePosition,
    /// Construct-specific attributes; `None` unless at least one was attached.
    pub attributes: Option<Attributes>,
    /// Callout metadata; only ever set on `CalloutOpen` tokens.
    pub callout: Option<Callout>,
}

impl Token {
    /// Create a token with no attributes and no callout metadata.
    #[inline]
    pub fn new(kind: TokenKind, text: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            attributes: None,
            callout: None,
        }
    }

    /// Attach callout metadata. Only meaningful on
    /// [`TokenKind::CalloutOpen`]; other kinds never carry it.
    pub fn with_callout(mut self, callout: Callout) -> Self {
        self.callout = Some(callout);
        self
    }

    /// Attach a single attribute, creating the map on first use.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
        self
    }

    /// Attach a set of attributes. An empty map leaves `attributes` unset.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        if attributes.is_empty() {
            return self;
        }
        match self.attributes.as_mut() {
            Some(existing) => existing.extend(attributes),
            None => self.attributes = Some(attributes),
        }
        self
    }

    /// Look up one attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.as_ref()?.get(key).map(String::as_str)
    }

    /// Callout severity, if this token carries callout metadata.
    #[inline]
    pub fn callout_kind(&self) -> Option<CalloutKind> {
        self.callout.as_ref().map(|c| c.kind)
    }

    /// Callout title, if this token carries callout metadata.
    #[inline]
    pub fn callout_title(&self) -> Option<&str> {
        self.callout.as_ref().map(|c| c.title.as_str())
    }

    /// Check if this is the end-of-input sentinel.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.position, self.kind, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in TokenKind::ALL {
            assert_eq!(kind.name().parse::<TokenKind>(), Ok(kind));
        }
        assert!("BOLD".parse::<TokenKind>().is_err());
    }

    #[test]
    fn open_close_pairs() {
        assert_eq!(TokenKind::TdOpen.closing(), Some(TokenKind::TdClose));
        assert_eq!(TokenKind::TdClose.opening(), Some(TokenKind::TdOpen));
        assert!(TokenKind::LinkOpen.is_open());
        assert!(TokenKind::LinkClose.is_close());
        assert!(!TokenKind::LinkPipe.is_open());
        assert!(!TokenKind::LinkPipe.is_close());
        assert!(!TokenKind::Affili.is_open());
        assert!(!TokenKind::Eof.is_close());
    }

    #[test]
    fn callout_kind_from_attr_falls_back_to_default() {
        assert_eq!(CalloutKind::from_attr(Some("Warning")), CalloutKind::Warning);
        assert_eq!(CalloutKind::from_attr(Some("loud")), CalloutKind::Default);
        assert_eq!(CalloutKind::from_attr(None), CalloutKind::Default);
    }

    #[test]
    fn empty_attribute_map_is_not_stored() {
        let token = Token::new(TokenKind::TdOpen, "<td>", SourcePosition::START)
            .with_attributes(Attributes::new());
        assert_eq!(token.attributes, None);

        let token = token.with_attribute("colspan", "2");
        assert_eq!(token.attribute("colspan"), Some("2"));
        assert_eq!(token.attribute("rowspan"), None);
    }

    #[test]
    fn callout_fields_travel_together() {
        let plain = Token::new(TokenKind::Text, "x", SourcePosition::START);
        assert_eq!(plain.callout_kind(), None);
        assert_eq!(plain.callout_title(), None);

        let open = Token::new(TokenKind::CalloutOpen, "<callout>", SourcePosition::START)
            .with_callout(Callout::new(CalloutKind::Info, ""));
        assert_eq!(open.callout_kind(), Some(CalloutKind::Info));
        assert_eq!(open.callout_title(), Some(""));
    }
}
