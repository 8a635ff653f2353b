//! Python bindings for the wikiscan lexer.

use std::collections::BTreeMap;

use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyValueError};
use pyo3::prelude::*;
use wikiscan_core::{
    CalloutKind as CoreCalloutKind, Lexer as CoreLexer, Mark, ScanCursor,
    SourcePosition as CorePosition, Token as CoreToken, TokenKind as CoreTokenKind,
};

create_exception!(
    pyws,
    LexError,
    PyException,
    "Raised when the lexer cannot make progress."
);

// ============================================================================
// Position
// ============================================================================

/// Line and column of a token start (both 1-based).
#[pyclass(frozen, eq, get_all, name = "Position")]
#[derive(Clone, PartialEq, Eq)]
pub struct PyPosition {
    pub line: u32,
    pub column: u32,
}

#[pymethods]
impl PyPosition {
    fn __repr__(&self) -> String {
        format!("Position({}, {})", self.line, self.column)
    }

    fn __str__(&self) -> String {
        format!("{}:{}", self.line, self.column)
    }
}

impl From<CorePosition> for PyPosition {
    fn from(p: CorePosition) -> Self {
        PyPosition {
            line: p.line,
            column: p.column,
        }
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Severity of a callout block.
#[pyclass(frozen, eq, eq_int, name = "CalloutKind")]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PyCalloutKind {
    Default,
    Success,
    Info,
    Warning,
    Danger,
}

#[pymethods]
impl PyCalloutKind {
    /// Lower-case name as written in markup.
    #[getter]
    fn name(&self) -> &'static str {
        CoreCalloutKind::from(*self).as_str()
    }
}

impl From<CoreCalloutKind> for PyCalloutKind {
    fn from(k: CoreCalloutKind) -> Self {
        match k {
            CoreCalloutKind::Default => PyCalloutKind::Default,
            CoreCalloutKind::Success => PyCalloutKind::Success,
            CoreCalloutKind::Info => PyCalloutKind::Info,
            CoreCalloutKind::Warning => PyCalloutKind::Warning,
            CoreCalloutKind::Danger => PyCalloutKind::Danger,
        }
    }
}

impl From<PyCalloutKind> for CoreCalloutKind {
    fn from(k: PyCalloutKind) -> Self {
        match k {
            PyCalloutKind::Default => CoreCalloutKind::Default,
            PyCalloutKind::Success => CoreCalloutKind::Success,
            PyCalloutKind::Info => CoreCalloutKind::Info,
            PyCalloutKind::Warning => CoreCalloutKind::Warning,
            PyCalloutKind::Danger => CoreCalloutKind::Danger,
        }
    }
}

/// Token kind names, e.g. `"BOLD_OPEN"`.
///
/// Kinds cross the boundary as strings; `TokenKind.ALL` lists them and
/// `TokenKind.is_valid` checks one.
#[pyclass(frozen, name = "TokenKind")]
pub struct PyTokenKind;

#[pymethods]
impl PyTokenKind {
    #[classattr]
    #[pyo3(name = "ALL")]
    fn all() -> Vec<&'static str> {
        CoreTokenKind::ALL.iter().map(|k| k.name()).collect()
    }

    #[staticmethod]
    #[pyo3(text_signature = "(name)")]
    fn is_valid(name: &str) -> bool {
        name.parse::<CoreTokenKind>().is_ok()
    }

    /// Name of the kind that closes `name`, or None.
    #[staticmethod]
    #[pyo3(text_signature = "(name)")]
    fn closing(name: &str) -> PyResult<Option<&'static str>> {
        Ok(parse_kind(name)?.closing().map(CoreTokenKind::name))
    }
}

fn parse_kind(name: &str) -> PyResult<CoreTokenKind> {
    name.parse()
        .map_err(|e: wikiscan_core::token::UnknownKind| PyValueError::new_err(e.to_string()))
}

// ============================================================================
// Token
// ============================================================================

/// One lexeme with its start position.
#[pyclass(frozen, get_all, name = "Token")]
#[derive(Clone)]
pub struct PyToken {
    pub kind: &'static str,
    pub text: String,
    pub position: PyPosition,
    pub attributes: Option<BTreeMap<String, String>>,
    pub callout_kind: Option<PyCalloutKind>,
    pub callout_title: Option<String>,
}

#[pymethods]
impl PyToken {
    #[getter]
    fn is_eof(&self) -> bool {
        self.kind == CoreTokenKind::Eof.name()
    }

    fn __repr__(&self) -> String {
        format!(
            "Token({}, {:?}, {}:{})",
            self.kind, self.text, self.position.line, self.position.column
        )
    }
}

impl From<CoreToken> for PyToken {
    fn from(t: CoreToken) -> Self {
        let (callout_kind, callout_title) = match t.callout {
            Some(c) => (Some(c.kind.into()), Some(c.title)),
            None => (None, None),
        };
        PyToken {
            kind: t.kind.name(),
            text: t.text,
            position: t.position.into(),
            attributes: t.attributes,
            callout_kind,
            callout_title,
        }
    }
}

// ============================================================================
// Cursor
// ============================================================================

/// Saved cursor state, restorable with `Cursor.reset`.
#[pyclass(frozen, name = "Mark")]
#[derive(Clone, Copy)]
pub struct PyMark(Mark);

#[pymethods]
impl PyMark {
    #[getter]
    fn offset(&self) -> usize {
        self.0.offset()
    }

    #[getter]
    fn position(&self) -> PyPosition {
        self.0.position().into()
    }

    fn __repr__(&self) -> String {
        format!("Mark(offset={}, {})", self.0.offset(), self.0.position())
    }
}

/// Scan cursor over an owned copy of the input.
///
/// Args:
///     input: Text to scan
#[pyclass(name = "Cursor")]
pub struct PyCursor {
    input: String,
    state: Mark,
}

impl PyCursor {
    /// Run `f` on a cursor restored to the saved state, then save it again.
    fn with_cursor<R>(&mut self, f: impl FnOnce(&mut ScanCursor<'_>) -> R) -> R {
        let mut cursor = ScanCursor::new(&self.input);
        cursor.reset(self.state);
        let result = f(&mut cursor);
        self.state = cursor.mark();
        result
    }

    fn cursor(&self) -> ScanCursor<'_> {
        let mut cursor = ScanCursor::new(&self.input);
        cursor.reset(self.state);
        cursor
    }
}

#[pymethods]
impl PyCursor {
    #[new]
    #[pyo3(text_signature = "(input)")]
    fn new(input: String) -> Self {
        let state = ScanCursor::new(&input).mark();
        PyCursor { input, state }
    }

    #[getter]
    fn offset(&self) -> usize {
        self.state.offset()
    }

    #[getter]
    fn line(&self) -> u32 {
        self.state.position().line
    }

    #[getter]
    fn column(&self) -> u32 {
        self.state.position().column
    }

    #[getter]
    fn position(&self) -> PyPosition {
        self.state.position().into()
    }

    #[getter]
    fn remaining(&self) -> String {
        self.cursor().remaining().to_string()
    }

    fn is_at_end(&self) -> bool {
        self.cursor().is_at_end()
    }

    /// Character `lookahead` positions ahead, or "\0" past the end.
    #[pyo3(signature = (lookahead=0), text_signature = "(self, lookahead=0)")]
    fn peek(&self, lookahead: usize) -> char {
        self.cursor().peek(lookahead)
    }

    #[pyo3(text_signature = "(self, literal)")]
    fn match_str(&self, literal: &str) -> bool {
        self.cursor().match_str(literal)
    }

    /// Consume `count` characters and return the first one.
    #[pyo3(signature = (count=1), text_signature = "(self, count=1)")]
    fn advance(&mut self, count: usize) -> char {
        self.with_cursor(|c| c.advance(count))
    }

    fn mark(&self) -> PyMark {
        PyMark(self.state)
    }

    #[pyo3(text_signature = "(self, mark)")]
    fn reset(&mut self, mark: &PyMark) {
        self.with_cursor(|c| c.reset(mark.0));
    }

    /// Jump to a byte offset. Line and column are left as they are.
    #[pyo3(text_signature = "(self, offset)")]
    fn set_position(&mut self, offset: usize) {
        self.with_cursor(|c| c.set_position(offset));
    }

    /// Token covering everything consumed since `mark`.
    #[pyo3(text_signature = "(self, mark, kind)")]
    fn token_from(&self, mark: &PyMark, kind: &str) -> PyResult<PyToken> {
        let kind = parse_kind(kind)?;
        Ok(self.cursor().token_from(mark.0, kind).into())
    }

    /// Token for `text` just consumed on the current line.
    ///
    /// Raises:
    ///     ValueError: If `text` spans lines or is longer than the consumed
    ///         part of the current line
    #[pyo3(text_signature = "(self, kind, text)")]
    fn create_token(&self, kind: &str, text: &str) -> PyResult<PyToken> {
        let kind = parse_kind(kind)?;
        self.check_retreat(text)?;
        Ok(self.cursor().create_token(kind, text).into())
    }

    /// Callout-opening token for `text` just consumed on the current line.
    ///
    /// Raises:
    ///     ValueError: If `kind` is not `CALLOUT_OPEN`, or `text` fails the
    ///         same checks as `create_token`
    #[pyo3(
        signature = (kind, text, callout_kind, callout_title=""),
        text_signature = "(self, kind, text, callout_kind, callout_title='')"
    )]
    fn create_callout_token(
        &self,
        kind: &str,
        text: &str,
        callout_kind: PyCalloutKind,
        callout_title: &str,
    ) -> PyResult<PyToken> {
        let kind = parse_kind(kind)?;
        if kind != CoreTokenKind::CalloutOpen {
            return Err(PyValueError::new_err(format!(
                "callout metadata only belongs on CALLOUT_OPEN, not {kind}"
            )));
        }
        self.check_retreat(text)?;
        Ok(self
            .cursor()
            .create_callout_token(kind, text, callout_kind.into(), callout_title)
            .into())
    }

    fn __repr__(&self) -> String {
        format!(
            "Cursor(offset={}, {})",
            self.state.offset(),
            self.state.position()
        )
    }
}

impl PyCursor {
    fn check_retreat(&self, text: &str) -> PyResult<()> {
        let len = text.chars().count() as u32;
        if text.contains('\n') || len >= self.state.position().column {
            return Err(PyValueError::new_err(format!(
                "{:?} was not consumed on the current line",
                text
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Module functions
// ============================================================================

/// Tokenize wiki markup.
///
/// Args:
///     text: Markup to tokenize
///
/// Returns:
///     list[Token]: Tokens in source order, ending with an EOF token
///
/// Raises:
///     LexError: If no handler can make progress
#[pyfunction]
#[pyo3(text_signature = "(text)")]
fn tokenize(text: &str) -> PyResult<Vec<PyToken>> {
    CoreLexer::new()
        .tokenize(text)
        .map(|tokens| tokens.into_iter().map(PyToken::from).collect())
        .map_err(|e| LexError::new_err(e.to_string()))
}

// ============================================================================
// Module
// ============================================================================

/// wikiscan - Position-tracking lexer for wiki markup.
#[pymodule]
fn pyws(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPosition>()?;
    m.add_class::<PyCalloutKind>()?;
    m.add_class::<PyTokenKind>()?;
    m.add_class::<PyToken>()?;
    m.add_class::<PyMark>()?;
    m.add_class::<PyCursor>()?;
    m.add("LexError", m.py().get_type::<LexError>())?;
    m.add_function(wrap_pyfunction!(tokenize, m)?)?;
    Ok(())
}
