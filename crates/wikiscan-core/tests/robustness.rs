//! Robustness checks: malformed and adversarial markup must still produce a
//! complete, correctly positioned token stream.

use proptest::prelude::*;
use wikiscan_core::{tokenize, ScanCursor, Token};

/// Check the invariants every token stream must satisfy.
fn check_stream(input: &str, tokens: &[Token]) -> Result<(), String> {
    let (last, body) = tokens
        .split_last()
        .ok_or_else(|| "empty token stream".to_string())?;
    if !last.is_eof() {
        return Err(format!("stream ends with {} instead of EOF", last.kind));
    }
    if body.iter().any(Token::is_eof) {
        return Err("EOF before end of stream".to_string());
    }

    let mut cursor = ScanCursor::new(input);
    for token in tokens {
        if token.position != cursor.position() {
            return Err(format!(
                "{} {:?} reported at {} but starts at {}",
                token.kind,
                token.text,
                token.position,
                cursor.position()
            ));
        }
        if !cursor.match_str(&token.text) {
            return Err(format!("{:?} is not the input at {}", token.text, token.position));
        }
        if !token.is_eof() && token.text.is_empty() {
            return Err(format!("empty {} token at {}", token.kind, token.position));
        }
        cursor.advance(token.text.chars().count());
    }

    if !cursor.is_at_end() {
        return Err(format!("input left over at {}", cursor.position()));
    }
    Ok(())
}

fn assert_stream(input: &str) {
    let tokens = tokenize(input).unwrap_or_else(|e| panic!("{input:?}: {e}"));
    if let Err(msg) = check_stream(input, &tokens) {
        panic!("{input:?}: {msg}");
    }
}

// ============================================================================
// Hand-picked Malformed Inputs
// ============================================================================

const MALFORMED: &[&str] = &[
    "**",
    "***",
    "////",
    "__x",
    "=",
    "====\n====",
    "== unclosed heading\nnext",
    "[[",
    "]]",
    "[[a|b|c",
    "{{",
    "}}|",
    "{{[[|]]}}",
    "((",
    "((((",
    "(((",
    "(((external|",
    "(((external|2024)))extra)))",
    "<",
    "</",
    "<callout",
    "<callout type=\"unterminated>",
    "</callout>",
    "<td colspan=>",
    "<affili name=\"x\"",
    "\\\\",
    "\\",
    "-----",
    "----",
    "\n\n\n",
    "\r\n\r\n",
    "\t \u{a0}\u{3000}x",
    "é→😀**ü**",
    "[citation needed",
    "[citation needed][citation needed]",
];

#[test]
fn test_malformed_inputs_tokenize_cleanly() {
    for input in MALFORMED {
        assert_stream(input);
    }
}

#[test]
fn test_long_repetitive_input() {
    let input = "**a** [[b|c]] ((d)) <sub>e</sub>\n".repeat(500);
    assert_stream(&input);
}

#[test]
fn test_deep_nesting() {
    let input = format!("{}x{}", "<blockquote>".repeat(200), "</blockquote>".repeat(200));
    assert_stream(&input);
}

#[test]
fn test_many_unterminated_tags() {
    let input = "<sub ".repeat(40_000);
    let tokens = tokenize(&input).unwrap();
    // "<", "sub", " " per repetition, then EOF.
    assert_eq!(tokens.len(), 40_000 * 3 + 1);
    if let Err(msg) = check_stream(&input, &tokens) {
        panic!("{msg}");
    }
}

#[test]
fn test_many_unterminated_quoted_attributes() {
    assert_stream(&"<callout title=\"".repeat(20_000));
    assert_stream(&"<td colspan=".repeat(20_000));
    assert_stream(&"</sub".repeat(20_000));
}

#[test]
fn test_many_unclosed_triple_parens() {
    assert_stream(&"(((".repeat(30_000));
    assert_stream(&"(((external|2024 ".repeat(10_000));
}

// ============================================================================
// Generated Inputs
// ============================================================================

fn markup_soup() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        proptest::sample::select(vec![
            "**",
            "//",
            "__",
            "=",
            "==",
            "----",
            "\\\\ ",
            "[[",
            "]]",
            "|",
            "{{",
            "}}",
            "((",
            "))",
            "(((",
            ")))",
            "unfinished|2024",
            "<callout type=info title=\"t\">",
            "</callout>",
            "<td colspan=2>",
            "</td>",
            "<affili name=a>",
            "[citation needed]",
            " ",
            "\n",
            "word",
            "é",
        ]),
        0..48,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_arbitrary_text_tokenizes(input in "\\PC{0,64}") {
        let tokens = tokenize(&input).map_err(|e| TestCaseError::fail(e.to_string()))?;
        check_stream(&input, &tokens).map_err(|msg| TestCaseError::fail(msg))?;
    }

    #[test]
    fn prop_markup_soup_tokenizes(input in markup_soup()) {
        let tokens = tokenize(&input).map_err(|e| TestCaseError::fail(e.to_string()))?;
        check_stream(&input, &tokens).map_err(|msg| TestCaseError::fail(msg))?;
    }
}
