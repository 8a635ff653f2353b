//! Integration tests for the scan cursor's position bookkeeping

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use wikiscan_core::{CalloutKind, ScanCursor, SourcePosition, Token, TokenKind, EOF_CHAR};

fn state(cursor: &ScanCursor) -> (usize, u32, u32) {
    (cursor.offset(), cursor.line(), cursor.column())
}

// ============================================================================
// End of Input
// ============================================================================

#[test]
fn test_at_end_after_exactly_len_advances() {
    let input = "abc";
    let mut cursor = ScanCursor::new(input);
    for _ in 0..input.len() {
        assert!(!cursor.is_at_end());
        cursor.advance(1);
    }
    assert!(cursor.is_at_end());
}

#[test]
fn test_advance_at_end_is_a_no_op() {
    let mut cursor = ScanCursor::new("x\n");
    cursor.advance(1);
    cursor.advance(1);
    let before = state(&cursor);

    assert_eq!(cursor.advance(1), EOF_CHAR);
    assert_eq!(cursor.advance(5), EOF_CHAR);
    assert_eq!(state(&cursor), before);
}

// ============================================================================
// Lookahead
// ============================================================================

#[test]
fn test_peek_out_of_range_returns_sentinel() {
    let mut cursor = ScanCursor::new("ab");
    assert_eq!(cursor.peek(0), 'a');
    assert_eq!(cursor.peek(1), 'b');
    assert_eq!(cursor.peek(2), EOF_CHAR);
    assert_eq!(cursor.peek(usize::MAX), EOF_CHAR);

    cursor.advance(2);
    assert_eq!(cursor.peek(0), EOF_CHAR);
    assert_eq!(state(&cursor), (2, 1, 3));
}

#[test]
fn test_match_str_semantics() {
    let cursor = ScanCursor::new("**bold**");
    assert!(cursor.match_str(""));
    assert!(cursor.match_str("*"));
    assert!(cursor.match_str("**"));
    assert!(cursor.match_str("**bold**"));
    assert!(!cursor.match_str("**bold***"));
    assert!(!cursor.match_str("//"));
    assert_eq!(state(&cursor), (0, 1, 1));
}

#[test]
fn test_match_str_empty_at_end() {
    let mut cursor = ScanCursor::new("a");
    cursor.advance(1);
    assert!(cursor.match_str(""));
    assert!(!cursor.match_str("a"));
}

#[test]
fn test_lookahead_is_idempotent() {
    let mut cursor = ScanCursor::new("x = y");
    cursor.advance(2);
    let first = (cursor.peek(0), cursor.peek(3), cursor.match_str("= "), cursor.is_at_end());
    for _ in 0..3 {
        let again = (cursor.peek(0), cursor.peek(3), cursor.match_str("= "), cursor.is_at_end());
        assert_eq!(again, first);
    }
    assert_eq!(state(&cursor), (2, 1, 3));
}

// ============================================================================
// Newline Handling
// ============================================================================

#[test]
fn test_advance_over_newline_resets_column() {
    let mut cursor = ScanCursor::new("a\nb");
    cursor.advance(1);
    assert_eq!(cursor.advance(1), '\n');
    assert_eq!(cursor.line(), 2);
    assert_eq!(cursor.column(), 1);
}

#[test]
fn test_hi_there_scenario() {
    let mut cursor = ScanCursor::new("Hi\nThere");

    cursor.advance(1);
    cursor.advance(1);
    assert_eq!((cursor.line(), cursor.column()), (1, 3));

    cursor.advance(1);
    assert_eq!((cursor.line(), cursor.column()), (2, 1));

    for _ in 0..5 {
        cursor.advance(1);
    }
    assert_eq!((cursor.line(), cursor.column()), (2, 6));

    let token = cursor.create_token(TokenKind::Text, "There");
    assert_eq!(token.position, SourcePosition::new(2, 1));
}

#[test]
fn test_multi_char_advance_counts_every_newline() {
    let mut cursor = ScanCursor::new("a\n\n\nbc");
    assert_eq!(cursor.advance(5), 'a');
    assert_eq!((cursor.line(), cursor.column()), (4, 2));
}

// ============================================================================
// Token Construction
// ============================================================================

#[test]
fn test_bold_open_scenario() {
    let mut cursor = ScanCursor::new("**bold**");
    assert!(cursor.match_str("**"));
    cursor.advance(1);
    cursor.advance(1);
    assert_eq!(cursor.column(), 3);

    let token = cursor.create_token(TokenKind::BoldOpen, "**");
    assert_eq!(
        token,
        Token::new(TokenKind::BoldOpen, "**", SourcePosition::new(1, 1))
    );
}

#[test]
fn test_callout_token_carries_only_callout_metadata() {
    let mut cursor = ScanCursor::new("{{warning|Note}}");
    cursor.advance(16);

    let token = cursor.create_callout_token(
        TokenKind::CalloutOpen,
        "{{warning|Note}}",
        CalloutKind::Warning,
        "Note",
    );
    assert_eq!(token.callout_kind(), Some(CalloutKind::Warning));
    assert_eq!(token.callout_title(), Some("Note"));
    assert_eq!(token.attributes, None);
    assert_eq!(token.position, SourcePosition::new(1, 1));
}

#[test]
fn test_mark_positions_multi_line_lexeme() {
    let mut cursor = ScanCursor::new("x <callout\ntitle=a>");
    cursor.advance(2);
    let start = cursor.mark();
    cursor.advance(17);

    let token = cursor.token_from(start, TokenKind::CalloutOpen);
    assert_eq!(token.text, "<callout\ntitle=a>");
    assert_eq!(token.position, SourcePosition::new(1, 3));
    assert_eq!((cursor.line(), cursor.column()), (2, 9));
}

#[test]
fn test_set_position_keeps_line_and_column() {
    let mut cursor = ScanCursor::new("abc\ndef");
    cursor.advance(5);
    let before = (cursor.line(), cursor.column());

    cursor.set_position(1);
    assert_eq!(cursor.offset(), 1);
    assert_eq!(cursor.peek(0), 'b');
    assert_eq!((cursor.line(), cursor.column()), before);
}

#[test]
fn test_raw_accessors() {
    let mut cursor = ScanCursor::new("héllo");
    cursor.advance(2);
    assert_eq!(cursor.raw_input(), "héllo");
    assert_eq!(cursor.remaining(), "llo");
    assert_eq!(cursor.position(), SourcePosition::new(1, 3));
}

// ============================================================================
// Properties
// ============================================================================

fn markup_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just('a'),
            Just('z'),
            Just(' '),
            Just('\n'),
            Just('*'),
            Just('é'),
            Just('→'),
        ],
        0..64,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn single_line() -> impl Strategy<Value = String> {
    "[a-z*/_ =é]{0,40}"
}

proptest! {
    #[test]
    fn prop_at_end_exactly_after_char_count(input in markup_text()) {
        let mut cursor = ScanCursor::new(&input);
        let count = input.chars().count();
        for _ in 0..count {
            prop_assert!(!cursor.is_at_end());
            cursor.advance(1);
        }
        prop_assert!(cursor.is_at_end());
        prop_assert_eq!(cursor.offset(), input.len());
    }

    #[test]
    fn prop_peek_never_mutates(input in markup_text(), skip in 0usize..70, k in 0usize..100) {
        let mut cursor = ScanCursor::new(&input);
        cursor.advance(skip);
        let before = state(&cursor);

        let remaining = cursor.remaining().chars().count();
        let peeked = cursor.peek(k);
        if k >= remaining {
            prop_assert_eq!(peeked, EOF_CHAR);
        }
        prop_assert_eq!(state(&cursor), before);
    }

    #[test]
    fn prop_line_and_column_match_consumed_prefix(input in markup_text(), steps in 0usize..70) {
        let mut cursor = ScanCursor::new(&input);
        for _ in 0..steps {
            cursor.advance(1);
        }

        let consumed = &input[..cursor.offset()];
        let line = consumed.matches('\n').count() as u32 + 1;
        let tail = consumed.rsplit('\n').next().unwrap_or("");
        prop_assert_eq!(cursor.line(), line);
        prop_assert_eq!(cursor.column(), tail.chars().count() as u32 + 1);
    }

    #[test]
    fn prop_bulk_advance_matches_single_steps(input in markup_text(), count in 0usize..70) {
        let mut bulk = ScanCursor::new(&input);
        bulk.advance(count);

        let mut single = ScanCursor::new(&input);
        for _ in 0..count {
            single.advance(1);
        }
        prop_assert_eq!(state(&bulk), state(&single));
    }

    #[test]
    fn prop_create_token_recovers_start_column(
        prefix in single_line(),
        text in "[a-z*é]{1,20}",
    ) {
        let input = format!("{prefix}{text}");
        let mut cursor = ScanCursor::new(&input);
        cursor.advance(prefix.chars().count());
        let start = cursor.position();

        for _ in 0..text.chars().count() {
            cursor.advance(1);
        }
        let token = cursor.create_token(TokenKind::Text, &text);
        prop_assert_eq!(token.position, start);
    }

    #[test]
    fn prop_mark_token_matches_start(input in markup_text(), a in 0usize..70, b in 0usize..70) {
        let mut cursor = ScanCursor::new(&input);
        cursor.advance(a);
        let start = cursor.mark();
        cursor.advance(b);

        let token = cursor.token_from(start, TokenKind::Text);
        prop_assert_eq!(token.position, start.position());
        prop_assert_eq!(token.text.as_str(), &input[start.offset()..cursor.offset()]);
    }
}
