use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// === Navigation ===

#[test]
fn peek_and_advance() {
    let mut cursor = SourceCursor::new("ab");
    assert_eq!(cursor.peek(), b'a');
    assert_eq!(cursor.peek_at(1), b'b');
    assert_eq!(cursor.advance(), b'a');
    assert_eq!(cursor.advance(), b'b');
    assert!(cursor.is_eof());
    assert_eq!(cursor.peek(), 0);
    assert_eq!(cursor.advance(), 0);
    assert_eq!(cursor.offset(), 2);
}

#[test]
fn line_and_column_tracking() {
    let mut cursor = SourceCursor::new("ab\ncd");
    cursor.advance();
    cursor.advance();
    assert_eq!((cursor.line(), cursor.column()), (1, 3));
    cursor.advance();
    assert_eq!((cursor.line(), cursor.column()), (2, 1));
}

#[test]
fn multibyte_characters_count_one_column() {
    let mut cursor = SourceCursor::new("é=1");
    cursor.advance_char();
    assert_eq!(cursor.offset(), 2);
    assert_eq!(cursor.column(), 2);
    assert!(cursor.match_byte(b'='));
}

#[test]
fn match_byte_only_consumes_on_hit() {
    let mut cursor = SourceCursor::new("=x");
    assert!(!cursor.match_byte(b'x'));
    assert!(cursor.match_byte(b'='));
    assert_eq!(cursor.peek(), b'x');
}

#[test]
fn match_str_and_keywords() {
    let mut cursor = SourceCursor::new("=> each eachOther");
    assert!(cursor.match_str("=>"));
    cursor.skip_whitespace_and_comments();
    assert!(cursor.at_keyword("each"));
    cursor.eat_identifier(false);
    cursor.skip_whitespace_and_comments();
    assert!(!cursor.at_keyword("each"));
}

// === Trivia ===

#[test]
fn skips_line_and_block_comments() {
    let mut cursor = SourceCursor::new("  // note\n /* multi\nline */ Text");
    cursor.skip_whitespace_and_comments();
    assert_eq!(cursor.rest(), "Text");
    assert_eq!(cursor.line(), 3);
    assert_eq!(cursor.column(), 9);
}

#[test]
fn unterminated_block_comment_runs_to_eof() {
    let mut cursor = SourceCursor::new("/* never closed");
    cursor.skip_whitespace_and_comments();
    assert!(cursor.is_eof());
}

#[test]
fn block_comment_skip_leaves_the_line_break() {
    let mut cursor = SourceCursor::new("/* note */\nheight");
    assert!(cursor.skip_block_comment());
    assert_eq!(cursor.rest(), "\nheight");
    assert_eq!(cursor.column(), 11);

    let mut plain = SourceCursor::new("a /* b */");
    assert!(!plain.skip_block_comment());
    assert_eq!(plain.offset(), 0);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "inside a UTF-8 character")]
fn rest_inside_a_character_is_a_bug() {
    let mut cursor = SourceCursor::new("é");
    cursor.advance();
    let _ = cursor.rest();
}

#[test]
fn lone_slash_is_not_trivia() {
    let mut cursor = SourceCursor::new(" / 2");
    cursor.skip_whitespace_and_comments();
    assert_eq!(cursor.peek(), b'/');
}

// === Balanced groups ===

#[test]
fn skip_balanced_returns_interior() {
    let mut cursor = SourceCursor::new("(a, (b), c) rest");
    let (start, end) = cursor.skip_balanced(b'(').unwrap_or((0, 0));
    assert_eq!(cursor.slice(start, end), "a, (b), c");
    assert_eq!(cursor.rest(), " rest");
}

#[test]
fn skip_balanced_ignores_other_bracket_kinds() {
    let mut cursor = SourceCursor::new("{ x = [1, 2] }");
    let (start, end) = cursor.skip_balanced(b'{').unwrap_or((0, 0));
    assert_eq!(cursor.slice(start, end), " x = [1, 2] ");
}

#[test]
fn skip_balanced_is_not_string_aware() {
    let mut cursor = SourceCursor::new("(\")\") tail");
    let (start, end) = cursor.skip_balanced(b'(').unwrap_or((0, 0));
    assert_eq!(cursor.slice(start, end), "\"");
}

#[test]
fn skip_balanced_unclosed_returns_none() {
    let mut cursor = SourceCursor::new("[1, 2");
    assert_eq!(cursor.skip_balanced(b'['), None);
    assert!(cursor.is_eof());

    let mut other = SourceCursor::new("x");
    assert_eq!(other.skip_balanced(b'('), None);
    assert_eq!(other.offset(), 0);
}

// === Checkpoints ===

#[test]
fn restore_rewinds_position_and_location() {
    let mut cursor = SourceCursor::new("for\n each item");
    let start = cursor.checkpoint();
    cursor.eat_identifier(false);
    cursor.skip_whitespace_and_comments();
    assert_eq!(cursor.line(), 2);

    cursor.restore(start);
    assert_eq!(cursor.offset(), 0);
    assert_eq!((cursor.line(), cursor.column()), (1, 1));
    assert_eq!(cursor.checkpoint(), start);
}

#[test]
fn identifiers_with_and_without_dash() {
    let mut cursor = SourceCursor::new("font-size");
    assert_eq!(cursor.eat_identifier(false), Some("font"));

    let mut dashed = SourceCursor::new("font-size =");
    assert_eq!(dashed.eat_identifier(true), Some("font-size"));

    let mut digit = SourceCursor::new("9lives");
    assert_eq!(digit.eat_identifier(false), None);
}

// === Input normalization ===

#[test]
fn effective_source_honours_length_and_nul() {
    assert_eq!(crate::effective_source(b"Text {}\0junk", 0), Ok("Text {}"));
    assert_eq!(crate::effective_source(b"Text {}", 4), Ok("Text"));
    assert_eq!(crate::effective_source(b"abc", 99), Ok("abc"));
    assert!(crate::effective_source(&[0xFF, 0xFE], 0).is_err());
}

proptest! {
    #[test]
    fn checkpoint_restore_is_exact(text in "[a-z \n/*{}()]{0,64}", steps in 0usize..64) {
        let mut cursor = SourceCursor::new(&text);
        let checkpoint = cursor.checkpoint();
        for _ in 0..steps {
            cursor.advance();
        }
        cursor.skip_whitespace_and_comments();
        cursor.restore(checkpoint);
        prop_assert_eq!(cursor.offset(), 0);
        prop_assert_eq!(cursor.line(), 1);
        prop_assert_eq!(cursor.column(), 1);
    }

    #[test]
    fn bulk_and_single_step_tracking_agree(text in "[a-z \n/]{0,64}") {
        let mut stepped = SourceCursor::new(&text);
        while !stepped.is_eof() {
            stepped.advance();
        }
        let mut bulk = SourceCursor::new(&text);
        bulk.advance_to(text.len());
        prop_assert_eq!((stepped.line(), stepped.column()), (bulk.line(), bulk.column()));
    }

    #[test]
    fn balanced_groups_round_trip(depth in 0usize..20, inner in "[a-z ]{0,8}") {
        let text = format!("{}{}{} tail", "(".repeat(depth + 1), inner, ")".repeat(depth + 1));
        let mut cursor = SourceCursor::new(&text);
        let range = cursor.skip_balanced(b'(');
        prop_assert!(range.is_some());
        prop_assert_eq!(cursor.rest(), " tail");
    }
}
