//! Resynchronization after a failed statement.

use kry_lexer_core::SourceCursor;
use tracing::trace;

/// Skip to the next statement boundary.
///
/// Stops after a newline or `;` at bracket depth zero, or before a `}` that
/// would close the enclosing block. Brackets opened while skipping are
/// tracked so a half-parsed `{ ... }` is skipped whole, and quoted strings
/// are stepped over so braces inside them do not count.
pub fn synchronize(cursor: &mut SourceCursor<'_>) {
    let start = cursor.offset();
    let mut depth = 0u32;
    loop {
        match cursor.peek() {
            0 if cursor.is_eof() => break,
            b'\n' | b';' if depth == 0 => {
                cursor.advance();
                break;
            }
            b'}' if depth == 0 => break,
            b'{' | b'(' | b'[' => {
                depth += 1;
                cursor.advance();
            }
            b'}' | b')' | b']' => {
                depth = depth.saturating_sub(1);
                cursor.advance();
            }
            quote @ (b'"' | b'\'' | b'`') => skip_quoted(cursor, quote),
            _ => {
                cursor.advance();
            }
        }
    }
    trace!(from = start, to = cursor.offset(), "synchronized");
}

/// Step over a quoted run starting at the opening quote. An unterminated
/// quote stops at the end of its line.
pub fn skip_quoted(cursor: &mut SourceCursor<'_>, quote: u8) {
    cursor.advance();
    loop {
        match cursor.peek() {
            0 if cursor.is_eof() => return,
            b'\n' if quote != b'`' => return,
            b'\\' => {
                cursor.advance();
                cursor.advance();
            }
            byte if byte == quote => {
                cursor.advance();
                return;
            }
            _ => {
                cursor.advance();
            }
        }
    }
}
