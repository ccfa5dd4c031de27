//! Quoted string scanning shared by the statement and expression parsers.

use kry_lexer_core::SourceCursor;

/// Scan a quoted string at the cursor, resolving escapes.
///
/// The opening quote (`"`, `'` or `` ` ``) is the current byte. Returns
/// `None` with the cursor at end of input when the string never closes.
/// Unknown escapes are kept as written.
pub(crate) fn scan_string(cursor: &mut SourceCursor<'_>) -> Option<String> {
    let quote = cursor.advance();
    let mut out = String::new();
    let mut run_start = cursor.offset();
    loop {
        if cursor.is_eof() {
            return None;
        }
        match cursor.peek() {
            byte if byte == quote => {
                out.push_str(cursor.slice_from(run_start));
                cursor.advance();
                return Some(out);
            }
            b'\\' => {
                out.push_str(cursor.slice_from(run_start));
                cursor.advance();
                let escaped = cursor.peek();
                match escaped {
                    b'n' => out.push('\n'),
                    b't' => out.push('\t'),
                    b'r' => out.push('\r'),
                    b'0' => out.push('\0'),
                    b'\\' | b'"' | b'\'' | b'`' | b'$' => out.push(char::from(escaped)),
                    _ => {
                        out.push('\\');
                        run_start = cursor.offset();
                        continue;
                    }
                }
                cursor.advance();
                run_start = cursor.offset();
            }
            _ => cursor.advance_char(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(text: &str) -> Option<String> {
        scan_string(&mut SourceCursor::new(text))
    }

    #[test]
    fn plain_and_single_quoted() {
        assert_eq!(scan("\"Hello\" rest").as_deref(), Some("Hello"));
        assert_eq!(scan("'it'").as_deref(), Some("it"));
        assert_eq!(scan("\"50%\"").as_deref(), Some("50%"));
    }

    #[test]
    fn escapes_resolve() {
        assert_eq!(scan(r#""a\"b\n""#).as_deref(), Some("a\"b\n"));
        assert_eq!(scan(r#""\q""#).as_deref(), Some("\\q"));
    }

    #[test]
    fn unterminated_is_none() {
        assert_eq!(scan("\"never"), None);
        assert_eq!(scan("\"ends with escape\\"), None);
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(scan("\"héllo ✓\"").as_deref(), Some("héllo ✓"));
    }
}
