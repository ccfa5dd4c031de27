//! Position-tracking byte cursor.
//!
//! Reads past the end return `0`, so `peek() == 0` doubles as the EOF test in
//! scanning loops. Use [`is_eof()`](SourceCursor::is_eof) where interior NUL
//! bytes must be told apart from the end.

use tracing::trace;

use crate::{is_ident_continue, is_ident_start};

/// Saved cursor state. Restoring one rewinds offset, line and column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Checkpoint {
    offset: u32,
    line: u32,
    column: u32,
}

impl Checkpoint {
    #[inline]
    pub fn offset(self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn line(self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(self) -> u32 {
        self.column
    }
}

#[derive(Clone, Debug)]
pub struct SourceCursor<'src> {
    text: &'src str,
    pos: u32,
    line: u32,
    column: u32,
}

#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

impl<'src> SourceCursor<'src> {
    /// Cursor at line 1, column 1 of `text`.
    ///
    /// `text` must be shorter than 4 GiB; see
    /// [`effective_source`](crate::effective_source).
    pub fn new(text: &'src str) -> Self {
        debug_assert!(u32::try_from(text.len()).is_ok());
        SourceCursor {
            text,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline]
    pub fn source(&self) -> &'src str {
        self.text
    }

    #[inline]
    fn bytes(&self) -> &'src [u8] {
        self.text.as_bytes()
    }

    /// Current byte, or `0` at EOF.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    /// Byte `n` positions ahead, or `0` past the end.
    #[inline]
    pub fn peek_at(&self, n: usize) -> u8 {
        self.bytes()
            .get(self.pos as usize + n)
            .copied()
            .unwrap_or(0)
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos as usize >= self.text.len()
    }

    /// Consume and return one byte, updating line and column.
    ///
    /// Returns `0` without moving at EOF.
    pub fn advance(&mut self) -> u8 {
        let byte = self.peek();
        if self.is_eof() {
            return 0;
        }
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if !is_continuation(byte) {
            self.column += 1;
        }
        byte
    }

    /// Consume `expected` if it is the current byte.
    #[inline]
    pub fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_eof() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `expected` if the input continues with it.
    pub fn match_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.advance_to(self.pos as usize + expected.len());
            true
        } else {
            false
        }
    }

    /// `true` if the input continues with the keyword `word` followed by a
    /// non-identifier byte. Does not consume.
    pub fn at_keyword(&self, word: &str) -> bool {
        self.rest().starts_with(word) && !is_ident_continue(self.peek_at(word.len()))
    }

    /// Move to byte offset `target`, counting the lines and columns crossed.
    fn advance_to(&mut self, target: usize) {
        let target = target.min(self.text.len());
        let start = self.pos as usize;
        if target <= start {
            return;
        }
        let crossed = &self.bytes()[start..target];
        match memchr::memrchr(b'\n', crossed) {
            Some(last_newline) => {
                let newlines = memchr::memchr_iter(b'\n', crossed).count();
                self.line += u32::try_from(newlines).unwrap_or(u32::MAX);
                let tail = &crossed[last_newline + 1..];
                self.column = 1 + Self::char_count(tail);
            }
            None => self.column += Self::char_count(crossed),
        }
        self.pos = u32::try_from(target).unwrap_or(u32::MAX);
    }

    fn char_count(bytes: &[u8]) -> u32 {
        let count = bytes.iter().filter(|&&b| !is_continuation(b)).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Skip spaces, tabs, line breaks, `//` line comments and `/* */` block
    /// comments. An unterminated block comment runs to EOF.
    pub fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                b'/' if self.peek_at(1) == b'/' => {
                    let rest = &self.bytes()[self.pos as usize..];
                    let end = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
                    self.advance_to(self.pos as usize + end);
                }
                b'/' if self.peek_at(1) == b'*' => {
                    self.skip_block_comment();
                }
                _ => return,
            }
        }
    }

    /// Skip one `/* */` comment, stopping just past `*/` so a following line
    /// break is left in place. An unterminated comment runs to EOF. Returns
    /// `false` without moving when no block comment starts here.
    pub fn skip_block_comment(&mut self) -> bool {
        if self.peek() != b'/' || self.peek_at(1) != b'*' {
            return false;
        }
        let body_start = self.pos as usize + 2;
        let body = &self.bytes()[body_start..];
        let end = memchr::memmem::find(body, b"*/")
            .map_or(self.text.len(), |close| body_start + close + 2);
        self.advance_to(end);
        true
    }

    /// Capture the interior of a balanced group opened by `open`.
    ///
    /// The cursor must be on `open`. On success it ends just past the matching
    /// closer and the interior byte range `(start, end)` is returned. Nesting
    /// of the same bracket kind is tracked; string literals are not, so a
    /// bracket inside quotes still counts. Returns `None`, with the cursor at
    /// EOF, when the group never closes, and `None` without moving when `open`
    /// is not a bracket or not the current byte.
    pub fn skip_balanced(&mut self, open: u8) -> Option<(u32, u32)> {
        let close = match open {
            b'(' => b')',
            b'[' => b']',
            b'{' => b'}',
            _ => return None,
        };
        if !self.match_byte(open) {
            return None;
        }
        let start = self.pos;
        let mut depth = 1u32;
        while !self.is_eof() {
            let byte = self.peek();
            if byte == open {
                depth += 1;
            } else if byte == close {
                depth -= 1;
                if depth == 0 {
                    let end = self.pos;
                    self.advance();
                    trace!(start, end, "balanced group");
                    return Some((start, end));
                }
            }
            self.advance();
        }
        None
    }

    #[inline]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    #[inline]
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.offset;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
    }

    /// Current byte offset.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.pos
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Unconsumed input. The cursor must sit on a character boundary.
    #[inline]
    pub fn rest(&self) -> &'src str {
        debug_assert!(
            self.text.is_char_boundary(self.pos as usize),
            "cursor at byte {} is inside a UTF-8 character",
            self.pos
        );
        self.text.get(self.pos as usize..).unwrap_or("")
    }

    /// Source text between two offsets; empty if `end < start`. Both offsets
    /// must be character boundaries.
    #[inline]
    pub fn slice(&self, start: u32, end: u32) -> &'src str {
        debug_assert!(
            self.text.is_char_boundary(start as usize) && self.text.is_char_boundary(end as usize),
            "slice {start}..{end} splits a UTF-8 character"
        );
        self.text.get(start as usize..end as usize).unwrap_or("")
    }

    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        self.slice(start, self.pos)
    }

    /// Advance while `pred` holds for the current byte.
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.peek()) {
            self.advance();
        }
    }

    /// Consume an identifier. When `allow_dash` is set, `-` may continue it
    /// (`font-size`). Returns `None` without moving if no identifier starts here.
    pub fn eat_identifier(&mut self, allow_dash: bool) -> Option<&'src str> {
        if !is_ident_start(self.peek()) {
            return None;
        }
        let start = self.pos;
        self.eat_while(|b| is_ident_continue(b) || (allow_dash && b == b'-'));
        Some(self.slice_from(start))
    }

    /// Consume one UTF-8 character.
    pub fn advance_char(&mut self) {
        self.advance();
        while !self.is_eof() && is_continuation(self.peek()) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests;
