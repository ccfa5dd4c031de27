//! Lexer primitives for KRY.
//!
//! The parser is scannerless: it drives a [`SourceCursor`] directly, using
//! `peek`/`advance`/`match_byte` for single bytes, the skip helpers for trivia
//! and balanced groups, and [`Checkpoint`]s to back out of speculative parses.

mod cursor;
mod source;

pub use cursor::{Checkpoint, SourceCursor};
pub use source::{effective_source, SourceError};

/// Bytes that may start an identifier.
#[inline]
pub fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

/// Bytes that may continue an identifier.
#[inline]
pub fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
