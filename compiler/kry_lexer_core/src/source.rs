//! Input normalization.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceError {
    InvalidUtf8 { valid_up_to: usize },
    TooLarge { len: usize },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::InvalidUtf8 { valid_up_to } => {
                write!(f, "source is not valid UTF-8 after byte {valid_up_to}")
            }
            SourceError::TooLarge { len } => {
                write!(f, "source of {len} bytes exceeds the 4 GiB limit")
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// The text a parse should see.
///
/// `length == 0` means the input is NUL-terminated: everything before the
/// first NUL byte (or the whole slice if there is none). Otherwise the first
/// `length` bytes are used, clamped to the slice.
pub fn effective_source(bytes: &[u8], length: usize) -> Result<&str, SourceError> {
    let end = if length == 0 {
        memchr::memchr(0, bytes).unwrap_or(bytes.len())
    } else {
        length.min(bytes.len())
    };
    if u32::try_from(end).is_err() {
        return Err(SourceError::TooLarge { len: end });
    }
    std::str::from_utf8(&bytes[..end]).map_err(|e| SourceError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}
