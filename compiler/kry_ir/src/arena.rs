//! Chunked string arena.
//!
//! Every identifier, string literal and captured expression text produced by
//! the parser is copied into fixed 4 KiB chunks. Chunks are never grown in
//! place, so a [`Name`] handle stays valid for the life of the arena. Nothing
//! is freed individually; dropping the arena releases every chunk at once.

use std::fmt;

/// Size of a regular arena chunk in bytes.
pub const CHUNK_SIZE: usize = 4096;

/// Handle to a string stored in a [`StringArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Name {
    chunk: u32,
    start: u32,
    len: u32,
}

impl Name {
    /// The empty string. Resolves to `""` in every arena.
    pub const EMPTY: Name = Name {
        chunk: u32::MAX,
        start: 0,
        len: 0,
    };

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Name::EMPTY")
        } else {
            write!(f, "Name({}:{}+{})", self.chunk, self.start, self.len)
        }
    }
}

/// Bump allocator for strings.
#[derive(Default)]
pub struct StringArena {
    chunks: Vec<String>,
    allocated: usize,
}

impl StringArena {
    pub fn new() -> Self {
        StringArena::default()
    }

    /// Copy `s` into the arena.
    ///
    /// Strings that do not fit in the remaining space of the current chunk
    /// start a new one. A string larger than [`CHUNK_SIZE`] gets a dedicated
    /// chunk of exactly its size.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "source text is capped well below u32::MAX"
    )]
    pub fn alloc(&mut self, s: &str) -> Name {
        if s.is_empty() {
            return Name::EMPTY;
        }

        let fits = self
            .chunks
            .last()
            .is_some_and(|chunk| chunk.capacity() - chunk.len() >= s.len());
        if !fits {
            self.chunks.push(String::with_capacity(s.len().max(CHUNK_SIZE)));
        }

        let chunk_index = self.chunks.len() - 1;
        let chunk = &mut self.chunks[chunk_index];
        let start = chunk.len();
        chunk.push_str(s);
        self.allocated += s.len();

        Name {
            chunk: chunk_index as u32,
            start: start as u32,
            len: s.len() as u32,
        }
    }

    /// Resolve a handle. Foreign or stale handles resolve to `""`.
    pub fn get(&self, name: Name) -> &str {
        if name.is_empty() {
            return "";
        }
        let start = name.start as usize;
        self.chunks
            .get(name.chunk as usize)
            .and_then(|chunk| chunk.get(start..start + name.len()))
            .unwrap_or("")
    }

    /// Number of chunks currently held.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total bytes of string data stored.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated
    }
}

impl fmt::Debug for StringArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringArena")
            .field("chunks", &self.chunks.len())
            .field("allocated", &self.allocated)
            .finish()
    }
}

#[cfg(test)]
mod tests;
