//! Stack safety for the recursive parts of the KRY pipeline.
//!
//! The statement parser, the expression-AST parser and the IR converter all
//! recurse on nesting depth. Two tools keep that bounded:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand (via
//!   `stacker`) so deep but legal input never overflows.
//! - [`NestingBudget`] caps logical nesting so hostile input is rejected with
//!   a diagnostic instead of consuming unbounded memory.
//!
//! On `wasm32` the stack helper is a plain call.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 64 * 1024;

/// Size of each freshly allocated stack segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Default maximum nesting depth for blocks and sub-expressions.
pub const DEFAULT_MAX_NESTING: u32 = 512;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Counts how deep a recursive walk currently is.
///
/// Callers `enter()` before descending and `exit()` when returning. `enter`
/// reports `false` once the limit is reached; the depth is not incremented in
/// that case, so a failed `enter` must not be paired with an `exit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NestingBudget {
    depth: u32,
    limit: u32,
}

impl NestingBudget {
    pub const fn new(limit: u32) -> Self {
        NestingBudget { depth: 0, limit }
    }

    #[must_use]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.limit {
            return false;
        }
        self.depth += 1;
        true
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for NestingBudget {
    fn default() -> Self {
        NestingBudget::new(DEFAULT_MAX_NESTING)
    }
}

#[cfg(test)]
mod tests;
