//! Ordered diagnostic accumulation with counters and an error limit.

use tracing::debug;

use crate::{Category, Diagnostic, Level};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Errors accepted before a Fatal limit diagnostic is added (0 = unlimited).
    pub error_limit: usize,
    /// Drop a syntax error repeating the message of an earlier one on the
    /// same line. Off by default.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 64,
            deduplicate: false,
        }
    }
}

impl DiagnosticConfig {
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Diagnostics in the order they were reported.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticList {
    diagnostics: Vec<Diagnostic>,
    warning_count: usize,
    error_count: usize,
    fatal_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticList {
    pub fn new() -> Self {
        DiagnosticList::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticList {
            config,
            ..DiagnosticList::default()
        }
    }

    fn repeats_syntax_error(&self, diag: &Diagnostic) -> bool {
        diag.category == Category::Syntax
            && diag.level == Level::Error
            && self.diagnostics.iter().any(|seen| {
                seen.category == Category::Syntax
                    && seen.line() == diag.line()
                    && seen.message == diag.message
            })
    }

    /// Record a diagnostic. Returns `false` if it was filtered as a duplicate
    /// or arrived after the error limit stopped collection.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if self.limit_reached() {
            return false;
        }

        if self.config.deduplicate && self.repeats_syntax_error(&diag) {
            debug!(
                line = diag.line(),
                message = %diag.message,
                "dropping repeated syntax error"
            );
            return false;
        }

        match diag.level {
            Level::Warning => self.warning_count += 1,
            Level::Error => self.error_count += 1,
            Level::Fatal => self.fatal_count += 1,
        }
        debug!(
            level = %diag.level,
            category = %diag.category,
            message = %diag.message,
            "diagnostic"
        );
        let pos = diag.pos;
        let span = diag.span;
        self.diagnostics.push(diag);

        if self.config.error_limit > 0 && self.error_count == self.config.error_limit {
            self.fatal_count += 1;
            self.diagnostics.push(
                Diagnostic::fatal(
                    Category::LimitExceeded,
                    format!("too many errors ({}); stopping", self.error_count),
                )
                .at(pos, span),
            );
        }
        true
    }

    /// `true` once a Fatal diagnostic has been recorded.
    pub fn should_stop(&self) -> bool {
        self.fatal_count > 0
    }

    fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// The first diagnostic reported, for callers that surface a single error.
    pub fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    pub fn first_message(&self) -> Option<&str> {
        self.first().map(|diag| diag.message.as_str())
    }

    /// `true` if any Error or Fatal diagnostic exists.
    pub fn has_errors(&self) -> bool {
        self.error_count + self.fatal_count > 0
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn fatal_count(&self) -> usize {
        self.fatal_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<'a> IntoIterator for &'a DiagnosticList {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests;
