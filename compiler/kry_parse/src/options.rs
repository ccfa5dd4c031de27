//! Parser limits and switches.

use kry_diagnostic::DiagnosticConfig;
use kry_stack::DEFAULT_MAX_NESTING;

/// Hard caps and behavior switches for one parse.
///
/// Every cap is enforced with a recoverable diagnostic: the offending
/// construct is skipped and parsing continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_array_elements: usize,
    pub max_object_entries: usize,
    /// Longest identifier, in bytes.
    pub max_identifier_len: usize,
    /// Longest captured expression text, in bytes.
    pub max_expression_len: usize,
    pub max_params: usize,
    pub max_struct_fields: usize,
    /// Deepest block/value nesting before a Fatal diagnostic.
    pub max_nesting: u32,
    /// Accept `50%` as a number with the percentage flag instead of
    /// reporting it. Off by default: percentages belong in quoted strings.
    pub allow_bare_percent: bool,
    pub diagnostics: DiagnosticConfig,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_array_elements: 256,
            max_object_entries: 128,
            max_identifier_len: 256,
            max_expression_len: 511,
            max_params: 32,
            max_struct_fields: 64,
            max_nesting: DEFAULT_MAX_NESTING,
            allow_bare_percent: false,
            diagnostics: DiagnosticConfig::default(),
        }
    }
}
