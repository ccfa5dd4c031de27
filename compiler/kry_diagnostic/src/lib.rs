//! Diagnostics for the KRY front end.
//!
//! Every problem found while parsing or converting is recorded as a
//! [`Diagnostic`] in a [`DiagnosticList`]. Only a [`Level::Fatal`] diagnostic
//! stops parsing; everything else accumulates so a single pass reports as
//! much as possible.

mod diagnostic;
mod list;

pub use diagnostic::{Category, Diagnostic, Level};
pub use list::{DiagnosticConfig, DiagnosticList};
