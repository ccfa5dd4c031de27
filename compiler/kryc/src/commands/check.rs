//! The `check` command: parse and lower a file, reporting every diagnostic.

use kry_diagnostic::Diagnostic;
use kry_lower::{lower_module, CompileMode, LowerOptions, PropertyBinding};
use kry_parse::{parse, ParseOptions};

use super::read_file;

#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    pub mode: CompileMode,
    /// Skip the summary line.
    pub quiet: bool,
}

/// Check `path`. Returns `false` when any error-level diagnostic exists.
///
/// Lowering runs even after parse errors so one pass reports both.
pub fn check_file(path: &str, options: &CheckOptions) -> bool {
    let source = read_file(path);
    let parsed = parse(&source, &ParseOptions::default());
    let lower_options = LowerOptions {
        mode: options.mode,
        ..LowerOptions::default()
    };
    let lowered = lower_module(&parsed.ast, &lower_options);

    let diagnostics: Vec<&Diagnostic> = parsed
        .diagnostics
        .iter()
        .chain(lowered.diagnostics.iter())
        .collect();
    for diag in &diagnostics {
        eprintln!("{}", diag.render(path));
    }

    let errors = diagnostics.iter().filter(|diag| diag.is_error()).count();
    if errors > 0 {
        eprintln!("{path}: {errors} error(s)");
        return false;
    }
    if !options.quiet {
        let dynamic = lowered
            .sites
            .iter()
            .filter(|site| !matches!(site.binding, PropertyBinding::Static(_)))
            .count();
        println!(
            "OK: {path} ({} nodes, {} values, {dynamic} dynamic, {} warnings)",
            parsed.ast.node_count(),
            lowered.sites.len(),
            diagnostics.len()
        );
    }
    true
}
