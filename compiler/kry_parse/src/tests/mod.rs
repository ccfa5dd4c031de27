//! End-to-end parser tests: source text in, tree dump and diagnostics out.

mod limits;
mod statements;

use kry_diagnostic::{Category, Diagnostic, Level};

use crate::{parse, ParseOptions, ParseOutput};

/// Parse with default options, failing on any diagnostic.
fn parse_clean(source: &str) -> ParseOutput {
    let output = parse(source, &ParseOptions::default());
    assert!(
        output.diagnostics.is_empty(),
        "unexpected diagnostics for {source:?}: {:#?}",
        output.diagnostics.as_slice()
    );
    output
}

fn dump(source: &str) -> String {
    parse_clean(source).ast.dump()
}

fn parse_with(source: &str, options: &ParseOptions) -> ParseOutput {
    parse(source, options)
}

fn only_diagnostic(output: &ParseOutput) -> &Diagnostic {
    let all = output.diagnostics.as_slice();
    assert_eq!(all.len(), 1, "expected exactly one diagnostic: {all:#?}");
    &all[0]
}

fn assert_error(diag: &Diagnostic, category: Category, fragment: &str) {
    assert_eq!(diag.level, Level::Error, "{diag}");
    assert_eq!(diag.category, category, "{diag}");
    assert!(
        diag.message.contains(fragment),
        "message {:?} does not mention {fragment:?}",
        diag.message
    );
}
