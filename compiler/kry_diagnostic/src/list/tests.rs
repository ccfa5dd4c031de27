use super::*;
use kry_ir::{LineCol, Span};
use pretty_assertions::assert_eq;

fn syntax_at(line: u32, message: &str) -> Diagnostic {
    Diagnostic::error(Category::Syntax, message).at(LineCol::new(line, 1), Span::point(0))
}

#[test]
fn non_fatal_diagnostics_accumulate() {
    let mut list = DiagnosticList::new();
    list.add(syntax_at(1, "expected '='"));
    list.add(Diagnostic::warning(Category::Validation, "unused state"));
    list.add(syntax_at(4, "expected '}'"));

    assert_eq!(list.len(), 3);
    assert_eq!(list.error_count(), 2);
    assert_eq!(list.warning_count(), 1);
    assert!(list.has_errors());
    assert!(!list.should_stop());
}

#[test]
fn fatal_stops() {
    let mut list = DiagnosticList::new();
    list.add(Diagnostic::fatal(Category::BufferOverflow, "source too large"));
    assert!(list.should_stop());
    assert_eq!(list.fatal_count(), 1);
}

#[test]
fn first_mirrors_earliest_report() {
    let mut list = DiagnosticList::new();
    assert_eq!(list.first_message(), None);
    list.add(syntax_at(2, "first"));
    list.add(syntax_at(3, "second"));
    assert_eq!(list.first_message(), Some("first"));
}

#[test]
fn distinct_errors_on_one_line_are_all_kept() {
    let mut list = DiagnosticList::new();
    assert!(list.add(syntax_at(5, "expected value")));
    assert!(list.add(syntax_at(5, "expected '}'")));
    assert!(list.add(syntax_at(5, "expected value")));
    assert_eq!(list.len(), 3);
}

#[test]
fn deduplication_drops_only_repeated_messages() {
    let mut list = DiagnosticList::with_config(DiagnosticConfig {
        deduplicate: true,
        ..DiagnosticConfig::default()
    });
    assert!(list.add(syntax_at(5, "expected value")));
    assert!(list.add(syntax_at(5, "expected '}'")));
    assert!(!list.add(syntax_at(5, "expected value")));
    assert!(list.add(syntax_at(6, "expected value")));
    assert_eq!(list.len(), 3);
}

#[test]
fn error_limit_adds_fatal_and_stops_collecting() {
    let mut list = DiagnosticList::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    list.add(syntax_at(1, "one"));
    assert!(!list.should_stop());
    list.add(syntax_at(2, "two"));
    assert!(list.should_stop());
    assert!(!list.add(syntax_at(3, "three")));

    let last = list.iter().last().map(|diag| (diag.level, diag.category));
    assert_eq!(last, Some((Level::Fatal, Category::LimitExceeded)));
    assert_eq!(list.len(), 3);
}

#[test]
fn render_uses_file_line_column() {
    let diag = Diagnostic::error(Category::Syntax, "expected '{'")
        .at(LineCol::new(3, 14), Span::new(40, 41));
    assert_eq!(
        diag.render("app.kry"),
        "app.kry:3:14: error[syntax]: expected '{'"
    );
}
