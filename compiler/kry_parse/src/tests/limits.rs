use kry_diagnostic::{Category, Level};
use pretty_assertions::assert_eq;

use super::{assert_error, only_diagnostic, parse_with};
use crate::ParseOptions;

#[test]
fn array_cap_discards_the_property() {
    let options = ParseOptions {
        max_array_elements: 2,
        ..ParseOptions::default()
    };
    let output = parse_with("Box { items = [1, 2, 3]; size = 4 }", &options);
    assert_error(
        only_diagnostic(&output),
        Category::LimitExceeded,
        "array literal exceeds the limit of 2",
    );
    assert_eq!(output.ast.dump(), "Root\n  Component Box\n    Property size = 4\n");
}

#[test]
fn default_array_cap_is_256() {
    let at_cap = vec!["0"; 256].join(", ");
    let output = parse_with(&format!("Box {{ items = [{at_cap}] }}"), &ParseOptions::default());
    assert!(output.diagnostics.is_empty());

    let over_cap = vec!["0"; 257].join(", ");
    let output = parse_with(&format!("Box {{ items = [{over_cap}] }}"), &ParseOptions::default());
    assert_error(
        only_diagnostic(&output),
        Category::LimitExceeded,
        "exceeds the limit of 256",
    );
}

#[test]
fn object_cap() {
    let options = ParseOptions {
        max_object_entries: 1,
        ..ParseOptions::default()
    };
    let output = parse_with("Box { o = { a: 1, b: 2 } }", &options);
    assert_error(
        only_diagnostic(&output),
        Category::LimitExceeded,
        "object literal exceeds the limit of 1",
    );
    assert_eq!(output.ast.dump(), "Root\n  Component Box\n");
}

#[test]
fn parameter_cap() {
    let options = ParseOptions {
        max_params: 1,
        ..ParseOptions::default()
    };
    let output = parse_with("component Pair(a, b) { }\nText {}", &options);
    assert_error(
        only_diagnostic(&output),
        Category::LimitExceeded,
        "parameter list exceeds the limit of 1",
    );
    assert_eq!(output.ast.dump(), "Root\n  Component Text\n");
}

#[test]
fn struct_field_cap() {
    let options = ParseOptions {
        max_struct_fields: 1,
        ..ParseOptions::default()
    };
    let output = parse_with("struct P { a: int; b: int }\nText {}", &options);
    assert_error(
        only_diagnostic(&output),
        Category::LimitExceeded,
        "struct `P` exceeds the limit of 1",
    );
    assert_eq!(output.ast.dump(), "Root\n  Component Text\n");
}

#[test]
fn identifier_length_cap() {
    let long = "a".repeat(257);
    let output = parse_with(&format!("Box {{ {long} = 1 }}"), &ParseOptions::default());
    assert_error(
        only_diagnostic(&output),
        Category::BufferOverflow,
        "identifier longer than 256 bytes",
    );

    let fits = "a".repeat(256);
    let output = parse_with(&format!("Box {{ {fits} = 1 }}"), &ParseOptions::default());
    assert!(output.diagnostics.is_empty());
}

#[test]
fn expression_length_cap() {
    let long = "x".repeat(600);
    let output = parse_with(
        &format!("Box {{ v = a + \"{long}\" }}"),
        &ParseOptions::default(),
    );
    assert_error(
        only_diagnostic(&output),
        Category::BufferOverflow,
        "longer than 511",
    );
    assert_eq!(output.ast.dump(), "Root\n  Component Box\n");
}

#[test]
fn nesting_limit_is_fatal() {
    let options = ParseOptions {
        max_nesting: 3,
        ..ParseOptions::default()
    };
    let output = parse_with("A { B { C { D { } } } }\nE {}", &options);
    let diag = only_diagnostic(&output);
    assert_eq!(diag.level, Level::Fatal);
    assert_eq!(diag.category, Category::LimitExceeded);
    assert!(output.diagnostics.should_stop());
}

#[test]
fn very_deep_input_fails_without_overflowing_the_stack() {
    let depth = 2_000;
    let source = format!("{}{}", "A { ".repeat(depth), "} ".repeat(depth));
    let output = parse_with(&source, &ParseOptions::default());
    assert!(output.diagnostics.should_stop());
    assert_eq!(output.diagnostics.fatal_count(), 1);
}
