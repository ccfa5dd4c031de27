use kry_ir::{BinaryOp, IrExpr, IrLiteral, NodeKind};
use kry_parse::{parse, ParseOptions};
use pretty_assertions::assert_eq;

use super::{lower_property, BindingKind, PropertyBinding, PropertyClass};
use crate::LowerOptions;

/// Lower the single property of `Box { name = value }`.
fn bind(name: &str, value: &str, options: &LowerOptions, scope: &[&str]) -> PropertyBinding {
    let output = parse(&format!("Box {{ {name} = {value} }}"), &ParseOptions::default());
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let ast = &output.ast;
    let NodeKind::Component { children, .. } = ast.node(ast.items()[0]).kind else {
        panic!("expected a component");
    };
    let NodeKind::Property { value, .. } = ast.node(ast.children(children)[0]).kind else {
        panic!("expected a property");
    };
    let scope: Vec<String> = scope.iter().map(|s| (*s).to_owned()).collect();
    lower_property(ast, name, value, options, &scope).unwrap()
}

fn fallback_of(name: &str, value: &str) -> IrLiteral {
    match bind(name, value, &LowerOptions::hybrid(), &[]) {
        PropertyBinding::Hybrid { fallback, .. } => fallback,
        other => panic!("expected a hybrid binding, got {other:?}"),
    }
}

#[test]
fn literal_values_are_static_in_every_mode() {
    assert_eq!(
        bind("width", "200", &LowerOptions::hybrid(), &[]),
        PropertyBinding::Static(IrExpr::int(200))
    );
    assert_eq!(
        bind("color", "\"#ff0000\"", &LowerOptions::default(), &[]),
        PropertyBinding::Static(IrExpr::string("#ff0000"))
    );
}

#[test]
fn runtime_mode_keeps_expressions_dynamic() {
    assert_eq!(
        bind("width", "base * 2", &LowerOptions::default(), &[]),
        PropertyBinding::Dynamic(IrExpr::binary(
            BinaryOp::Mul,
            IrExpr::var("base"),
            IrExpr::int(2)
        ))
    );
}

#[test]
fn hybrid_fallbacks_follow_the_property_class() {
    assert_eq!(
        fallback_of("color", "theme.accent"),
        IrLiteral::String("#00000000".to_owned())
    );
    assert_eq!(
        fallback_of("backgroundColor", "bg"),
        IrLiteral::String("#00000000".to_owned())
    );
    assert_eq!(
        fallback_of("alignItems", "align"),
        IrLiteral::String("start".to_owned())
    );
    assert_eq!(fallback_of("fontSize", "size + 2"), IrLiteral::Int(16));
    assert_eq!(
        fallback_of("text", "\"Count: \" + count"),
        IrLiteral::String("\"Count: \" + count".to_owned())
    );
    assert_eq!(fallback_of("gap", "spacing"), IrLiteral::Int(0));
}

#[test]
fn hybrid_binding_carries_source_and_kind() {
    assert_eq!(
        bind("value", "query", &LowerOptions::hybrid(), &[]),
        PropertyBinding::Hybrid {
            expr: IrExpr::var("query"),
            source: "query".to_owned(),
            fallback: IrLiteral::String("query".to_owned()),
            kind: BindingKind::TwoWay,
        }
    );
    let PropertyBinding::Hybrid { kind, .. } = bind("text", "label", &LowerOptions::hybrid(), &[])
    else {
        panic!("expected a hybrid binding");
    };
    assert_eq!(kind, BindingKind::StaticTemplate);
}

#[test]
fn parameters_and_their_fields_are_resolved() {
    let options = LowerOptions::hybrid().with_param("item");
    assert_eq!(
        bind("text", "item", &options, &[]),
        PropertyBinding::Dynamic(IrExpr::var("item"))
    );
    assert!(matches!(
        bind("text", "item.label", &options, &[]),
        PropertyBinding::Dynamic(_)
    ));
    assert!(matches!(
        bind("text", "items", &options, &[]),
        PropertyBinding::Hybrid { .. }
    ));
    assert!(matches!(
        bind("text", "row[0]", &LowerOptions::hybrid(), &["row"]),
        PropertyBinding::Dynamic(_)
    ));
}

#[test]
fn event_properties_are_handlers() {
    let binding = bind("onClick", "() => { count = count + 1 }", &LowerOptions::hybrid(), &[]);
    assert!(matches!(binding, PropertyBinding::Handler(IrExpr::Arrow { .. })));
    assert!(!binding.is_static());
}

#[test]
fn property_classes() {
    assert_eq!(PropertyClass::of("borderColor"), PropertyClass::Color);
    assert_eq!(PropertyClass::of("justifyContent"), PropertyClass::Alignment);
    assert_eq!(PropertyClass::of("onChange"), PropertyClass::Event);
    assert_eq!(PropertyClass::of("online"), PropertyClass::Other);
    assert_eq!(PropertyClass::of("checked"), PropertyClass::Input);
}
