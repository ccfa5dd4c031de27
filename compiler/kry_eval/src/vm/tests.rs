use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use kry_ir::BuiltinSig;
use kry_lower::lower_source;
use pretty_assertions::assert_eq;

use super::Vm;
use crate::compile::{compile, CompilerOptions};
use crate::registry::BuiltinRegistry;
use crate::scope::Scope;
use crate::value::{FunctionBody, FunctionValue, IrValue};

fn eval_with(
    registry: &BuiltinRegistry,
    options: &CompilerOptions,
    text: &str,
    scope: &Scope<'_>,
) -> IrValue {
    let compiled = compile(&lower_source(text).unwrap(), options);
    Vm::new(registry).eval(&compiled, scope)
}

fn eval(text: &str, scope: &Scope<'_>) -> IrValue {
    let registry = BuiltinRegistry::with_stdlib();
    eval_with(&registry, &CompilerOptions::default(), text, scope)
}

fn ints(values: &[i64]) -> IrValue {
    IrValue::Array(values.iter().copied().map(IrValue::Int).collect())
}

fn counting_registry() -> (BuiltinRegistry, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut registry = BuiltinRegistry::with_stdlib();
    registry
        .register("f", BuiltinSig::new(0, 0, false), move |_| {
            counter.set(counter.get() + 1);
            IrValue::Bool(true)
        })
        .unwrap();
    (registry, calls)
}

#[test]
fn logical_operators_short_circuit() {
    let (registry, calls) = counting_registry();
    let scope = Scope::new();
    for options in [CompilerOptions::default(), CompilerOptions { fold_constants: false }] {
        calls.set(0);
        let eval = |text: &str| eval_with(&registry, &options, text, &scope);

        assert_eq!(eval("false && f()"), IrValue::Bool(false));
        assert_eq!(eval("true || f()"), IrValue::Bool(true));
        assert_eq!(calls.get(), 0);

        assert_eq!(eval("true && f()"), IrValue::Bool(true));
        assert_eq!(eval("0 || f()"), IrValue::Bool(true));
        assert_eq!(calls.get(), 2);
    }
}

#[test]
fn logical_results_are_booleans() {
    let scope = Scope::new().with("name", "kry").with("empty", "");
    assert_eq!(eval("name && 1", &scope), IrValue::Bool(true));
    assert_eq!(eval("empty || null", &scope), IrValue::Bool(false));
    assert_eq!(eval("!empty", &scope), IrValue::Bool(true));
}

#[test]
fn variables_resolve_through_the_scope() {
    let scope = Scope::new().with("width", 40_i64).with("ratio", 0.5);
    assert_eq!(eval("width * ratio", &scope), IrValue::Float(20.0));
    assert_eq!(eval("missing", &scope), IrValue::Null);
    assert_eq!(eval("missing + 1", &scope), IrValue::Null);
    assert_eq!(eval("missing == null", &scope), IrValue::Bool(true));
}

#[test]
fn ternary_selects_a_branch() {
    let scope = Scope::new().with("count", 3_i64);
    assert_eq!(
        eval("count > 1 ? `${count} items` : \"one item\"", &scope),
        IrValue::from("3 items")
    );
    let scope = Scope::new().with("count", 1_i64);
    assert_eq!(
        eval("count > 1 ? `${count} items` : \"one item\"", &scope),
        IrValue::from("one item")
    );
}

#[test]
fn methods_map_to_builtins() {
    let scope = Scope::new()
        .with("title", "  Hello  ")
        .with("xs", ints(&[1, 2, 3]));
    assert_eq!(eval("title.trim().toUpperCase()", &scope), IrValue::from("HELLO"));
    assert_eq!(eval("xs.join(\"-\")", &scope), IrValue::from("1-2-3"));
    assert_eq!(eval("xs.push(4).length", &scope), IrValue::Int(4));
    assert_eq!(eval("xs.length", &scope), IrValue::Int(3));
    assert_eq!(eval("\"a,b,,c\".split(\",\").length", &scope), IrValue::Int(3));
    assert_eq!(eval("xs.indexOf(2)", &scope), IrValue::Int(1));
    assert_eq!(eval("xs.explode()", &scope), IrValue::Null);
    assert_eq!(eval("(42).trim()", &scope), IrValue::Null);
}

#[test]
fn indexing() {
    let scope = Scope::new()
        .with("xs", ints(&[10, 20, 30]))
        .with("word", "héllo")
        .with(
            "user",
            IrValue::Object(vec![("name".to_owned(), IrValue::from("ada"))]),
        );
    assert_eq!(eval("xs[1]", &scope), IrValue::Int(20));
    assert_eq!(eval("xs[3]", &scope), IrValue::Null);
    assert_eq!(eval("xs[0 - 1]", &scope), IrValue::Null);
    assert_eq!(eval("word[1]", &scope), IrValue::from("é"));
    assert_eq!(eval("word.length", &scope), IrValue::Int(5));
    assert_eq!(eval("user[\"name\"]", &scope), IrValue::from("ada"));
    assert_eq!(eval("user.name.length", &scope), IrValue::Int(3));
    assert_eq!(eval("user.age", &scope), IrValue::Null);
}

#[test]
fn collections_and_ranges() {
    let scope = Scope::new().with("x", 2_i64);
    assert_eq!(
        eval("{ a: x, b: [x, x * 2] }", &scope),
        IrValue::Object(vec![
            ("a".to_owned(), IrValue::Int(2)),
            ("b".to_owned(), ints(&[2, 4])),
        ])
    );
    assert_eq!(eval("__range__(0, 4)", &scope), ints(&[0, 1, 2, 3]));
    assert_eq!(eval("__range__(3, 1)", &scope), ints(&[]));
    assert_eq!(eval("__range__(\"a\", 1)", &scope), IrValue::Null);
}

#[test]
fn builtins_compose() {
    let scope = Scope::new();
    assert_eq!(
        eval("string_length(string_toUpper(\"hello\"))", &scope),
        IrValue::Int(5)
    );
    assert_eq!(eval("math_clamp(15, 0, 10)", &scope), IrValue::Int(10));
    assert_eq!(eval("typeof 1.5", &scope), IrValue::from("float"));
    assert_eq!(eval("type_toString(3.0)", &scope), IrValue::from("3"));
}

#[test]
fn unknown_calls_yield_null() {
    let scope = Scope::new().with("notfn", 3_i64);
    assert_eq!(eval("nope(1, 2)", &scope), IrValue::Null);
    assert_eq!(eval("notfn()", &scope), IrValue::Null);
    assert_eq!(eval("string_length()", &scope), IrValue::Null);
}

#[test]
fn arrow_functions_called_from_scope() {
    let registry = BuiltinRegistry::with_stdlib();
    let options = CompilerOptions::default();
    let empty = Scope::new();

    let add = eval_with(&registry, &options, "(a, b) => a + b", &empty);
    assert!(matches!(&add, IrValue::Function(f) if f.params == ["a", "b"]));
    assert_eq!(add.to_string(), "<function(a, b)>");

    let scope = Scope::new().with("add", add).with("a", 100_i64);
    assert_eq!(eval_with(&registry, &options, "add(2, 3)", &scope), IrValue::Int(5));
    // Missing arguments bind as null; the parameter shadows the outer `a`.
    assert_eq!(eval_with(&registry, &options, "add(2)", &scope), IrValue::Null);

    let handler = eval_with(
        &registry,
        &options,
        "{ greet: name => \"hi \" + name }",
        &empty,
    );
    let scope = Scope::new().with("obj", handler);
    assert_eq!(
        eval_with(&registry, &options, "obj.greet(\"bob\")", &scope),
        IrValue::from("hi bob")
    );
    assert_eq!(eval_with(&registry, &options, "obj.wave()", &scope), IrValue::Null);
}

#[test]
fn recursion_is_bounded() {
    let registry = BuiltinRegistry::with_stdlib();
    let options = CompilerOptions::default();
    let empty = Scope::new();

    let fact = eval_with(&registry, &options, "n => n <= 1 ? 1 : n * fact(n - 1)", &empty);
    let scope = Scope::new().with("fact", fact);
    assert_eq!(eval_with(&registry, &options, "fact(5)", &scope), IrValue::Int(120));

    let spin = eval_with(&registry, &options, "n => spin(n + 1)", &empty);
    let scope = Scope::new().with("spin", spin);
    let compiled = compile(&lower_source("spin(0)").unwrap(), &options);
    let vm = Vm::new(&registry).with_max_call_depth(8);
    assert_eq!(vm.eval(&compiled, &scope), IrValue::Null);
}

#[test]
fn registry_names_win_over_scope_functions() {
    let registry = BuiltinRegistry::with_stdlib();
    let options = CompilerOptions::default();
    let shadow = eval_with(&registry, &options, "s => 0", &Scope::new());
    let scope = Scope::new().with("string_length", shadow);
    assert_eq!(
        eval_with(&registry, &options, "string_length(\"abc\")", &scope),
        IrValue::Int(3)
    );
}

#[test]
fn block_bodies_are_not_run() {
    let registry = BuiltinRegistry::with_stdlib();
    let function = FunctionValue {
        params: vec!["x".to_owned()],
        body: FunctionBody::Block("return x".to_owned()),
    };
    let vm = Vm::new(&registry);
    assert_eq!(
        vm.call_function(&function, &[IrValue::Int(1)], &Scope::new()),
        IrValue::Null
    );

    let value = IrValue::Function(Arc::new(function));
    assert_eq!(value.type_name(), "function");
}
