use std::cell::Cell;
use std::rc::Rc;

use kry_ir::{BuiltinFn, BuiltinSig};
use pretty_assertions::assert_eq;

use super::{bucket_of, fnv1a, BuiltinRegistry, RegisterError};
use crate::value::IrValue;

#[test]
fn fnv1a_reference_values() {
    assert_eq!(fnv1a(""), 0xcbf2_9ce4_8422_2325);
    assert_eq!(fnv1a("a"), 0xaf63_dc4c_8601_ec8c);
    assert_eq!(fnv1a("foobar"), 0x8594_4171_f739_67e8);
}

#[test]
fn stdlib_is_fully_seeded() {
    let registry = BuiltinRegistry::with_stdlib();
    assert_eq!(registry.len(), BuiltinFn::ALL.len());
    let mut names: Vec<&str> = registry.names().collect();
    names.sort_unstable();
    let mut expected: Vec<&str> = BuiltinFn::ALL.iter().map(|b| b.name()).collect();
    expected.sort_unstable();
    assert_eq!(names, expected);
}

#[test]
fn colliding_names_share_a_bucket_and_both_resolve() {
    assert_eq!(
        bucket_of(fnv1a("array_length")),
        bucket_of(fnv1a("array_slice"))
    );
    let registry = BuiltinRegistry::with_stdlib();
    let items = IrValue::Array(vec![IrValue::Int(1), IrValue::Int(2)]);
    assert_eq!(registry.call("array_length", &[items.clone()]), IrValue::Int(2));
    assert_eq!(
        registry.call("array_slice", &[items, IrValue::Int(1)]),
        IrValue::Array(vec![IrValue::Int(2)])
    );
}

#[test]
fn arity_is_checked_before_dispatch() {
    let registry = BuiltinRegistry::with_stdlib();
    assert_eq!(registry.call("string_length", &[]), IrValue::Null);
    assert_eq!(
        registry.call("string_length", &[IrValue::from("a"), IrValue::from("b")]),
        IrValue::Null
    );
    let many: Vec<IrValue> = (1..=6).map(IrValue::Int).collect();
    assert_eq!(registry.call("math_max", &many), IrValue::Int(6));
    assert_eq!(registry.call("math_max", &[]), IrValue::Null);
}

#[test]
fn unknown_names_yield_null() {
    let registry = BuiltinRegistry::with_stdlib();
    assert!(!registry.contains("string_reverse"));
    assert_eq!(registry.call("string_reverse", &[IrValue::from("ab")]), IrValue::Null);
}

#[test]
fn empty_registry_knows_nothing() {
    let registry = BuiltinRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.call("string_length", &[IrValue::from("ab")]), IrValue::Null);
}

#[test]
fn purity_follows_the_signature() {
    let registry = BuiltinRegistry::with_stdlib();
    assert!(registry.is_pure("string_trim"));
    assert!(!registry.is_pure("math_random"));
    assert!(!registry.is_pure("array_push"));
    assert!(!registry.is_pure("not_registered"));
    assert_eq!(
        registry.signature("array_join"),
        Some(BuiltinSig::new(1, 2, true))
    );
}

#[test]
fn plugins_are_callable_and_keep_state() {
    let calls = Rc::new(Cell::new(0_i64));
    let counter = Rc::clone(&calls);
    let mut registry = BuiltinRegistry::with_stdlib();
    registry
        .register("tick", BuiltinSig::new(0, 1, false), move |args| {
            counter.set(counter.get() + 1);
            args.first().cloned().unwrap_or(IrValue::Int(counter.get()))
        })
        .unwrap();

    assert_eq!(registry.call("tick", &[]), IrValue::Int(1));
    assert_eq!(registry.call("tick", &[IrValue::from("x")]), IrValue::from("x"));
    assert_eq!(calls.get(), 2);
    assert!(!registry.is_pure("tick"));
    assert_eq!(registry.len(), BuiltinFn::ALL.len() + 1);
}

#[test]
fn registration_errors() {
    let mut registry = BuiltinRegistry::with_stdlib();
    let noop = |_: &[IrValue]| IrValue::Null;
    let sig = BuiltinSig::new(0, 0, true);

    assert_eq!(registry.register("", sig, noop), Err(RegisterError::EmptyName));
    assert_eq!(
        registry.register("__range__", sig, noop),
        Err(RegisterError::Reserved("__range__".to_owned()))
    );
    assert_eq!(
        registry.register("string_trim", sig, noop),
        Err(RegisterError::Duplicate("string_trim".to_owned()))
    );
    assert_eq!(
        registry.register("bad", BuiltinSig::new(3, 1, true), noop),
        Err(RegisterError::InvalidArity {
            name: "bad".to_owned(),
            min: 3,
            max: 1
        })
    );
    assert_eq!(registry.len(), BuiltinFn::ALL.len());
}
