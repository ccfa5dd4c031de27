use pretty_assertions::assert_eq;

use super::Scope;
use crate::value::IrValue;

#[test]
fn set_and_get() {
    let mut scope = Scope::new();
    assert!(scope.is_empty());
    scope.set("count", 3_i64);
    assert_eq!(scope.get("count"), Some(&IrValue::Int(3)));
    assert_eq!(scope.get("missing"), None);
    assert_eq!(scope.len(), 1);
}

#[test]
fn child_scopes_shadow_and_fall_through() {
    let parent = Scope::new().with("a", 1_i64).with("b", "outer");
    let mut child = Scope::child(&parent);
    child.set("b", "inner");

    assert_eq!(child.get("a"), Some(&IrValue::Int(1)));
    assert_eq!(child.get("b"), Some(&IrValue::from("inner")));
    assert_eq!(parent.get("b"), Some(&IrValue::from("outer")));
    assert!(child.contains("a"));
    assert_eq!(child.len(), 1);
}

#[test]
fn remove_uncovers_the_parent_binding() {
    let parent = Scope::new().with("x", 1_i64);
    let mut child = Scope::child(&parent);
    child.set("x", 2_i64);
    assert_eq!(child.remove("x"), Some(IrValue::Int(2)));
    assert_eq!(child.get("x"), Some(&IrValue::Int(1)));
}
