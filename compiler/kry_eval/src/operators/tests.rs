use kry_ir::{BinaryOp, UnaryOp};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::{evaluate_binary, evaluate_unary};
use crate::value::IrValue;

fn bin(op: BinaryOp, left: impl Into<IrValue>, right: impl Into<IrValue>) -> IrValue {
    evaluate_binary(op, left.into(), right.into())
}

// === Arithmetic ===

#[test]
fn integer_arithmetic() {
    assert_eq!(bin(BinaryOp::Add, 2_i64, 3_i64), IrValue::Int(5));
    assert_eq!(bin(BinaryOp::Sub, 2_i64, 3_i64), IrValue::Int(-1));
    assert_eq!(bin(BinaryOp::Mul, 4_i64, 3_i64), IrValue::Int(12));
    assert_eq!(bin(BinaryOp::Div, 7_i64, 2_i64), IrValue::Int(3));
    assert_eq!(bin(BinaryOp::Mod, -7_i64, 3_i64), IrValue::Int(-1));
}

#[test]
fn mixed_arithmetic_promotes_to_float() {
    assert_eq!(bin(BinaryOp::Add, 1_i64, 2.5), IrValue::Float(3.5));
    assert_eq!(bin(BinaryOp::Mul, 0.5, 4_i64), IrValue::Float(2.0));
    assert_eq!(bin(BinaryOp::Div, 1.0, 4.0), IrValue::Float(0.25));
}

#[test]
fn division_by_zero_and_overflow_are_null() {
    assert_eq!(bin(BinaryOp::Div, 1_i64, 0_i64), IrValue::Null);
    assert_eq!(bin(BinaryOp::Mod, 1_i64, 0_i64), IrValue::Null);
    assert_eq!(bin(BinaryOp::Div, 1.0, 0.0), IrValue::Null);
    assert_eq!(bin(BinaryOp::Mod, 1_i64, 0.0), IrValue::Null);
    assert_eq!(bin(BinaryOp::Add, i64::MAX, 1_i64), IrValue::Null);
    assert_eq!(bin(BinaryOp::Div, i64::MIN, -1_i64), IrValue::Null);
}

#[test]
fn arithmetic_on_non_numbers_is_null() {
    assert_eq!(bin(BinaryOp::Sub, "a", 1_i64), IrValue::Null);
    assert_eq!(bin(BinaryOp::Mul, true, 2_i64), IrValue::Null);
    assert_eq!(evaluate_binary(BinaryOp::Add, IrValue::Null, IrValue::Int(1)), IrValue::Null);
}

// === Concatenation ===

#[test]
fn plus_concatenates_when_either_side_is_a_string() {
    assert_eq!(bin(BinaryOp::Add, "X", "Y"), IrValue::from("XY"));
    assert_eq!(bin(BinaryOp::Add, "n=", 1_i64), IrValue::from("n=1"));
    assert_eq!(bin(BinaryOp::Add, 1_i64, "px"), IrValue::from("1px"));
    assert_eq!(bin(BinaryOp::Add, 2.5, "em"), IrValue::from("2.5em"));
    assert_eq!(bin(BinaryOp::Add, "is ", true), IrValue::from("is true"));
    assert_eq!(
        evaluate_binary(BinaryOp::Add, IrValue::from("v: "), IrValue::Null),
        IrValue::from("v: null")
    );
}

// === Comparison ===

#[test]
fn equality_never_coerces() {
    assert_eq!(bin(BinaryOp::Eq, 1_i64, 1.0), IrValue::Bool(false));
    assert_eq!(bin(BinaryOp::NotEq, 1_i64, "1"), IrValue::Bool(true));
    assert_eq!(bin(BinaryOp::Eq, "a", "a"), IrValue::Bool(true));
}

#[test]
fn ordering() {
    assert_eq!(bin(BinaryOp::Lt, 1_i64, 1.5), IrValue::Bool(true));
    assert_eq!(bin(BinaryOp::GtEq, 2_i64, 2_i64), IrValue::Bool(true));
    assert_eq!(bin(BinaryOp::Gt, "b", "a"), IrValue::Bool(true));
    assert_eq!(bin(BinaryOp::LtEq, "ab", "a"), IrValue::Bool(false));
}

#[test]
fn unordered_pairs_compare_false() {
    for op in [BinaryOp::Lt, BinaryOp::Gt, BinaryOp::LtEq, BinaryOp::GtEq] {
        assert_eq!(bin(op, "1", 1_i64), IrValue::Bool(false));
        assert_eq!(bin(op, true, false), IrValue::Bool(false));
        assert_eq!(bin(op, f64::NAN, 1.0), IrValue::Bool(false));
    }
}

#[test]
fn eager_logical_operators_yield_booleans() {
    assert_eq!(bin(BinaryOp::And, 1_i64, "x"), IrValue::Bool(true));
    assert_eq!(bin(BinaryOp::Or, 0_i64, ""), IrValue::Bool(false));
}

// === Unary ===

#[test]
fn unary_operators() {
    assert_eq!(evaluate_unary(UnaryOp::Neg, &IrValue::Int(4)), IrValue::Int(-4));
    assert_eq!(evaluate_unary(UnaryOp::Neg, &IrValue::Float(1.5)), IrValue::Float(-1.5));
    assert_eq!(evaluate_unary(UnaryOp::Neg, &IrValue::Int(i64::MIN)), IrValue::Null);
    assert_eq!(evaluate_unary(UnaryOp::Neg, &IrValue::from("4")), IrValue::Null);
    assert_eq!(evaluate_unary(UnaryOp::Not, &IrValue::Int(0)), IrValue::Bool(true));
    assert_eq!(evaluate_unary(UnaryOp::Not, &IrValue::from("x")), IrValue::Bool(false));
    assert_eq!(
        evaluate_unary(UnaryOp::TypeOf, &IrValue::Array(Vec::new())),
        IrValue::from("array")
    );
}

// === Properties ===

proptest! {
    #[test]
    fn integer_arithmetic_matches_i64(
        a in -1_000_000_i64..1_000_000,
        b in -1_000_000_i64..1_000_000
    ) {
        prop_assert_eq!(bin(BinaryOp::Add, a, b), IrValue::Int(a + b));
        prop_assert_eq!(bin(BinaryOp::Sub, a, b), IrValue::Int(a - b));
        prop_assert_eq!(bin(BinaryOp::Mul, a, b), IrValue::Int(a * b));
        if b != 0 {
            prop_assert_eq!(bin(BinaryOp::Div, a, b), IrValue::Int(a / b));
            prop_assert_eq!(bin(BinaryOp::Mod, a, b), IrValue::Int(a % b));
        }
    }

    #[test]
    fn mixed_addition_is_float_addition(a in -1_000_000_i64..1_000_000, b in -1.0e6_f64..1.0e6) {
        #[allow(clippy::cast_precision_loss, reason = "operands are small")]
        let expected = a as f64 + b;
        prop_assert_eq!(bin(BinaryOp::Add, a, b), IrValue::Float(expected));
    }

    #[test]
    fn integer_ordering_is_total(a in any::<i64>(), b in any::<i64>()) {
        let holds = |op| bin(op, a, b) == IrValue::Bool(true);
        let count = [holds(BinaryOp::Lt), holds(BinaryOp::Eq), holds(BinaryOp::Gt)]
            .into_iter()
            .filter(|&h| h)
            .count();
        prop_assert_eq!(count, 1);
        prop_assert_eq!(holds(BinaryOp::LtEq), holds(BinaryOp::Lt) || holds(BinaryOp::Eq));
    }

    #[test]
    fn string_ordering_is_total(a in "[a-zA-Z0-9 ]{0,8}", b in "[a-zA-Z0-9 ]{0,8}") {
        let holds = |op| bin(op, a.as_str(), b.as_str()) == IrValue::Bool(true);
        let count = [holds(BinaryOp::Lt), holds(BinaryOp::Eq), holds(BinaryOp::Gt)]
            .into_iter()
            .filter(|&h| h)
            .count();
        prop_assert_eq!(count, 1);
        prop_assert_eq!(holds(BinaryOp::Lt), a < b);
    }

    #[test]
    fn string_plus_number_concatenates(s in "[a-z]{0,6}", n in any::<i64>()) {
        prop_assert_eq!(bin(BinaryOp::Add, s.as_str(), n), IrValue::String(format!("{s}{n}")));
    }
}
