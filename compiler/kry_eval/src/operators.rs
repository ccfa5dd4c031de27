//! Operator semantics shared by the VM and the constant folder.
//!
//! Direct enum dispatch over the operand types. Every combination has a
//! defined result: type mismatches, division by zero and integer overflow
//! produce `Null` rather than an error.

use kry_ir::{BinaryOp, UnaryOp};

use crate::value::IrValue;

/// Apply a binary operator to two evaluated operands.
///
/// `&&` and `||` are handled here too (as plain truthiness), but the
/// compiler lowers them to jumps so the right operand is evaluated lazily.
pub fn evaluate_binary(op: BinaryOp, left: IrValue, right: IrValue) -> IrValue {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, &left, &right)
        }
        BinaryOp::Eq => IrValue::Bool(left.strict_eq(&right)),
        BinaryOp::NotEq => IrValue::Bool(!left.strict_eq(&right)),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
            compare(op, &left, &right)
        }
        BinaryOp::And => IrValue::Bool(left.is_truthy() && right.is_truthy()),
        BinaryOp::Or => IrValue::Bool(left.is_truthy() || right.is_truthy()),
        BinaryOp::Assign => IrValue::Null,
    }
}

pub fn evaluate_unary(op: UnaryOp, operand: &IrValue) -> IrValue {
    match (op, operand) {
        (UnaryOp::Neg, IrValue::Int(v)) => v.checked_neg().map_or(IrValue::Null, IrValue::Int),
        (UnaryOp::Neg, IrValue::Float(v)) => IrValue::Float(-v),
        (UnaryOp::Neg, _) => IrValue::Null,
        (UnaryOp::Not, value) => IrValue::Bool(!value.is_truthy()),
        (UnaryOp::TypeOf, value) => IrValue::String(value.type_name().to_owned()),
    }
}

/// `+` concatenates when either side is a string, otherwise adds numbers.
fn add(left: IrValue, right: IrValue) -> IrValue {
    match (left, right) {
        (IrValue::String(mut a), IrValue::String(b)) => {
            a.push_str(&b);
            IrValue::String(a)
        }
        (IrValue::String(mut a), b) => {
            a.push_str(&b.to_string());
            IrValue::String(a)
        }
        (a, IrValue::String(b)) => IrValue::String(format!("{a}{b}")),
        (a, b) => arithmetic(BinaryOp::Add, &a, &b),
    }
}

fn arithmetic(op: BinaryOp, left: &IrValue, right: &IrValue) -> IrValue {
    match (left, right) {
        (IrValue::Int(a), IrValue::Int(b)) => int_arithmetic(op, *a, *b),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => float_arithmetic(op, a, b),
            _ => IrValue::Null,
        },
    }
}

/// Checked integer arithmetic; overflow and a zero divisor give `Null`.
fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> IrValue {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Mod => a.checked_rem(b),
        _ => None,
    };
    result.map_or(IrValue::Null, IrValue::Int)
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> IrValue {
    match op {
        BinaryOp::Add => IrValue::Float(a + b),
        BinaryOp::Sub => IrValue::Float(a - b),
        BinaryOp::Mul => IrValue::Float(a * b),
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => IrValue::Null,
        BinaryOp::Div => IrValue::Float(a / b),
        BinaryOp::Mod => IrValue::Float(a % b),
        _ => IrValue::Null,
    }
}

/// Unordered pairs (mismatched types, NaN) compare false for every operator.
fn compare(op: BinaryOp, left: &IrValue, right: &IrValue) -> IrValue {
    let Some(ordering) = left.compare(right) else {
        return IrValue::Bool(false);
    };
    IrValue::Bool(match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::GtEq => ordering.is_ge(),
        _ => false,
    })
}

#[cfg(test)]
mod tests;
