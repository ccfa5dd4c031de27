//! Runtime values produced by the evaluator.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use kry_ir::IrLiteral;

use crate::bytecode::CompiledExpr;

/// A value on the evaluator stack or in a scope.
///
/// Values are owned: arrays and objects are copied on load, so builtins that
/// "mutate" (`array_push`) return a new value and never alias the scope.
#[derive(Clone, Debug, Default)]
pub enum IrValue {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Array(Vec<IrValue>),
    /// Fields in insertion order.
    Object(Vec<(String, IrValue)>),
    Function(Arc<FunctionValue>),
}

/// An arrow function created at evaluation time.
#[derive(Debug)]
pub struct FunctionValue {
    pub params: Vec<String>,
    pub body: FunctionBody,
}

#[derive(Debug)]
pub enum FunctionBody {
    Compiled(CompiledExpr),
    /// Statement block text; handed to the host, never run by the VM.
    Block(String),
}

impl IrValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            IrValue::Null => "null",
            IrValue::Int(_) => "int",
            IrValue::Float(_) => "float",
            IrValue::String(_) => "string",
            IrValue::Bool(_) => "bool",
            IrValue::Array(_) => "array",
            IrValue::Object(_) => "object",
            IrValue::Function(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, IrValue::Null)
    }

    /// Truthiness used by `!`, `&&`, `||`, ternaries and conditional jumps.
    pub fn is_truthy(&self) -> bool {
        match self {
            IrValue::Null => false,
            IrValue::Int(v) => *v != 0,
            IrValue::Float(v) => *v != 0.0,
            IrValue::String(s) => !s.is_empty(),
            IrValue::Bool(b) => *b,
            IrValue::Array(items) => !items.is_empty(),
            IrValue::Object(fields) => !fields.is_empty(),
            IrValue::Function(_) => true,
        }
    }

    /// Language-level `==`.
    ///
    /// Typed: values of different types are never equal, so `1 == 1.0` is
    /// false. Floats compare numerically and functions by identity.
    pub fn strict_eq(&self, other: &IrValue) -> bool {
        match (self, other) {
            (IrValue::Null, IrValue::Null) => true,
            (IrValue::Int(a), IrValue::Int(b)) => a == b,
            (IrValue::Float(a), IrValue::Float(b)) => a == b,
            (IrValue::String(a), IrValue::String(b)) => a == b,
            (IrValue::Bool(a), IrValue::Bool(b)) => a == b,
            (IrValue::Array(a), IrValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (IrValue::Object(a), IrValue::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.strict_eq(vb))
            }
            (IrValue::Function(a), IrValue::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Ordering used by `<`, `<=`, `>` and `>=`.
    ///
    /// Numbers order numerically, with an int promoted when compared against
    /// a float. Strings order bytewise. Every other pairing is unordered.
    pub fn compare(&self, other: &IrValue) -> Option<Ordering> {
        match (self, other) {
            (IrValue::Int(a), IrValue::Int(b)) => Some(a.cmp(b)),
            (IrValue::String(a), IrValue::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            _ => {
                let (a, b) = (self.as_f64()?, other.as_f64()?);
                a.partial_cmp(&b)
            }
        }
    }

    /// Numeric view of an int or float.
    #[allow(
        clippy::cast_precision_loss,
        reason = "int to float promotion is the language's mixed-arithmetic rule"
    )]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            IrValue::Int(v) => Some(v as f64),
            IrValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            IrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Field of an object value.
    pub fn field(&self, name: &str) -> Option<&IrValue> {
        match self {
            IrValue::Object(fields) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Scalar values convert back to literals; collections and functions do not.
    pub fn to_literal(&self) -> Option<IrLiteral> {
        match self {
            IrValue::Null => Some(IrLiteral::Null),
            IrValue::Int(v) => Some(IrLiteral::Int(*v)),
            IrValue::Float(v) => Some(IrLiteral::Float(*v)),
            IrValue::String(s) => Some(IrLiteral::String(s.clone())),
            IrValue::Bool(b) => Some(IrLiteral::Bool(*b)),
            IrValue::Array(_) | IrValue::Object(_) | IrValue::Function(_) => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::String(s) => write!(f, "{s:?}"),
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl From<IrLiteral> for IrValue {
    fn from(literal: IrLiteral) -> Self {
        match literal {
            IrLiteral::Int(v) => IrValue::Int(v),
            IrLiteral::Float(v) => IrValue::Float(v),
            IrLiteral::String(s) => IrValue::String(s),
            IrLiteral::Bool(b) => IrValue::Bool(b),
            IrLiteral::Null => IrValue::Null,
        }
    }
}

impl From<&IrLiteral> for IrValue {
    fn from(literal: &IrLiteral) -> Self {
        IrValue::from(literal.clone())
    }
}

impl From<i64> for IrValue {
    fn from(value: i64) -> Self {
        IrValue::Int(value)
    }
}

impl From<f64> for IrValue {
    fn from(value: f64) -> Self {
        IrValue::Float(value)
    }
}

impl From<bool> for IrValue {
    fn from(value: bool) -> Self {
        IrValue::Bool(value)
    }
}

impl From<&str> for IrValue {
    fn from(value: &str) -> Self {
        IrValue::String(value.to_owned())
    }
}

impl From<String> for IrValue {
    fn from(value: String) -> Self {
        IrValue::String(value)
    }
}

impl From<Vec<IrValue>> for IrValue {
    fn from(items: Vec<IrValue>) -> Self {
        IrValue::Array(items)
    }
}

/// String conversion used by `+` concatenation, `type_toString` and joins.
impl fmt::Display for IrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::Null => f.write_str("null"),
            IrValue::Int(v) => write!(f, "{v}"),
            IrValue::Float(v) => write!(f, "{v}"),
            IrValue::String(s) => f.write_str(s),
            IrValue::Bool(b) => write!(f, "{b}"),
            IrValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            IrValue::Object(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {key}: ")?;
                    value.fmt_nested(f)?;
                }
                f.write_str(" }")
            }
            IrValue::Function(function) => {
                write!(f, "<function({})>", function.params.join(", "))
            }
        }
    }
}

/// Structural identity used to key the result cache.
///
/// Unlike [`IrValue::strict_eq`], floats compare by bit pattern so equality
/// is reflexive and agrees with [`Hash`].
impl PartialEq for IrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IrValue::Float(a), IrValue::Float(b)) => a.to_bits() == b.to_bits(),
            (IrValue::Array(a), IrValue::Array(b)) => a == b,
            (IrValue::Object(a), IrValue::Object(b)) => a == b,
            (IrValue::Function(a), IrValue::Function(b)) => Arc::ptr_eq(a, b),
            (a, b) => a.strict_eq(b),
        }
    }
}

impl Eq for IrValue {}

impl Hash for IrValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            IrValue::Null => {}
            IrValue::Int(v) => v.hash(state),
            IrValue::Float(v) => v.to_bits().hash(state),
            IrValue::String(s) => s.hash(state),
            IrValue::Bool(b) => b.hash(state),
            IrValue::Array(items) => items.hash(state),
            IrValue::Object(fields) => fields.hash(state),
            IrValue::Function(function) => Arc::as_ptr(function).hash(state),
        }
    }
}
