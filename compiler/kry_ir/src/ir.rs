//! Target-side expression representation.
//!
//! `IrExpr` mirrors [`ExprNode`](crate::ExprNode) with typed literals,
//! explicit variable references and resolved call targets. Each tree is owned
//! by its container; dropping it releases the whole graph.

use std::hash::{Hash, Hasher};

use crate::builtin::BuiltinFn;
use crate::expr::{BinaryOp, UnaryOp};

#[derive(Clone, Debug)]
pub enum IrLiteral {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

impl PartialEq for IrLiteral {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IrLiteral::Int(a), IrLiteral::Int(b)) => a == b,
            (IrLiteral::Float(a), IrLiteral::Float(b)) => a.to_bits() == b.to_bits(),
            (IrLiteral::String(a), IrLiteral::String(b)) => a == b,
            (IrLiteral::Bool(a), IrLiteral::Bool(b)) => a == b,
            (IrLiteral::Null, IrLiteral::Null) => true,
            _ => false,
        }
    }
}

// Floats compare by bit pattern so literals can key hash maps.
impl Eq for IrLiteral {}

impl Hash for IrLiteral {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            IrLiteral::Int(v) => v.hash(state),
            IrLiteral::Float(v) => v.to_bits().hash(state),
            IrLiteral::String(s) => s.hash(state),
            IrLiteral::Bool(b) => b.hash(state),
            IrLiteral::Null => {}
        }
    }
}

/// Resolved target of a call expression.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Callee {
    Builtin(BuiltinFn),
    /// The reserved `__range__` constructor.
    Range,
    /// Not part of the seeded library: a plugin builtin or a function value
    /// supplied in the evaluation scope.
    Named(String),
}

impl Callee {
    pub fn resolve(name: &str) -> Callee {
        if name == crate::builtin::RANGE_CONSTRUCTOR {
            return Callee::Range;
        }
        match BuiltinFn::from_name(name) {
            Some(builtin) => Callee::Builtin(builtin),
            None => Callee::Named(name.to_owned()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Callee::Builtin(builtin) => builtin.name(),
            Callee::Range => crate::builtin::RANGE_CONSTRUCTOR,
            Callee::Named(name) => name,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum IrArrowBody {
    Expr(Box<IrExpr>),
    Block(String),
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum IrExpr {
    Literal(IrLiteral),
    Var(String),
    Binary {
        op: BinaryOp,
        left: Box<IrExpr>,
        right: Box<IrExpr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<IrExpr>,
    },
    Property {
        object: Box<IrExpr>,
        name: String,
    },
    Index {
        object: Box<IrExpr>,
        index: Box<IrExpr>,
    },
    Call {
        callee: Callee,
        args: Vec<IrExpr>,
    },
    MethodCall {
        receiver: Box<IrExpr>,
        method: String,
        args: Vec<IrExpr>,
    },
    Array(Vec<IrExpr>),
    Object(Vec<(String, IrExpr)>),
    Arrow {
        params: Vec<String>,
        body: IrArrowBody,
    },
    Ternary {
        condition: Box<IrExpr>,
        then_expr: Box<IrExpr>,
        else_expr: Box<IrExpr>,
    },
}

impl IrExpr {
    pub fn int(value: i64) -> Self {
        IrExpr::Literal(IrLiteral::Int(value))
    }

    pub fn float(value: f64) -> Self {
        IrExpr::Literal(IrLiteral::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        IrExpr::Literal(IrLiteral::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        IrExpr::Literal(IrLiteral::Bool(value))
    }

    pub fn null() -> Self {
        IrExpr::Literal(IrLiteral::Null)
    }

    pub fn var(name: impl Into<String>) -> Self {
        IrExpr::Var(name.into())
    }

    pub fn binary(op: BinaryOp, left: IrExpr, right: IrExpr) -> Self {
        IrExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: IrExpr) -> Self {
        IrExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn call(callee: Callee, args: Vec<IrExpr>) -> Self {
        IrExpr::Call { callee, args }
    }

    /// Visit this node and every descendant, parents first.
    ///
    /// Iterative so arbitrarily deep trees cannot exhaust the stack.
    pub fn walk(&self, mut visit: impl FnMut(&IrExpr)) {
        let mut pending: Vec<&IrExpr> = vec![self];
        while let Some(expr) = pending.pop() {
            visit(expr);
            match expr {
                IrExpr::Literal(_) | IrExpr::Var(_) => {}
                IrExpr::Binary { left, right, .. } => {
                    pending.push(right);
                    pending.push(left);
                }
                IrExpr::Unary { operand, .. } => pending.push(operand),
                IrExpr::Property { object, .. } => pending.push(object),
                IrExpr::Index { object, index } => {
                    pending.push(index);
                    pending.push(object);
                }
                IrExpr::Call { args, .. } | IrExpr::Array(args) => {
                    pending.extend(args.iter().rev());
                }
                IrExpr::MethodCall { receiver, args, .. } => {
                    pending.extend(args.iter().rev());
                    pending.push(receiver);
                }
                IrExpr::Object(entries) => {
                    pending.extend(entries.iter().rev().map(|(_, value)| value));
                }
                IrExpr::Arrow { body, .. } => {
                    if let IrArrowBody::Expr(body) = body {
                        pending.push(body);
                    }
                }
                IrExpr::Ternary {
                    condition,
                    then_expr,
                    else_expr,
                } => {
                    pending.push(else_expr);
                    pending.push(then_expr);
                    pending.push(condition);
                }
            }
        }
    }

    /// Names of every variable this expression reads, in first-use order.
    ///
    /// Arrow-function parameters are not excluded; callers that need exact
    /// free variables must filter them.
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        self.walk(|expr| {
            if let IrExpr::Var(name) = expr {
                if !names.iter().any(|seen| seen == name) {
                    names.push(name.clone());
                }
            }
        });
        names
    }
}
