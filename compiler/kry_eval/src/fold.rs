//! Constant folding over IR trees.
//!
//! Rewrites operator applications whose operands are all literals, and
//! ternaries with a literal condition, into the literal the VM would
//! produce. Calls are never folded: the registry an expression runs against
//! is only known at evaluation time.

use kry_ir::{BinaryOp, IrArrowBody, IrExpr, IrLiteral};
use kry_stack::ensure_sufficient_stack;

use crate::operators::{evaluate_binary, evaluate_unary};
use crate::value::IrValue;

/// Fold `expr`. The flag reports whether anything changed.
pub fn fold(expr: &IrExpr) -> (IrExpr, bool) {
    let mut folder = Folder { changed: false };
    let folded = folder.fold(expr);
    (folded, folder.changed)
}

struct Folder {
    changed: bool,
}

impl Folder {
    fn fold(&mut self, expr: &IrExpr) -> IrExpr {
        ensure_sufficient_stack(|| self.fold_inner(expr))
    }

    fn fold_inner(&mut self, expr: &IrExpr) -> IrExpr {
        match expr {
            IrExpr::Literal(_) | IrExpr::Var(_) => expr.clone(),
            IrExpr::Binary { op, left, right } => {
                let left = self.fold(left);
                let right = self.fold(right);
                self.binary(*op, left, right)
            }
            IrExpr::Unary { op, operand } => {
                let operand = self.fold(operand);
                match &operand {
                    IrExpr::Literal(literal) => {
                        self.literal(&evaluate_unary(*op, &IrValue::from(literal)))
                            .unwrap_or_else(|| IrExpr::unary(*op, operand))
                    }
                    _ => IrExpr::unary(*op, operand),
                }
            }
            IrExpr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                let condition = self.fold(condition);
                if let IrExpr::Literal(literal) = &condition {
                    self.changed = true;
                    return if IrValue::from(literal).is_truthy() {
                        self.fold(then_expr)
                    } else {
                        self.fold(else_expr)
                    };
                }
                IrExpr::Ternary {
                    condition: Box::new(condition),
                    then_expr: Box::new(self.fold(then_expr)),
                    else_expr: Box::new(self.fold(else_expr)),
                }
            }
            IrExpr::Property { object, name } => IrExpr::Property {
                object: Box::new(self.fold(object)),
                name: name.clone(),
            },
            IrExpr::Index { object, index } => IrExpr::Index {
                object: Box::new(self.fold(object)),
                index: Box::new(self.fold(index)),
            },
            IrExpr::Call { callee, args } => IrExpr::Call {
                callee: callee.clone(),
                args: args.iter().map(|arg| self.fold(arg)).collect(),
            },
            IrExpr::MethodCall {
                receiver,
                method,
                args,
            } => IrExpr::MethodCall {
                receiver: Box::new(self.fold(receiver)),
                method: method.clone(),
                args: args.iter().map(|arg| self.fold(arg)).collect(),
            },
            IrExpr::Array(items) => {
                IrExpr::Array(items.iter().map(|item| self.fold(item)).collect())
            }
            IrExpr::Object(entries) => IrExpr::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), self.fold(value)))
                    .collect(),
            ),
            IrExpr::Arrow { params, body } => IrExpr::Arrow {
                params: params.clone(),
                body: match body {
                    IrArrowBody::Expr(body) => IrArrowBody::Expr(Box::new(self.fold(body))),
                    IrArrowBody::Block(text) => IrArrowBody::Block(text.clone()),
                },
            },
        }
    }

    fn binary(&mut self, op: BinaryOp, left: IrExpr, right: IrExpr) -> IrExpr {
        if op == BinaryOp::Assign {
            return IrExpr::binary(op, left, right);
        }
        let IrExpr::Literal(lhs) = &left else {
            return IrExpr::binary(op, left, right);
        };
        let lhs = IrValue::from(lhs);

        // A decided short circuit drops the right side even when it is dynamic.
        if op.is_short_circuit() && lhs.is_truthy() == (op == BinaryOp::Or) {
            self.changed = true;
            return IrExpr::bool(lhs.is_truthy());
        }
        let IrExpr::Literal(rhs) = &right else {
            return IrExpr::binary(op, left, right);
        };
        let result = evaluate_binary(op, lhs, IrValue::from(rhs));
        self.literal(&result)
            .unwrap_or_else(|| IrExpr::binary(op, left, right))
    }

    fn literal(&mut self, value: &IrValue) -> Option<IrExpr> {
        let literal: IrLiteral = value.to_literal()?;
        self.changed = true;
        Some(IrExpr::Literal(literal))
    }
}
