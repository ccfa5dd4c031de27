//! `ExprNode` → `IrExpr`.

use kry_ir::{
    ArrowBody, BinaryOp, Callee, ExprNode, IrArrowBody, IrExpr, IrLiteral, Literal, TemplatePart,
};
use kry_stack::ensure_sufficient_stack;

use crate::ConvertError;

/// Lower a parsed expression tree.
///
/// Fails on assignment and on calls whose callee is neither a name nor a
/// member access.
pub fn lower_expr(node: &ExprNode) -> Result<IrExpr, ConvertError> {
    ensure_sufficient_stack(|| lower_node(node))
}

fn lower_node(node: &ExprNode) -> Result<IrExpr, ConvertError> {
    Ok(match node {
        ExprNode::Literal(lit) => IrExpr::Literal(lower_literal(lit)),
        ExprNode::Identifier(name) => IrExpr::Var(name.clone()),
        ExprNode::Binary {
            op: BinaryOp::Assign,
            ..
        } => return Err(ConvertError::Assignment),
        ExprNode::Binary { op, left, right } => {
            IrExpr::binary(*op, lower_expr(left)?, lower_expr(right)?)
        }
        ExprNode::Unary { op, operand } => IrExpr::unary(*op, lower_expr(operand)?),
        ExprNode::PropertyAccess { object, property } => IrExpr::Property {
            object: Box::new(lower_expr(object)?),
            name: property.clone(),
        },
        ExprNode::Member { object, member } => IrExpr::Property {
            object: Box::new(lower_expr(object)?),
            name: member.clone(),
        },
        ExprNode::ElementAccess { object, index } => IrExpr::Index {
            object: Box::new(lower_expr(object)?),
            index: Box::new(lower_expr(index)?),
        },
        ExprNode::Call { callee, args } => lower_call(callee, args)?,
        ExprNode::ArrayLit(items) => IrExpr::Array(lower_list(items)?),
        ExprNode::ObjectLit(entries) => IrExpr::Object(
            entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), lower_expr(value)?)))
                .collect::<Result<_, ConvertError>>()?,
        ),
        ExprNode::ArrowFunc { params, body } => IrExpr::Arrow {
            params: params.clone(),
            body: match body {
                ArrowBody::Expr(expr) => IrArrowBody::Expr(Box::new(lower_expr(expr)?)),
                ArrowBody::Block(text) => IrArrowBody::Block(text.clone()),
            },
        },
        ExprNode::Conditional {
            condition,
            then_expr,
            else_expr,
        } => IrExpr::Ternary {
            condition: Box::new(lower_expr(condition)?),
            then_expr: Box::new(lower_expr(then_expr)?),
            else_expr: Box::new(lower_expr(else_expr)?),
        },
        ExprNode::Template(parts) => lower_template(parts)?,
    })
}

fn lower_literal(lit: &Literal) -> IrLiteral {
    match lit {
        Literal::Int(v) => IrLiteral::Int(*v),
        Literal::Float(v) => IrLiteral::Float(*v),
        Literal::String(s) => IrLiteral::String(s.clone()),
        Literal::Bool(b) => IrLiteral::Bool(*b),
        Literal::Null => IrLiteral::Null,
    }
}

fn lower_list(items: &[ExprNode]) -> Result<Vec<IrExpr>, ConvertError> {
    items.iter().map(lower_expr).collect()
}

/// `name(args)` calls a function; `recv.name(args)` calls a method.
fn lower_call(callee: &ExprNode, args: &[ExprNode]) -> Result<IrExpr, ConvertError> {
    match callee {
        ExprNode::Identifier(name) => Ok(IrExpr::call(Callee::resolve(name), lower_list(args)?)),
        ExprNode::PropertyAccess {
            object,
            property: method,
        }
        | ExprNode::Member {
            object,
            member: method,
        } => Ok(IrExpr::MethodCall {
            receiver: Box::new(lower_expr(object)?),
            method: method.clone(),
            args: lower_list(args)?,
        }),
        other => Err(ConvertError::UnsupportedCallee(other.to_string())),
    }
}

/// `` `a${x}b` `` → `"a" + x + "b"`.
///
/// The chain always starts with a string so `+` concatenates even when the
/// first interpolated value is a number.
fn lower_template(parts: &[TemplatePart]) -> Result<IrExpr, ConvertError> {
    let mut parts = parts.iter();
    let mut chain = match parts.next() {
        None => return Ok(IrExpr::string("")),
        Some(TemplatePart::Text(text)) => IrExpr::string(text.as_str()),
        Some(TemplatePart::Expr(expr)) => {
            IrExpr::binary(BinaryOp::Add, IrExpr::string(""), lower_expr(expr)?)
        }
    };
    for part in parts {
        let next = match part {
            TemplatePart::Text(text) => IrExpr::string(text.as_str()),
            TemplatePart::Expr(expr) => lower_expr(expr)?,
        };
        chain = IrExpr::binary(BinaryOp::Add, chain, next);
    }
    Ok(chain)
}

#[cfg(test)]
mod tests;
