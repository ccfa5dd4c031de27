//! Structured expression trees parsed from captured expression text.

use std::fmt;

/// Binary operators of the expression language.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    /// Parsed but rejected by the IR converter.
    Assign,
}

impl BinaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Assign => "=",
        }
    }

    /// Operators that never evaluate their right operand unconditionally.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
    TypeOf,
}

impl UnaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::TypeOf => "typeof ",
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ArrowBody {
    Expr(Box<ExprNode>),
    /// Statement block, kept as raw text.
    Block(String),
}

#[derive(Clone, PartialEq, Debug)]
pub enum TemplatePart {
    Text(String),
    Expr(ExprNode),
}

#[derive(Clone, PartialEq, Debug)]
pub enum ExprNode {
    Literal(Literal),
    Identifier(String),
    Binary {
        op: BinaryOp,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExprNode>,
    },
    /// `object.property`
    PropertyAccess {
        object: Box<ExprNode>,
        property: String,
    },
    /// `object[index]` with a computed index.
    ElementAccess {
        object: Box<ExprNode>,
        index: Box<ExprNode>,
    },
    /// `object["member"]` with a literal string key.
    Member {
        object: Box<ExprNode>,
        member: String,
    },
    Call {
        callee: Box<ExprNode>,
        args: Vec<ExprNode>,
    },
    ArrayLit(Vec<ExprNode>),
    ObjectLit(Vec<(String, ExprNode)>),
    ArrowFunc {
        params: Vec<String>,
        body: ArrowBody,
    },
    Conditional {
        condition: Box<ExprNode>,
        then_expr: Box<ExprNode>,
        else_expr: Box<ExprNode>,
    },
    Template(Vec<TemplatePart>),
}

impl ExprNode {
    pub fn binary(op: BinaryOp, left: ExprNode, right: ExprNode) -> Self {
        ExprNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: ExprNode) -> Self {
        ExprNode::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn ident(name: &str) -> Self {
        ExprNode::Identifier(name.to_owned())
    }

    pub fn int(value: i64) -> Self {
        ExprNode::Literal(Literal::Int(value))
    }

    pub fn string(value: &str) -> Self {
        ExprNode::Literal(Literal::String(value.to_owned()))
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            _ => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[ExprNode]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v:.1}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::String(s) => write_quoted(f, s),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => f.write_str("null"),
        }
    }
}

/// Fully parenthesized source form; re-parsing it yields the same tree.
impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Literal(lit) => write!(f, "{lit}"),
            ExprNode::Identifier(name) => f.write_str(name),
            ExprNode::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.as_symbol())
            }
            ExprNode::Unary { op, operand } => write!(f, "({}{operand})", op.as_symbol()),
            ExprNode::PropertyAccess { object, property } => write!(f, "{object}.{property}"),
            ExprNode::ElementAccess { object, index } => write!(f, "{object}[{index}]"),
            ExprNode::Member { object, member } => {
                write!(f, "{object}[")?;
                write_quoted(f, member)?;
                f.write_str("]")
            }
            ExprNode::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            ExprNode::ArrayLit(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            ExprNode::ObjectLit(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {key}: {value}")?;
                }
                f.write_str(" }")
            }
            ExprNode::ArrowFunc { params, body } => {
                write!(f, "({}) => ", params.join(", "))?;
                match body {
                    ArrowBody::Expr(expr) => write!(f, "{expr}"),
                    ArrowBody::Block(text) => write!(f, "{{{text}}}"),
                }
            }
            ExprNode::Conditional {
                condition,
                then_expr,
                else_expr,
            } => write!(f, "({condition} ? {then_expr} : {else_expr})"),
            ExprNode::Template(parts) => {
                f.write_str("`")?;
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => f.write_str(text)?,
                        TemplatePart::Expr(expr) => write!(f, "${{{expr}}}")?,
                    }
                }
                f.write_str("`")
            }
        }
    }
}
