//! KRY IR: the data model shared by every stage of the KRY front end.
//!
//! - [`Span`]/[`LineCol`] source locations
//! - [`StringArena`] with [`Name`] handles
//! - [`Ast`]: flat syntax tree of declarations and [`Value`]s
//! - [`ExprNode`]: structured expression parsed from captured text
//! - [`IrExpr`]: converted expression with resolved call targets
//! - [`BuiltinFn`]: closed set of library builtins

mod arena;
pub mod ast;
mod builtin;
mod expr;
mod ir;
mod span;

pub use arena::{Name, StringArena, CHUNK_SIZE};
pub use ast::{
    Ast, ElseBranch, Entry, EntryRange, FieldRange, ForKind, ListRange, NameRange, Node, NodeId,
    NodeKind, NodeRange, Param, ParamRange, StructField, Value, ValueId, ValueRange, VarQualifier,
};
pub use builtin::{BuiltinFn, BuiltinSig, RANGE_CONSTRUCTOR};
pub use expr::{ArrowBody, BinaryOp, ExprNode, Literal, TemplatePart, UnaryOp};
pub use ir::{Callee, IrArrowBody, IrExpr, IrLiteral};
pub use span::{LineCol, Span};
