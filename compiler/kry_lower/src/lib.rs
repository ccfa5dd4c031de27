//! Lowering from the KRY syntax tree to IR expressions.
//!
//! # Pipeline Position
//!
//! ```text
//! Source → Parse → Expression-AST → **Lower** → kry_eval (compile, evaluate)
//! ```
//!
//! # What Happens During Lowering
//!
//! 1. **Expressions** ([`lower_expr`]): structure-preserving mapping from
//!    [`ExprNode`](kry_ir::ExprNode) to [`IrExpr`](kry_ir::IrExpr)
//!    - call names resolved once into [`Callee`](kry_ir::Callee)
//!    - `obj.method(args)` becomes a method call on the receiver
//!    - template strings become a `+` concatenation chain
//!
//! 2. **Values** ([`lower_value`]): parse-time [`Value`](kry_ir::Value)s
//!    - deferred expression text is parsed here; unparseable text falls back
//!      to a bare variable reference
//!    - ranges desugar to the reserved `__range__` constructor
//!
//! 3. **Bindings** ([`lower_module`]): every dynamic site in a module
//!    (properties, loop collections, conditions, declarations) with the
//!    hybrid-mode fallback literal a renderer shows before the first
//!    evaluation.
//!
//! Any failure aborts the whole conversion of that site. Partial trees are
//! dropped with the `Err`.

mod binding;
mod error;
mod expr;
mod module;
mod options;
mod value;

pub use binding::{lower_property, BindingKind, PropertyBinding, PropertyClass};
pub use error::ConvertError;
pub use expr::lower_expr;
pub use module::{lower_module, LowerOutput, Site, SiteKind};
pub use options::{CompileMode, LowerOptions};
pub use value::{lower_source, lower_text, lower_value};
