//! KRY Eval: compiled execution of lowered expressions.
//!
//! # Pipeline Position
//!
//! ```text
//! kry_lower (IrExpr) → **compile** → CompiledExpr → **Vm::eval** → IrValue
//! ```
//!
//! # Architecture
//!
//! - [`compile`]: non-recursive linearization into a [`CompiledExpr`], with
//!   optional constant folding and a precomputed stack bound
//! - [`Vm`]: operand-stack interpreter; calls resolve against a
//!   [`BuiltinRegistry`], variables against a [`Scope`]
//! - [`BuiltinRegistry`]: FNV-1a hashed table seeded with the string, array,
//!   math and type builtins, extensible with plugins
//! - [`ExpressionCache`]: bytecode memoization with LRU eviction and a
//!   result layer for pure expressions
//!
//! Evaluation is total. Anything irregular yields [`IrValue::Null`].
//!
//! # Example
//!
//! ```
//! use kry_eval::{compile, BuiltinRegistry, CompilerOptions, IrValue, Scope, Vm};
//! use kry_ir::{BinaryOp, IrExpr};
//!
//! let expr = IrExpr::binary(BinaryOp::Mul, IrExpr::var("n"), IrExpr::int(3));
//! let compiled = compile(&expr, &CompilerOptions::default());
//! let registry = BuiltinRegistry::with_stdlib();
//! let scope = Scope::new().with("n", 14_i64);
//! assert_eq!(Vm::new(&registry).eval(&compiled, &scope), IrValue::Int(42));
//! ```

mod bytecode;
mod cache;
mod compile;
mod fold;
mod operators;
mod registry;
mod scope;
mod stdlib;
mod value;
mod vm;

pub use bytecode::{CompiledExpr, ExprFlags, Op, StrIdx, Target};
pub use cache::{CacheConfig, CacheStats, ExpressionCache};
pub use compile::{compile, CompilerOptions};
pub use operators::{evaluate_binary, evaluate_unary};
pub use registry::{fnv1a, BuiltinRegistry, NativeFn, RegisterError, BUCKET_COUNT};
pub use scope::Scope;
pub use stdlib::{MAX_RANGE_LEN, RANDOM_MAX};
pub use value::{FunctionBody, FunctionValue, IrValue};
pub use vm::{Vm, DEFAULT_MAX_CALL_DEPTH};
