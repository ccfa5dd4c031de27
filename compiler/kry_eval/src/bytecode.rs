//! Linear instruction form of an expression.
//!
//! A [`CompiledExpr`] is immutable once built and holds everything the VM
//! needs: the instruction list, a pool of strings (literals, variable and
//! property names), nested arrow-function bodies, and the stack bound.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use kry_ir::{BinaryOp, BuiltinFn};

use crate::value::FunctionValue;

/// Index into [`CompiledExpr::strings`].
pub type StrIdx = u32;

/// Absolute instruction index used by jumps.
pub type Target = u32;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Op {
    PushInt(i64),
    PushFloat(f64),
    PushBool(bool),
    PushNull,
    PushStr(StrIdx),
    LoadVar(StrIdx),
    /// Pop an object, push the named field (or `length` of a string/array).
    GetProp(StrIdx),
    /// Pop index then object, push the element.
    GetIndex,
    /// Pop right then left, push the result. Never `And`/`Or`.
    Binary(BinaryOp),
    Neg,
    Not,
    TypeOf,
    /// Replace the top of stack with its truthiness.
    ToBool,
    Jump(Target),
    /// Pop; jump when falsy.
    JumpIfFalse(Target),
    /// Jump keeping the top when falsy, otherwise pop it.
    JumpIfFalseOrPop(Target),
    /// Jump keeping the top when truthy, otherwise pop it.
    JumpIfTrueOrPop(Target),
    CallBuiltin { builtin: BuiltinFn, argc: u32 },
    /// Registry plugin or a function value in scope.
    CallNamed { name: StrIdx, argc: u32 },
    /// Receiver is below the arguments.
    CallMethod { name: StrIdx, argc: u32 },
    MakeRange { argc: u32 },
    MakeArray(u32),
    /// Pops `n` key/value pairs, keys pushed as strings.
    MakeObject(u32),
    MakeFunction(u32),
}

impl Op {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::PushInt(_) => "push.int",
            Op::PushFloat(_) => "push.float",
            Op::PushBool(_) => "push.bool",
            Op::PushNull => "push.null",
            Op::PushStr(_) => "push.str",
            Op::LoadVar(_) => "load",
            Op::GetProp(_) => "get.prop",
            Op::GetIndex => "get.index",
            Op::Binary(op) => match op {
                BinaryOp::Add => "add",
                BinaryOp::Sub => "sub",
                BinaryOp::Mul => "mul",
                BinaryOp::Div => "div",
                BinaryOp::Mod => "mod",
                BinaryOp::Eq => "eq",
                BinaryOp::NotEq => "neq",
                BinaryOp::Lt => "lt",
                BinaryOp::Gt => "gt",
                BinaryOp::LtEq => "lte",
                BinaryOp::GtEq => "gte",
                BinaryOp::And => "and",
                BinaryOp::Or => "or",
                BinaryOp::Assign => "assign",
            },
            Op::Neg => "neg",
            Op::Not => "not",
            Op::TypeOf => "typeof",
            Op::ToBool => "to.bool",
            Op::Jump(_) => "jmp",
            Op::JumpIfFalse(_) => "jmp.false",
            Op::JumpIfFalseOrPop(_) => "jmp.false.keep",
            Op::JumpIfTrueOrPop(_) => "jmp.true.keep",
            Op::CallBuiltin { .. } => "call.builtin",
            Op::CallNamed { .. } => "call",
            Op::CallMethod { .. } => "call.method",
            Op::MakeRange { .. } => "range",
            Op::MakeArray(_) => "array",
            Op::MakeObject(_) => "object",
            Op::MakeFunction(_) => "closure",
        }
    }

    /// Net stack change on the fall-through path.
    pub fn stack_effect(self) -> isize {
        let count = |n: u32| isize::try_from(n).unwrap_or(isize::MAX);
        match self {
            Op::PushInt(_)
            | Op::PushFloat(_)
            | Op::PushBool(_)
            | Op::PushNull
            | Op::PushStr(_)
            | Op::LoadVar(_)
            | Op::MakeFunction(_) => 1,
            Op::GetProp(_)
            | Op::Neg
            | Op::Not
            | Op::TypeOf
            | Op::ToBool
            | Op::Jump(_) => 0,
            Op::GetIndex
            | Op::Binary(_)
            | Op::JumpIfFalse(_)
            | Op::JumpIfFalseOrPop(_)
            | Op::JumpIfTrueOrPop(_) => -1,
            Op::CallBuiltin { argc, .. }
            | Op::CallNamed { argc, .. }
            | Op::MakeRange { argc }
            | Op::MakeArray(argc) => 1 - count(argc),
            Op::CallMethod { argc, .. } => -count(argc),
            Op::MakeObject(pairs) => 1 - 2 * count(pairs),
        }
    }

    pub(crate) fn with_target(self, target: Target) -> Op {
        match self {
            Op::Jump(_) => Op::Jump(target),
            Op::JumpIfFalse(_) => Op::JumpIfFalse(target),
            Op::JumpIfFalseOrPop(_) => Op::JumpIfFalseOrPop(target),
            Op::JumpIfTrueOrPop(_) => Op::JumpIfTrueOrPop(target),
            other => other,
        }
    }
}

bitflags! {
    /// Facts about a compiled expression gathered while emitting it.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ExprFlags: u8 {
        /// Reads at least one variable.
        const READS_VARS = 1 << 0;
        /// Calls a builtin, plugin, method or function value.
        const CALLS = 1 << 1;
        /// Calls something declared impure; results must not be memoized.
        const IMPURE = 1 << 2;
        /// Calls a name outside the seeded library; purity is decided by
        /// the registry at evaluation time.
        const NAMED_CALLS = 1 << 3;
        /// Contains conditional jumps.
        const BRANCHES = 1 << 4;
        /// Constant folding rewrote part of the tree.
        const FOLDED = 1 << 5;
    }
}

#[derive(Debug)]
pub struct CompiledExpr {
    pub(crate) code: Vec<Op>,
    pub(crate) strings: Vec<String>,
    pub(crate) functions: Vec<Arc<FunctionValue>>,
    pub(crate) max_stack_depth: usize,
    pub(crate) flags: ExprFlags,
}

impl CompiledExpr {
    pub fn code(&self) -> &[Op] {
        &self.code
    }

    pub fn instruction_count(&self) -> usize {
        self.code.len()
    }

    /// Highest operand-stack height any path through the code reaches.
    pub fn max_stack_depth(&self) -> usize {
        self.max_stack_depth
    }

    pub fn flags(&self) -> ExprFlags {
        self.flags
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub(crate) fn str(&self, idx: StrIdx) -> &str {
        usize::try_from(idx)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map_or("", String::as_str)
    }

    pub(crate) fn function(&self, idx: u32) -> Option<&Arc<FunctionValue>> {
        usize::try_from(idx)
            .ok()
            .and_then(|i| self.functions.get(i))
    }

    /// Names passed to [`Op::CallNamed`], in code order.
    pub fn named_calls(&self) -> impl Iterator<Item = &str> + '_ {
        self.code.iter().filter_map(move |op| match *op {
            Op::CallNamed { name, .. } => Some(self.str(name)),
            _ => None,
        })
    }

    fn operand(&self, op: Op) -> String {
        match op {
            Op::PushInt(v) => v.to_string(),
            Op::PushFloat(v) => format!("{v:?}"),
            Op::PushBool(b) => b.to_string(),
            Op::PushStr(idx) => format!("{:?}", self.str(idx)),
            Op::LoadVar(idx) | Op::GetProp(idx) => self.str(idx).to_owned(),
            Op::Jump(t)
            | Op::JumpIfFalse(t)
            | Op::JumpIfFalseOrPop(t)
            | Op::JumpIfTrueOrPop(t) => format!("-> {t}"),
            Op::CallBuiltin { builtin, argc } => format!("{builtin}/{argc}"),
            Op::CallNamed { name, argc } => format!("{}/{argc}", self.str(name)),
            Op::CallMethod { name, argc } => format!(".{}/{argc}", self.str(name)),
            Op::MakeRange { argc } | Op::MakeArray(argc) | Op::MakeObject(argc) => {
                argc.to_string()
            }
            Op::MakeFunction(idx) => match self.function(idx) {
                Some(function) => format!("({})", function.params.join(", ")),
                None => format!("#{idx}"),
            },
            Op::PushNull
            | Op::GetIndex
            | Op::Binary(_)
            | Op::Neg
            | Op::Not
            | Op::TypeOf
            | Op::ToBool => String::new(),
        }
    }
}

/// Disassembly, one instruction per line.
impl fmt::Display for CompiledExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "; {} instructions, max stack {}",
            self.code.len(),
            self.max_stack_depth
        )?;
        for (pc, &op) in self.code.iter().enumerate() {
            let line = format!("{pc:4}: {:<18}{}", op.mnemonic(), self.operand(op));
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
