//! IR → bytecode compiler.
//!
//! Linearizes an [`IrExpr`] with an explicit work list instead of recursion,
//! so expression depth never touches the native stack. `&&`, `||` and
//! ternaries become forward jumps patched once their target is known; the
//! operand-stack bound is tracked along the way.

use std::sync::Arc;

use kry_ir::{BinaryOp, BuiltinFn, Callee, IrArrowBody, IrExpr, IrLiteral, UnaryOp};
use kry_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use crate::bytecode::{CompiledExpr, ExprFlags, Op, StrIdx};
use crate::fold::fold;
use crate::value::{FunctionBody, FunctionValue};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Fold literal-only operator applications and literal-condition
    /// ternaries before emitting.
    pub fold_constants: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            fold_constants: true,
        }
    }
}

/// Compile `expr`. Never fails: every well-formed tree has a bytecode form.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile(expr: &IrExpr, options: &CompilerOptions) -> CompiledExpr {
    let compiled = if options.fold_constants {
        let (folded, changed) = fold(expr);
        let mut compiled = Emitter::new(options).run(&folded);
        if changed {
            compiled.flags |= ExprFlags::FOLDED;
        }
        compiled
    } else {
        Emitter::new(options).run(expr)
    };
    tracing::debug!(
        ops = compiled.instruction_count(),
        max_stack = compiled.max_stack_depth(),
        "compiled expression"
    );
    compiled
}

type Label = usize;

enum Task<'e> {
    Expr(&'e IrExpr),
    Emit(Op),
    /// Emit a forward jump whose target is `Label`.
    Jump(Op, Label),
    /// Bind `Label` to the next instruction.
    Land(Label),
    PushKey(&'e str),
}

struct LabelSlot {
    jump_at: usize,
    /// Stack height on arrival through the jump.
    depth: isize,
}

struct Emitter<'o> {
    options: &'o CompilerOptions,
    code: Vec<Op>,
    strings: Vec<String>,
    interned: FxHashMap<String, StrIdx>,
    functions: Vec<Arc<FunctionValue>>,
    labels: Vec<LabelSlot>,
    flags: ExprFlags,
    depth: isize,
    max_depth: isize,
}

impl<'o> Emitter<'o> {
    fn new(options: &'o CompilerOptions) -> Self {
        Emitter {
            options,
            code: Vec::new(),
            strings: Vec::new(),
            interned: FxHashMap::default(),
            functions: Vec::new(),
            labels: Vec::new(),
            flags: ExprFlags::empty(),
            depth: 0,
            max_depth: 0,
        }
    }

    fn run(mut self, root: &IrExpr) -> CompiledExpr {
        let mut tasks: Vec<Task<'_>> = vec![Task::Expr(root)];
        while let Some(task) = tasks.pop() {
            match task {
                Task::Expr(expr) => self.expand(expr, &mut tasks),
                Task::Emit(op) => self.emit(op),
                Task::Jump(op, label) => self.jump(op, label),
                Task::Land(label) => self.land(label),
                Task::PushKey(key) => {
                    let idx = self.intern(key);
                    self.emit(Op::PushStr(idx));
                }
            }
        }
        CompiledExpr {
            code: self.code,
            strings: self.strings,
            functions: self.functions,
            max_stack_depth: usize::try_from(self.max_depth).unwrap_or(0),
            flags: self.flags,
        }
    }

    /// Schedule the work for `expr`. Tasks run in the order given, so they
    /// are pushed reversed.
    fn expand<'e>(&mut self, expr: &'e IrExpr, tasks: &mut Vec<Task<'e>>) {
        let mut plan: Vec<Task<'e>> = Vec::new();
        match expr {
            IrExpr::Literal(literal) => {
                let op = self.literal(literal);
                self.emit(op);
                return;
            }
            IrExpr::Var(name) => {
                self.flags |= ExprFlags::READS_VARS;
                let idx = self.intern(name);
                self.emit(Op::LoadVar(idx));
                return;
            }
            IrExpr::Binary { op, left, right } if op.is_short_circuit() => {
                self.flags |= ExprFlags::BRANCHES;
                let end = self.label();
                let jump = if *op == BinaryOp::And {
                    Op::JumpIfFalseOrPop(0)
                } else {
                    Op::JumpIfTrueOrPop(0)
                };
                plan.extend([
                    Task::Expr(left),
                    Task::Emit(Op::ToBool),
                    Task::Jump(jump, end),
                    Task::Expr(right),
                    Task::Emit(Op::ToBool),
                    Task::Land(end),
                ]);
            }
            IrExpr::Binary { op, left, right } => {
                plan.extend([
                    Task::Expr(left),
                    Task::Expr(right),
                    Task::Emit(Op::Binary(*op)),
                ]);
            }
            IrExpr::Unary { op, operand } => {
                let op = match op {
                    UnaryOp::Neg => Op::Neg,
                    UnaryOp::Not => Op::Not,
                    UnaryOp::TypeOf => Op::TypeOf,
                };
                plan.extend([Task::Expr(operand), Task::Emit(op)]);
            }
            IrExpr::Property { object, name } => {
                let idx = self.intern(name);
                plan.extend([Task::Expr(object), Task::Emit(Op::GetProp(idx))]);
            }
            IrExpr::Index { object, index } => {
                plan.extend([Task::Expr(object), Task::Expr(index), Task::Emit(Op::GetIndex)]);
            }
            IrExpr::Call { callee, args } => {
                let argc = count(args.len());
                let op = match callee {
                    Callee::Builtin(builtin) => {
                        self.flags |= ExprFlags::CALLS;
                        if !builtin.sig().pure {
                            self.flags |= ExprFlags::IMPURE;
                        }
                        Op::CallBuiltin {
                            builtin: *builtin,
                            argc,
                        }
                    }
                    Callee::Range => Op::MakeRange { argc },
                    Callee::Named(name) => {
                        self.flags |= ExprFlags::CALLS | ExprFlags::NAMED_CALLS;
                        Op::CallNamed {
                            name: self.intern(name),
                            argc,
                        }
                    }
                };
                plan.extend(args.iter().map(Task::Expr));
                plan.push(Task::Emit(op));
            }
            IrExpr::MethodCall {
                receiver,
                method,
                args,
            } => {
                self.flags |= ExprFlags::CALLS;
                if !is_pure_method(method) {
                    self.flags |= ExprFlags::IMPURE;
                }
                let op = Op::CallMethod {
                    name: self.intern(method),
                    argc: count(args.len()),
                };
                plan.push(Task::Expr(receiver));
                plan.extend(args.iter().map(Task::Expr));
                plan.push(Task::Emit(op));
            }
            IrExpr::Array(items) => {
                plan.extend(items.iter().map(Task::Expr));
                plan.push(Task::Emit(Op::MakeArray(count(items.len()))));
            }
            IrExpr::Object(entries) => {
                for (key, value) in entries {
                    plan.push(Task::PushKey(key));
                    plan.push(Task::Expr(value));
                }
                plan.push(Task::Emit(Op::MakeObject(count(entries.len()))));
            }
            IrExpr::Arrow { params, body } => {
                let idx = self.function(params, body);
                self.emit(Op::MakeFunction(idx));
                return;
            }
            IrExpr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                self.flags |= ExprFlags::BRANCHES;
                let otherwise = self.label();
                let end = self.label();
                plan.extend([
                    Task::Expr(condition),
                    Task::Jump(Op::JumpIfFalse(0), otherwise),
                    Task::Expr(then_expr),
                    Task::Jump(Op::Jump(0), end),
                    Task::Land(otherwise),
                    Task::Expr(else_expr),
                    Task::Land(end),
                ]);
            }
        }
        tasks.extend(plan.into_iter().rev());
    }

    fn literal(&mut self, literal: &IrLiteral) -> Op {
        match literal {
            IrLiteral::Int(v) => Op::PushInt(*v),
            IrLiteral::Float(v) => Op::PushFloat(*v),
            IrLiteral::Bool(b) => Op::PushBool(*b),
            IrLiteral::Null => Op::PushNull,
            IrLiteral::String(s) => Op::PushStr(self.intern(s)),
        }
    }

    /// Arrow bodies compile into their own [`CompiledExpr`].
    fn function(&mut self, params: &[String], body: &IrArrowBody) -> u32 {
        let body = match body {
            IrArrowBody::Expr(body) => {
                let options = self.options;
                FunctionBody::Compiled(ensure_sufficient_stack(|| compile(body, options)))
            }
            IrArrowBody::Block(text) => FunctionBody::Block(text.clone()),
        };
        if let FunctionBody::Compiled(compiled) = &body {
            self.flags |= compiled.flags & (ExprFlags::IMPURE | ExprFlags::NAMED_CALLS);
        }
        self.functions.push(Arc::new(FunctionValue {
            params: params.to_vec(),
            body,
        }));
        count(self.functions.len() - 1)
    }

    fn intern(&mut self, text: &str) -> StrIdx {
        if let Some(&idx) = self.interned.get(text) {
            return idx;
        }
        let idx = count(self.strings.len());
        self.strings.push(text.to_owned());
        self.interned.insert(text.to_owned(), idx);
        idx
    }

    fn emit(&mut self, op: Op) {
        self.code.push(op);
        self.depth += op.stack_effect();
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn label(&mut self) -> Label {
        self.labels.push(LabelSlot {
            jump_at: 0,
            depth: 0,
        });
        self.labels.len() - 1
    }

    fn jump(&mut self, op: Op, label: Label) {
        let arrival = match op {
            // The tested value stays on the stack when the jump is taken.
            Op::JumpIfFalseOrPop(_) | Op::JumpIfTrueOrPop(_) => self.depth,
            _ => self.depth + op.stack_effect(),
        };
        if let Some(slot) = self.labels.get_mut(label) {
            slot.jump_at = self.code.len();
            slot.depth = arrival;
        }
        self.emit(op);
    }

    fn land(&mut self, label: Label) {
        let target = count(self.code.len());
        let Some(slot) = self.labels.get(label) else {
            return;
        };
        let (jump_at, depth) = (slot.jump_at, slot.depth);
        if let Some(op) = self.code.get_mut(jump_at) {
            *op = op.with_target(target);
        }
        // Both paths into a label agree on the stack height. After an
        // unconditional jump, the fall-through height is the jump's.
        self.depth = depth;
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Methods that map to pure string or array builtins. Anything else may
/// reach an impure builtin or a function value.
fn is_pure_method(method: &str) -> bool {
    let builtins: Vec<BuiltinFn> = BuiltinFn::string_method(method)
        .into_iter()
        .chain(BuiltinFn::array_method(method))
        .collect();
    !builtins.is_empty() && builtins.iter().all(|builtin| builtin.sig().pure)
}
