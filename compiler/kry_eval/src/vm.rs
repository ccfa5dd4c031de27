//! Stack-based bytecode evaluator.
//!
//! Evaluation never fails. Every irregular case (an unresolved variable, an
//! unknown builtin, a wrong argument count, a type mismatch) produces
//! `Null` and, where a caller could have meant something else, a warning.

use std::sync::Arc;

use kry_ir::{BuiltinFn, UnaryOp};
use kry_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

use crate::bytecode::{CompiledExpr, Op};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::registry::BuiltinRegistry;
use crate::scope::Scope;
use crate::stdlib;
use crate::value::{FunctionBody, FunctionValue, IrValue};

/// Nested function-value calls allowed before a call yields `Null`.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

type Args = SmallVec<[IrValue; 4]>;

#[derive(Debug)]
pub struct Vm<'r> {
    registry: &'r BuiltinRegistry,
    max_call_depth: usize,
}

impl<'r> Vm<'r> {
    pub fn new(registry: &'r BuiltinRegistry) -> Self {
        Vm {
            registry,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn registry(&self) -> &'r BuiltinRegistry {
        self.registry
    }

    /// Run `compiled` against `scope`.
    #[tracing::instrument(level = "trace", skip_all, fields(ops = compiled.instruction_count()))]
    pub fn eval(&self, compiled: &CompiledExpr, scope: &Scope<'_>) -> IrValue {
        self.run(compiled, scope, 0)
    }

    /// Call a function value with already evaluated arguments.
    ///
    /// Missing arguments bind as `Null`; extra ones are ignored.
    pub fn call_function(
        &self,
        function: &FunctionValue,
        args: &[IrValue],
        scope: &Scope<'_>,
    ) -> IrValue {
        self.invoke(function, args, scope, 0)
    }

    fn invoke(
        &self,
        function: &FunctionValue,
        args: &[IrValue],
        scope: &Scope<'_>,
        depth: usize,
    ) -> IrValue {
        if depth >= self.max_call_depth {
            tracing::warn!(depth, "function call depth limit reached");
            return IrValue::Null;
        }
        match &function.body {
            FunctionBody::Compiled(body) => {
                let mut locals = Scope::child(scope);
                for (i, param) in function.params.iter().enumerate() {
                    locals.set(param.as_str(), args.get(i).cloned().unwrap_or_default());
                }
                ensure_sufficient_stack(|| self.run(body, &locals, depth + 1))
            }
            FunctionBody::Block(_) => {
                tracing::debug!("statement-bodied function is not evaluated by the VM");
                IrValue::Null
            }
        }
    }

    fn run(&self, compiled: &CompiledExpr, scope: &Scope<'_>, depth: usize) -> IrValue {
        let mut stack: Vec<IrValue> = Vec::with_capacity(compiled.max_stack_depth());
        let mut pc = 0;
        while let Some(&op) = compiled.code().get(pc) {
            pc += 1;
            match op {
                Op::PushInt(v) => stack.push(IrValue::Int(v)),
                Op::PushFloat(v) => stack.push(IrValue::Float(v)),
                Op::PushBool(b) => stack.push(IrValue::Bool(b)),
                Op::PushNull => stack.push(IrValue::Null),
                Op::PushStr(idx) => stack.push(IrValue::String(compiled.str(idx).to_owned())),
                Op::LoadVar(idx) => {
                    let name = compiled.str(idx);
                    let value = scope.get(name).cloned().unwrap_or_else(|| {
                        tracing::trace!(name, "unresolved variable");
                        IrValue::Null
                    });
                    stack.push(value);
                }
                Op::GetProp(idx) => {
                    let object = pop(&mut stack);
                    stack.push(property(&object, compiled.str(idx)));
                }
                Op::GetIndex => {
                    let index = pop(&mut stack);
                    let object = pop(&mut stack);
                    stack.push(element(object, &index));
                }
                Op::Binary(op) => {
                    let right = pop(&mut stack);
                    let left = pop(&mut stack);
                    stack.push(evaluate_binary(op, left, right));
                }
                Op::Neg => unary(&mut stack, UnaryOp::Neg),
                Op::Not => unary(&mut stack, UnaryOp::Not),
                Op::TypeOf => unary(&mut stack, UnaryOp::TypeOf),
                Op::ToBool => {
                    let value = pop(&mut stack);
                    stack.push(IrValue::Bool(value.is_truthy()));
                }
                Op::Jump(target) => pc = to_pc(target),
                Op::JumpIfFalse(target) => {
                    if !pop(&mut stack).is_truthy() {
                        pc = to_pc(target);
                    }
                }
                Op::JumpIfFalseOrPop(target) => {
                    if stack.last().is_some_and(IrValue::is_truthy) {
                        stack.pop();
                    } else {
                        pc = to_pc(target);
                    }
                }
                Op::JumpIfTrueOrPop(target) => {
                    if stack.last().is_some_and(IrValue::is_truthy) {
                        pc = to_pc(target);
                    } else {
                        stack.pop();
                    }
                }
                Op::CallBuiltin { builtin, argc } => {
                    let args = pop_n(&mut stack, argc);
                    stack.push(self.registry.call(builtin.name(), &args));
                }
                Op::CallNamed { name, argc } => {
                    let args = pop_n(&mut stack, argc);
                    let name = compiled.str(name);
                    stack.push(self.call_named(name, &args, scope, depth));
                }
                Op::CallMethod { name, argc } => {
                    let args = pop_n(&mut stack, argc);
                    let receiver = pop(&mut stack);
                    let method = compiled.str(name);
                    stack.push(self.call_method(receiver, method, args, scope, depth));
                }
                Op::MakeRange { argc } => {
                    let args = pop_n(&mut stack, argc);
                    stack.push(stdlib::range(&args));
                }
                Op::MakeArray(n) => {
                    let items = pop_n(&mut stack, n);
                    stack.push(IrValue::Array(items.into_vec()));
                }
                Op::MakeObject(n) => {
                    let flat = pop_n(&mut stack, n.saturating_mul(2));
                    let mut fields = Vec::with_capacity(flat.len() / 2);
                    let mut flat = flat.into_iter();
                    while let (Some(key), Some(value)) = (flat.next(), flat.next()) {
                        let key = match key {
                            IrValue::String(key) => key,
                            other => other.to_string(),
                        };
                        fields.push((key, value));
                    }
                    stack.push(IrValue::Object(fields));
                }
                Op::MakeFunction(idx) => {
                    let value = compiled
                        .function(idx)
                        .map_or(IrValue::Null, |function| {
                            IrValue::Function(Arc::clone(function))
                        });
                    stack.push(value);
                }
            }
        }
        stack.pop().unwrap_or_default()
    }

    /// Registry builtins win over function values bound in scope.
    fn call_named(
        &self,
        name: &str,
        args: &[IrValue],
        scope: &Scope<'_>,
        depth: usize,
    ) -> IrValue {
        if self.registry.contains(name) {
            return self.registry.call(name, args);
        }
        match scope.get(name) {
            Some(IrValue::Function(function)) => {
                let function = Arc::clone(function);
                self.invoke(&function, args, scope, depth)
            }
            _ => {
                tracing::warn!(name, "call to unknown builtin");
                IrValue::Null
            }
        }
    }

    fn call_method(
        &self,
        receiver: IrValue,
        method: &str,
        args: Args,
        scope: &Scope<'_>,
        depth: usize,
    ) -> IrValue {
        let builtin = match &receiver {
            IrValue::String(_) => BuiltinFn::string_method(method),
            IrValue::Array(_) => BuiltinFn::array_method(method),
            IrValue::Object(_) => {
                return match receiver.field(method) {
                    Some(IrValue::Function(function)) => {
                        let function = Arc::clone(function);
                        self.invoke(&function, &args, scope, depth)
                    }
                    _ => {
                        tracing::warn!(method, "object has no callable field");
                        IrValue::Null
                    }
                };
            }
            _ => None,
        };
        let Some(builtin) = builtin else {
            tracing::warn!(method, receiver = receiver.type_name(), "no such method");
            return IrValue::Null;
        };
        let mut full: Args = SmallVec::with_capacity(args.len() + 1);
        full.push(receiver);
        full.extend(args);
        self.registry.call(builtin.name(), &full)
    }
}

fn pop(stack: &mut Vec<IrValue>) -> IrValue {
    stack.pop().unwrap_or_default()
}

/// Pop the top `n` values, oldest first.
fn pop_n(stack: &mut Vec<IrValue>, n: u32) -> Args {
    let n = usize::try_from(n).unwrap_or(usize::MAX).min(stack.len());
    let start = stack.len() - n;
    stack.drain(start..).collect()
}

fn unary(stack: &mut Vec<IrValue>, op: UnaryOp) {
    let value = pop(stack);
    stack.push(evaluate_unary(op, &value));
}

fn to_pc(target: u32) -> usize {
    usize::try_from(target).unwrap_or(usize::MAX)
}

/// `object.name`: object fields, plus `length` on strings and arrays.
fn property(object: &IrValue, name: &str) -> IrValue {
    match (object, name) {
        (IrValue::Object(_), _) => object.field(name).cloned().unwrap_or_default(),
        (IrValue::String(s), "length") => length(s.chars().count()),
        (IrValue::Array(items), "length") => length(items.len()),
        _ => IrValue::Null,
    }
}

fn length(len: usize) -> IrValue {
    IrValue::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

/// `object[index]`: array and string positions, object keys. Out-of-range
/// and negative positions give `Null`.
fn element(object: IrValue, index: &IrValue) -> IrValue {
    match (object, index) {
        (IrValue::Array(mut items), IrValue::Int(i)) => match usize::try_from(*i) {
            Ok(i) if i < items.len() => items.swap_remove(i),
            _ => IrValue::Null,
        },
        (IrValue::String(s), IrValue::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map_or(IrValue::Null, |c| IrValue::String(c.to_string())),
        (object @ IrValue::Object(_), IrValue::String(key)) => {
            object.field(key).cloned().unwrap_or_default()
        }
        _ => IrValue::Null,
    }
}

#[cfg(test)]
mod tests;
