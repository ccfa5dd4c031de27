//! The `eval` command: run one expression through the whole pipeline.

use kry_eval::{compile, BuiltinRegistry, CompilerOptions, IrValue, Scope, Vm};
use kry_ir::IrExpr;
use kry_lower::lower_source;

/// Evaluate `source` with `name=value` locals and print the result.
/// Returns `false` when the expression or a local does not parse.
pub fn eval_expression(
    source: &str,
    locals: &[&str],
    fold_constants: bool,
    disassemble: bool,
) -> bool {
    let registry = BuiltinRegistry::with_stdlib();
    let vm = Vm::new(&registry);
    let options = CompilerOptions { fold_constants };

    let mut scope = Scope::new();
    for local in locals {
        match parse_local(local, &vm) {
            Ok((name, value)) => scope.set(name, value),
            Err(msg) => {
                eprintln!("error: {msg}");
                return false;
            }
        }
    }

    let expr = match lower_source(source) {
        Ok(expr) => expr,
        Err(err) => {
            eprintln!("error: {err}");
            return false;
        }
    };
    let compiled = compile(&expr, &options);
    if disassemble {
        print!("{compiled}");
    }
    println!("{}", render(&vm.eval(&compiled, &scope)));
    true
}

/// Parse `name=value`.
///
/// A value that reads no variables is evaluated (`n=3`, `xs=[1, 2]`,
/// `s="text"`); anything else is taken verbatim as a string, so `name=kry`
/// binds `"kry"`.
fn parse_local<'a>(arg: &'a str, vm: &Vm<'_>) -> Result<(&'a str, IrValue), String> {
    let Some((name, text)) = arg.split_once('=') else {
        return Err(format!("expected name=value, found '{arg}'"));
    };
    let name = name.trim();
    if !is_identifier(name) {
        return Err(format!("'{name}' is not a valid variable name"));
    }
    let value = match lower_source(text) {
        Ok(expr) if reads_nothing(&expr) => {
            vm.eval(&compile(&expr, &CompilerOptions::default()), &Scope::new())
        }
        _ => IrValue::String(text.to_owned()),
    };
    Ok((name, value))
}

fn reads_nothing(expr: &IrExpr) -> bool {
    expr.variables().is_empty()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Top-level strings print quoted so `"1"` and `1` stay distinguishable.
fn render(value: &IrValue) -> String {
    match value {
        IrValue::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}
