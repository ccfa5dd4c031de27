//! Parse-time [`Value`]s → `IrExpr`.

use kry_ir::{Ast, Callee, IrExpr, Value, ValueId};
use kry_parse::parse_expression;
use kry_stack::ensure_sufficient_stack;
use tracing::debug;

use crate::{lower_expr, ConvertError};

/// Integral numbers up to this magnitude lower to `Int`.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Lower one value of the syntax tree.
pub fn lower_value(ast: &Ast, id: ValueId) -> Result<IrExpr, ConvertError> {
    ensure_sufficient_stack(|| lower_value_inner(ast, id))
}

fn lower_value_inner(ast: &Ast, id: ValueId) -> Result<IrExpr, ConvertError> {
    Ok(match *ast.value(id) {
        Value::String(s) => IrExpr::string(ast.str(s)),
        Value::Number {
            value,
            is_percentage: true,
        } => IrExpr::string(format!("{value}%")),
        Value::Number { value, .. } => number(value),
        Value::Identifier(name) => identifier(ast.str(name)),
        Value::Expression(text) => lower_text(ast.str(text))?,
        Value::Array(items) => IrExpr::Array(
            ast.values(items)
                .iter()
                .map(|&item| lower_value(ast, item))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(entries) | Value::StructInstance { fields: entries, .. } => IrExpr::Object(
            ast.entries(entries)
                .iter()
                .map(|entry| Ok((ast.str(entry.key).to_owned(), lower_value(ast, entry.value)?)))
                .collect::<Result<_, ConvertError>>()?,
        ),
        Value::Range { start, end } => IrExpr::call(
            Callee::Range,
            vec![lower_value(ast, start)?, lower_value(ast, end)?],
        ),
    })
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "guarded: integral and within the exactly representable range"
)]
fn number(value: f64) -> IrExpr {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INT {
        IrExpr::int(value as i64)
    } else {
        IrExpr::float(value)
    }
}

fn identifier(name: &str) -> IrExpr {
    match name {
        "true" => IrExpr::bool(true),
        "false" => IrExpr::bool(false),
        "null" | "undefined" => IrExpr::null(),
        _ => IrExpr::var(name),
    }
}

/// Lower captured expression text.
///
/// Text the expression parser rejects is treated as a bare variable
/// reference. Conversion failures still propagate.
pub fn lower_text(text: &str) -> Result<IrExpr, ConvertError> {
    match parse_expression(text) {
        Ok(tree) => lower_expr(&tree),
        Err(err) => {
            debug!(text, %err, "unparseable expression, using variable reference");
            Ok(IrExpr::var(text.trim()))
        }
    }
}

/// Parse and lower expression source, failing on parse errors.
pub fn lower_source(text: &str) -> Result<IrExpr, ConvertError> {
    let tree = parse_expression(text).map_err(|source| ConvertError::Parse {
        text: text.to_owned(),
        source,
    })?;
    lower_expr(&tree)
}
