//! Property bindings and their hybrid-mode fallbacks.

use kry_ir::{Ast, IrExpr, IrLiteral, Value, ValueId};

use crate::{lower_value, CompileMode, ConvertError, LowerOptions};

/// What a renderer does with a property before its expression is evaluated.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PropertyClass {
    Color,
    Alignment,
    FontSize,
    /// Text content; the fallback is the expression source itself.
    Text,
    /// Input state written back by the user (`value`, `checked`).
    Input,
    /// `onClick`, `onChange`, ...
    Event,
    Other,
}

impl PropertyClass {
    pub fn of(name: &str) -> PropertyClass {
        match name {
            "color" | "background" | "backgroundColor" | "borderColor" | "textColor"
            | "activeTextColor" | "activeBackground" | "headerBackground"
            | "evenRowBackground" | "oddRowBackground" => PropertyClass::Color,
            "contentAlignment" | "alignItems" | "justifyContent" => PropertyClass::Alignment,
            "fontSize" => PropertyClass::FontSize,
            "text" | "label" => PropertyClass::Text,
            "value" | "checked" => PropertyClass::Input,
            _ if is_event_name(name) => PropertyClass::Event,
            _ => PropertyClass::Other,
        }
    }

    /// Literal shown until a hybrid binding is first evaluated.
    pub fn fallback(self, source: &str) -> IrLiteral {
        match self {
            PropertyClass::Color => IrLiteral::String("#00000000".to_owned()),
            PropertyClass::Alignment => IrLiteral::String("start".to_owned()),
            PropertyClass::FontSize => IrLiteral::Int(16),
            PropertyClass::Text | PropertyClass::Input => IrLiteral::String(source.to_owned()),
            PropertyClass::Event | PropertyClass::Other => IrLiteral::Int(0),
        }
    }
}

fn is_event_name(name: &str) -> bool {
    name.strip_prefix("on")
        .and_then(|rest| rest.bytes().next())
        .is_some_and(|b| b.is_ascii_uppercase())
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BindingKind {
    /// Re-evaluated and written into the rendered output.
    StaticTemplate,
    /// Also written back when the user edits the control.
    TwoWay,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PropertyBinding {
    /// Reads no variables and calls nothing.
    Static(IrExpr),
    /// Evaluated by the consumer, either at runtime or in generated code.
    Dynamic(IrExpr),
    /// Unresolved at build time in hybrid mode.
    Hybrid {
        expr: IrExpr,
        /// Expression text as written.
        source: String,
        fallback: IrLiteral,
        kind: BindingKind,
    },
    /// Event handler body.
    Handler(IrExpr),
}

impl PropertyBinding {
    pub fn expr(&self) -> &IrExpr {
        match self {
            PropertyBinding::Static(expr)
            | PropertyBinding::Dynamic(expr)
            | PropertyBinding::Hybrid { expr, .. }
            | PropertyBinding::Handler(expr) => expr,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, PropertyBinding::Static(_))
    }
}

/// Lower the value of property `name`.
///
/// `scope` holds names bound by enclosing component definitions and loops;
/// together with [`LowerOptions::params`] they count as resolved.
pub fn lower_property(
    ast: &Ast,
    name: &str,
    value: ValueId,
    options: &LowerOptions,
    scope: &[String],
) -> Result<PropertyBinding, ConvertError> {
    let expr = lower_value(ast, value)?;
    let class = PropertyClass::of(name);
    if class == PropertyClass::Event {
        return Ok(PropertyBinding::Handler(expr));
    }
    if is_constant(&expr) {
        return Ok(PropertyBinding::Static(expr));
    }

    let source = match *ast.value(value) {
        Value::Identifier(text) | Value::Expression(text) => Some(ast.str(text)),
        _ => None,
    };
    match source {
        Some(source)
            if options.mode == CompileMode::Hybrid && is_unresolved(source, options, scope) =>
        {
            let kind = if class == PropertyClass::Input {
                BindingKind::TwoWay
            } else {
                BindingKind::StaticTemplate
            };
            Ok(PropertyBinding::Hybrid {
                expr,
                source: source.to_owned(),
                fallback: class.fallback(source),
                kind,
            })
        }
        _ => Ok(PropertyBinding::Dynamic(expr)),
    }
}

/// No variable reads, calls or functions anywhere in the tree.
pub(crate) fn is_constant(expr: &IrExpr) -> bool {
    let mut constant = true;
    expr.walk(|node| {
        if matches!(
            node,
            IrExpr::Var(_) | IrExpr::Call { .. } | IrExpr::MethodCall { .. } | IrExpr::Arrow { .. }
        ) {
            constant = false;
        }
    });
    constant
}

/// `true` unless `source` names a resolved parameter, or is a field or index
/// access on one (`item.label`, `item[0]`).
fn is_unresolved(source: &str, options: &LowerOptions, scope: &[String]) -> bool {
    let source = source.trim();
    let resolves = |param: &str| {
        source
            .strip_prefix(param)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['.', '[']))
    };
    !options.params.iter().any(|p| resolves(p)) && !scope.iter().any(|p| resolves(p))
}

#[cfg(test)]
mod tests;
