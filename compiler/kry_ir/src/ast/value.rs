use crate::arena::Name;

use super::{EntryRange, ValueId, ValueRange};

/// A value in property, declaration or collection position.
///
/// Literal values are fully resolved at parse time. Anything dynamic is kept
/// as raw expression text for the expression-AST parser to structure later.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Value {
    String(Name),
    Number {
        value: f64,
        is_percentage: bool,
    },
    Identifier(Name),
    /// Unparsed expression text.
    Expression(Name),
    Array(ValueRange),
    Object(EntryRange),
    StructInstance {
        type_name: Name,
        fields: EntryRange,
    },
    Range {
        start: ValueId,
        end: ValueId,
    },
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number { .. } => "number",
            Value::Identifier(_) => "identifier",
            Value::Expression(_) => "expression",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::StructInstance { .. } => "struct",
            Value::Range { .. } => "range",
        }
    }
}

/// Key/value pair of an object literal or struct instantiation.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Entry {
    pub key: Name,
    pub value: ValueId,
}
