use kry_parse::ExprParseError;

/// Why an expression could not be lowered.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("assignment is not allowed in a value expression")]
    Assignment,
    #[error("`{0}` cannot be called")]
    UnsupportedCallee(String),
    #[error("cannot parse `{text}`: {source}")]
    Parse {
        text: String,
        #[source]
        source: ExprParseError,
    },
}
