use std::fmt;

use kry_ir::{LineCol, Span};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Level {
    Warning,
    Error,
    /// Parsing cannot safely continue.
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
            Level::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Category {
    Syntax,
    /// Parseable but semantically invalid.
    Validation,
    /// No IR form exists for the construct.
    Conversion,
    /// A fixed text buffer cap was exceeded.
    BufferOverflow,
    /// A fixed collection cap was exceeded.
    LimitExceeded,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Syntax => write!(f, "syntax"),
            Category::Validation => write!(f, "validation"),
            Category::Conversion => write!(f, "conversion"),
            Category::BufferOverflow => write!(f, "buffer-overflow"),
            Category::LimitExceeded => write!(f, "limit-exceeded"),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub category: Category,
    pub message: String,
    pub pos: LineCol,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(level: Level, category: Category, message: impl Into<String>) -> Self {
        Diagnostic {
            level,
            category,
            message: message.into(),
            pos: LineCol::START,
            span: Span::DUMMY,
        }
    }

    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Diagnostic::new(Level::Warning, category, message)
    }

    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Diagnostic::new(Level::Error, category, message)
    }

    pub fn fatal(category: Category, message: impl Into<String>) -> Self {
        Diagnostic::new(Level::Fatal, category, message)
    }

    #[must_use]
    pub fn at(mut self, pos: LineCol, span: Span) -> Self {
        self.pos = pos;
        self.span = span;
        self
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.pos.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.pos.column
    }

    /// `true` for Error and Fatal.
    pub fn is_error(&self) -> bool {
        self.level >= Level::Error
    }

    /// `file:line:col: level[category]: message`
    pub fn render(&self, file: &str) -> String {
        format!(
            "{file}:{}:{}: {}[{}]: {}",
            self.pos.line, self.pos.column, self.level, self.category, self.message
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] at {}: {}",
            self.level, self.category, self.pos, self.message
        )
    }
}
