//! Recursive descent parser for KRY source.
//!
//! Produces a flat [`Ast`] and an ordered [`DiagnosticList`]. Parsing keeps
//! going after non-fatal errors: a failed statement records one diagnostic,
//! is discarded, and the parser resumes at the next statement boundary.
//! Only a Fatal diagnostic stops it.
//!
//! Literal values are resolved while parsing. Dynamic values are captured as
//! raw expression text and structured later by [`parse_expression`].

mod expr;
mod grammar;
mod keyword;
mod literal;
mod options;
mod recovery;

pub use expr::{parse_expression, ExprParseError};
pub use keyword::Keyword;
pub use options::ParseOptions;

use kry_diagnostic::{Category, Diagnostic, DiagnosticList, Level};
use kry_ir::{Ast, LineCol, Name, NodeId, NodeKind, Span};
use kry_lexer_core::{effective_source, Checkpoint, SourceCursor};
use kry_stack::{ensure_sufficient_stack, NestingBudget};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Everything one parse produced.
#[derive(Debug)]
pub struct ParseOutput {
    pub ast: Ast,
    pub diagnostics: DiagnosticList,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// The first diagnostic, for callers that report a single error.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }
}

/// Parse KRY source text.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(source: &str, options: &ParseOptions) -> ParseOutput {
    let mut parser = Parser::new(source, options);
    parser.parse_root();
    debug!(
        nodes = parser.ast.node_count(),
        diagnostics = parser.diagnostics.len(),
        "parse finished"
    );
    ParseOutput {
        ast: parser.ast,
        diagnostics: parser.diagnostics,
    }
}

/// Parse raw bytes. A `length` of zero reads up to the first NUL byte.
///
/// Input that is not UTF-8 yields an empty tree and a Fatal diagnostic.
pub fn parse_bytes(bytes: &[u8], length: usize, options: &ParseOptions) -> ParseOutput {
    match effective_source(bytes, length) {
        Ok(source) => parse(source, options),
        Err(err) => {
            let mut diagnostics = DiagnosticList::with_config(options.diagnostics.clone());
            diagnostics.add(Diagnostic::fatal(Category::Syntax, err.to_string()));
            let mut ast = Ast::new();
            let root = ast.alloc_node(
                NodeKind::Root {
                    items: kry_ir::NodeRange::EMPTY,
                },
                Span::DUMMY,
                LineCol::START,
            );
            ast.set_root(root);
            ParseOutput { ast, diagnostics }
        }
    }
}

/// Where a statement appears; decides what `return` and `name(...)` mean.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Scope {
    TopLevel,
    Body,
    Function,
}

/// Parser state.
struct Parser<'src> {
    cursor: SourceCursor<'src>,
    ast: Ast,
    diagnostics: DiagnosticList,
    options: ParseOptions,
    nesting: NestingBudget,
    /// Struct names declared so far; `Name { ... }` with one of these is a
    /// struct instantiation rather than a child component.
    struct_names: FxHashSet<&'src str>,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, options: &ParseOptions) -> Self {
        Parser {
            cursor: SourceCursor::new(source),
            ast: Ast::new(),
            diagnostics: DiagnosticList::with_config(options.diagnostics.clone()),
            options: options.clone(),
            nesting: NestingBudget::new(options.max_nesting),
            struct_names: FxHashSet::default(),
        }
    }

    #[inline]
    fn skip_trivia(&mut self) {
        self.cursor.skip_whitespace_and_comments();
    }

    /// Skip spaces and tabs only, staying on the current line.
    #[inline]
    fn skip_inline_space(&mut self) {
        self.cursor.eat_while(|b| b == b' ' || b == b'\t' || b == b'\r');
    }

    #[inline]
    fn pos(&self) -> LineCol {
        LineCol::new(self.cursor.line(), self.cursor.column())
    }

    fn report(&mut self, level: Level, category: Category, message: impl Into<String>) {
        let diag = Diagnostic::new(level, category, message)
            .at(self.pos(), Span::point(self.cursor.offset()));
        self.diagnostics.add(diag);
    }

    fn error(&mut self, category: Category, message: impl Into<String>) {
        self.report(Level::Error, category, message);
    }

    fn syntax_error(&mut self, message: impl Into<String>) {
        self.report(Level::Error, Category::Syntax, message);
    }

    /// Describe the current byte for "expected X, found Y" messages.
    fn found(&self) -> String {
        if self.cursor.is_eof() {
            return "end of input".to_owned();
        }
        match self.cursor.rest().chars().next() {
            Some('\n') => "end of line".to_owned(),
            Some(c) => format!("`{c}`"),
            None => "end of input".to_owned(),
        }
    }

    /// Consume `byte` or record "expected ..." and fail.
    fn expect(&mut self, byte: u8, what: &str) -> Option<()> {
        self.skip_trivia();
        if self.cursor.match_byte(byte) {
            return Some(());
        }
        let found = self.found();
        self.syntax_error(format!("expected {what}, found {found}"));
        None
    }

    /// Read an identifier within the length cap.
    fn ident(&mut self, allow_dash: bool) -> Option<&'src str> {
        let word = self.cursor.eat_identifier(allow_dash)?;
        if word.len() > self.options.max_identifier_len {
            let limit = self.options.max_identifier_len;
            self.error(
                Category::BufferOverflow,
                format!("identifier longer than {limit} bytes"),
            );
            return None;
        }
        Some(word)
    }

    /// Read an identifier or record "expected {what}".
    fn expect_ident(&mut self, what: &str) -> Option<&'src str> {
        self.skip_trivia();
        if !kry_lexer_core::is_ident_start(self.cursor.peek()) {
            let found = self.found();
            self.syntax_error(format!("expected {what}, found {found}"));
            return None;
        }
        self.ident(false)
    }

    #[inline]
    fn intern(&mut self, text: &str) -> Name {
        self.ast.intern(text)
    }

    /// Allocate a node spanning from `start` to the cursor.
    fn alloc_node(&mut self, start: Checkpoint, kind: NodeKind) -> NodeId {
        let span = Span::new(start.offset(), self.cursor.offset());
        let pos = LineCol::new(start.line(), start.column());
        let id = self.ast.alloc_node(kind, span, pos);
        debug!(tag = kind.tag(), line = pos.line, "node");
        id
    }

    /// Run `f` one nesting level deeper, with stack growth. Exceeding the
    /// nesting limit is Fatal.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if !self.nesting.enter() {
            let limit = self.nesting.limit();
            self.report(
                Level::Fatal,
                Category::LimitExceeded,
                format!("nesting deeper than {limit} levels"),
            );
            return None;
        }
        let result = ensure_sufficient_stack(|| f(self));
        self.nesting.exit();
        result
    }
}

#[cfg(test)]
mod tests;
