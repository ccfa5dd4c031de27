//! Grammar Modules
//!
//! Each module extends `Parser` with methods for one group of productions:
//!
//! - [`component`]: component instances and definitions, properties, style
//!   blocks, struct instantiation and path statements
//! - [`control`]: `for`/`for each` loops and `if`/`else` chains
//! - [`decl`]: declarations, functions, structs, imports, `return`, `delete`
//!   and `@lang { }` code blocks
//! - [`value`]: the value sub-parser and expression-text capture
//!
//! A statement begins with one identifier. Keywords dispatch to their own
//! production; otherwise the next byte decides: `=` property, `.`/`[` path
//! statement, `{` child block, `(` component arguments (or a call inside a
//! function body).

mod component;
mod control;
mod decl;
mod value;

use kry_diagnostic::Category;
use kry_ir::{NodeId, NodeKind, NodeRange};
use kry_lexer_core::{is_ident_start, Checkpoint};

use crate::keyword::Keyword;
use crate::recovery::synchronize;
use crate::{Parser, Scope};

impl<'src> Parser<'src> {
    pub(crate) fn parse_root(&mut self) {
        let start = self.cursor.checkpoint();
        let items = self.parse_statements(Scope::TopLevel, false);
        let root = self.alloc_node(
            start,
            NodeKind::Root {
                items: NodeRange::EMPTY,
            },
        );
        let items = self.ast.alloc_children(root, &items);
        self.ast.set_kind(root, NodeKind::Root { items });
        self.ast.set_root(root);
    }

    /// Statements up to a closing `}` (inside a block) or end of input.
    fn parse_statements(&mut self, scope: Scope, in_block: bool) -> Vec<NodeId> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.is_eof() || self.diagnostics.should_stop() {
                break;
            }
            if self.cursor.peek() == b'}' {
                if in_block {
                    break;
                }
                self.syntax_error("unmatched `}`");
                self.cursor.advance();
                continue;
            }

            let before = self.cursor.offset();
            if let Some(id) = self.parse_statement(scope) {
                items.push(id);
                self.finish_statement();
                continue;
            }
            if self.diagnostics.should_stop() {
                break;
            }
            synchronize(&mut self.cursor);
            if self.cursor.offset() == before && self.cursor.peek() != b'}' {
                self.cursor.advance();
            }
        }
        items
    }

    /// Consume an optional `;` or `,` terminator on the statement's line.
    fn finish_statement(&mut self) {
        self.skip_inline_space();
        if !self.cursor.match_byte(b';') {
            self.cursor.match_byte(b',');
        }
    }

    /// Parse a `{ ... }` block of statements.
    pub(crate) fn parse_block(&mut self, scope: Scope, what: &str) -> Option<Vec<NodeId>> {
        self.expect(b'{', &format!("`{{` to open {what}"))?;
        self.nested(|p| {
            let items = p.parse_statements(scope, true);
            if p.diagnostics.should_stop() {
                return None;
            }
            if !p.cursor.match_byte(b'}') {
                let found = p.found();
                p.syntax_error(format!("expected `}}` to close {what}, found {found}"));
                return None;
            }
            Some(items)
        })
    }

    /// `=` that is an assignment, not `==` or `=>`.
    pub(crate) fn at_assign(&self) -> bool {
        self.cursor.peek() == b'='
            && self.cursor.peek_at(1) != b'='
            && self.cursor.peek_at(1) != b'>'
    }

    fn parse_statement(&mut self, scope: Scope) -> Option<NodeId> {
        let start = self.cursor.checkpoint();
        let first = self.cursor.peek();
        if first == b'@' {
            return self.parse_code_block(start);
        }
        if !is_ident_start(first) {
            let found = self.found();
            self.syntax_error(format!(
                "expected a property, declaration or component, found {found}"
            ));
            return None;
        }

        let word = self.ident(true)?;
        self.skip_trivia();
        let assigned = self.at_assign();

        if !assigned {
            if let Some(keyword) = Keyword::lookup(word) {
                return self.parse_keyword(keyword, start, scope);
            }
            if word == "else" {
                self.syntax_error("`else` without a matching `if`");
                return None;
            }
        }

        match self.cursor.peek() {
            b'=' if assigned => self.parse_property(start, word),
            b'.' | b'[' => self.parse_path_statement(start),
            b'(' if scope == Scope::Function => self.parse_path_statement(start),
            b'(' => self.parse_component(start, word),
            b'{' if self.struct_names.contains(word) => self.parse_struct_statement(start, word),
            b'{' => self.parse_component(start, word),
            _ => {
                let found = self.found();
                self.syntax_error(format!(
                    "expected `=`, `{{`, `(` or `.` after `{word}`, found {found}"
                ));
                None
            }
        }
    }

    fn parse_keyword(
        &mut self,
        keyword: Keyword,
        start: Checkpoint,
        scope: Scope,
    ) -> Option<NodeId> {
        match keyword {
            Keyword::Decl(qualifier) => self.parse_var_decl(start, qualifier),
            Keyword::Static => {
                let children = self.parse_block(Scope::Body, "static block")?;
                let id = self.alloc_node(
                    start,
                    NodeKind::StaticBlock {
                        children: NodeRange::EMPTY,
                    },
                );
                let children = self.ast.alloc_children(id, &children);
                self.ast.set_kind(id, NodeKind::StaticBlock { children });
                Some(id)
            }
            Keyword::For => self.parse_for(start, scope),
            Keyword::If => self.parse_if(start, scope),
            Keyword::Style => self.parse_style(start),
            Keyword::Component => self.parse_definition(start),
            Keyword::Function => self.parse_function(start),
            Keyword::Struct => self.parse_struct_decl(start),
            Keyword::Import => self.parse_import(start),
            Keyword::Return => self.parse_return(start, scope),
            Keyword::Delete => self.parse_delete(start),
        }
    }

    /// Report a collection cap violation.
    pub(crate) fn limit_exceeded(&mut self, what: &str, limit: usize) {
        self.error(
            Category::LimitExceeded,
            format!("{what} exceeds the limit of {limit}"),
        );
    }
}
