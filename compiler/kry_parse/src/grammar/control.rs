//! Loops and conditionals.

use kry_ir::{ElseBranch, ForKind, NodeId, NodeKind, NodeRange};
use kry_lexer_core::Checkpoint;

use super::value::ValueCtx;
use crate::{Parser, Scope};

impl<'src> Parser<'src> {
    /// `for item in collection { ... }` or `for each item in collection { ... }`.
    ///
    /// `each` is only the loop form when another identifier follows it;
    /// `for each in items` iterates with a variable named `each`.
    pub(super) fn parse_for(&mut self, start: Checkpoint, scope: Scope) -> Option<NodeId> {
        let mut kind = ForKind::In;
        let mut iterator = self.expect_ident("loop variable after `for`")?;
        if iterator == "each" {
            let after_each = self.cursor.checkpoint();
            self.skip_trivia();
            match self.cursor.eat_identifier(false) {
                Some(word) if word != "in" => {
                    kind = ForKind::Each;
                    iterator = word;
                }
                _ => self.cursor.restore(after_each),
            }
        }

        self.skip_trivia();
        if !self.cursor.at_keyword("in") {
            let found = self.found();
            self.syntax_error(format!("expected `in` after loop variable, found {found}"));
            return None;
        }
        self.cursor.match_str("in");

        let collection = self.parse_value(ValueCtx::Header)?;
        let body = self.parse_block(scope, "loop body")?;

        let iterator = self.intern(iterator);
        let make = |body| NodeKind::ForLoop {
            kind,
            iterator,
            collection,
            body,
        };
        let id = self.alloc_node(start, make(NodeRange::EMPTY));
        let body = self.ast.alloc_children(id, &body);
        self.ast.set_kind(id, make(body));
        Some(id)
    }

    /// `if cond { ... }` with optional `else { ... }` or `else if ...`.
    pub(super) fn parse_if(&mut self, start: Checkpoint, scope: Scope) -> Option<NodeId> {
        self.skip_trivia();
        if self.cursor.peek() == b'{' {
            self.syntax_error("expected condition after `if`, found `{`");
            return None;
        }
        let condition = self.parse_value(ValueCtx::Header)?;
        let then_body = self.parse_block(scope, "`if` body")?;

        let before_else = self.cursor.checkpoint();
        self.skip_trivia();
        let mut else_block = None;
        let mut else_if = None;
        if self.cursor.at_keyword("else") {
            self.cursor.match_str("else");
            self.skip_trivia();
            if self.cursor.at_keyword("if") {
                let nested_start = self.cursor.checkpoint();
                self.cursor.match_str("if");
                else_if = Some(self.nested(|p| p.parse_if(nested_start, scope))?);
            } else {
                else_block = Some(self.parse_block(scope, "`else` body")?);
            }
        } else {
            self.cursor.restore(before_else);
        }

        let id = self.alloc_node(
            start,
            NodeKind::If {
                condition,
                then_body: NodeRange::EMPTY,
                else_branch: ElseBranch::None,
            },
        );
        let then_body = self.ast.alloc_children(id, &then_body);
        let else_branch = match (else_block, else_if) {
            (Some(block), _) => ElseBranch::Block(self.ast.alloc_children(id, &block)),
            (None, Some(nested)) => {
                self.ast.adopt(id, nested);
                ElseBranch::If(nested)
            }
            (None, None) => ElseBranch::None,
        };
        self.ast.set_kind(
            id,
            NodeKind::If {
                condition,
                then_body,
                else_branch,
            },
        );
        Some(id)
    }
}
