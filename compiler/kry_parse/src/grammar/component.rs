//! Components, properties, style blocks and struct instantiation.

use kry_ir::{Entry, NodeId, NodeKind, NodeRange, Param, ParamRange};
use kry_lexer_core::{is_ident_continue, is_ident_start, Checkpoint};

use super::value::ValueCtx;
use crate::{Parser, Scope};

impl<'src> Parser<'src> {
    /// `name = value`
    pub(super) fn parse_property(&mut self, start: Checkpoint, name: &str) -> Option<NodeId> {
        self.cursor.advance();
        let value = self.parse_value(ValueCtx::Statement)?;
        let name = self.intern(name);
        Some(self.alloc_node(start, NodeKind::Property { name, value }))
    }

    /// `Name { ... }`, `Name(args) { ... }` or `Name(args)`.
    pub(super) fn parse_component(&mut self, start: Checkpoint, name: &str) -> Option<NodeId> {
        let mut args = None;
        if self.cursor.peek() == b'(' {
            let (from, to) = self.expect_balanced(b'(', "component argument list")?;
            let text = self.cursor.slice(from, to).trim();
            if !text.is_empty() {
                args = Some(self.intern(text));
            }
            let after_args = self.cursor.checkpoint();
            self.skip_trivia();
            if self.cursor.peek() != b'{' {
                self.cursor.restore(after_args);
                let name = self.intern(name);
                return Some(self.alloc_node(
                    start,
                    NodeKind::Component {
                        name,
                        args,
                        params: ParamRange::EMPTY,
                        children: NodeRange::EMPTY,
                        is_definition: false,
                        extends: None,
                    },
                ));
            }
        }

        let children = self.parse_block(Scope::Body, &format!("component `{name}`"))?;
        let name = self.intern(name);
        let kind = |children| NodeKind::Component {
            name,
            args,
            params: ParamRange::EMPTY,
            children,
            is_definition: false,
            extends: None,
        };
        let id = self.alloc_node(start, kind(NodeRange::EMPTY));
        let children = self.ast.alloc_children(id, &children);
        self.ast.set_kind(id, kind(children));
        Some(id)
    }

    /// `component Name(params) extends Parent { ... }`
    pub(super) fn parse_definition(&mut self, start: Checkpoint) -> Option<NodeId> {
        let name = self.expect_ident("component name after `component`")?;
        self.skip_trivia();

        let mut params = Vec::new();
        let mut args = None;
        if self.cursor.peek() == b'(' {
            let (list, text) = self.parse_params()?;
            params = list;
            if !text.is_empty() {
                args = Some(self.intern(text));
            }
            self.skip_trivia();
        }

        let mut extends = None;
        if self.cursor.at_keyword("extends") {
            self.cursor.match_str("extends");
            let parent = self.expect_ident("parent component after `extends`")?;
            extends = Some(self.intern(parent));
        }

        let children = self.parse_block(Scope::Body, &format!("component `{name}`"))?;
        let name = self.intern(name);
        let params = self.ast.alloc_params(&params);
        let kind = |children| NodeKind::Component {
            name,
            args,
            params,
            children,
            is_definition: true,
            extends,
        };
        let id = self.alloc_node(start, kind(NodeRange::EMPTY));
        let children = self.ast.alloc_children(id, &children);
        self.ast.set_kind(id, kind(children));
        Some(id)
    }

    /// Parameter list at `(`: `(a, b: int, c = 5)`.
    ///
    /// Returns the parameters and the raw text between the parentheses.
    pub(super) fn parse_params(&mut self) -> Option<(Vec<Param>, &'src str)> {
        let open = self.cursor.checkpoint();
        self.cursor.advance();
        let mut params = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.match_byte(b')') {
                break;
            }
            if params.len() == self.options.max_params {
                let limit = self.options.max_params;
                self.limit_exceeded("parameter list", limit);
                self.skip_group(open, b'(');
                return None;
            }

            let name = self.expect_ident("parameter name")?;
            let name = self.intern(name);
            self.skip_trivia();
            let ty = if self.cursor.match_byte(b':') {
                let ty = self.parse_type_name()?;
                self.skip_trivia();
                Some(self.intern(ty))
            } else {
                None
            };
            let default = if self.at_assign() {
                self.cursor.advance();
                let value = self.parse_value(ValueCtx::Statement)?;
                self.skip_trivia();
                Some(value)
            } else {
                None
            };
            params.push(Param { name, ty, default });

            if self.cursor.match_byte(b',') {
                continue;
            }
            if self.cursor.match_byte(b')') {
                break;
            }
            let found = self.found();
            self.syntax_error(format!("expected `,` or `)` in parameter list, found {found}"));
            return None;
        }

        let inner_start = open.offset() + 1;
        let inner_end = self.cursor.offset().saturating_sub(1);
        let text = self.cursor.slice(inner_start, inner_end).trim();
        Some((params, text))
    }

    /// Type annotation: `int`, `string[]`, `Map<string, int>`, `Item?`.
    pub(super) fn parse_type_name(&mut self) -> Option<&'src str> {
        self.skip_trivia();
        let start = self.cursor.offset();
        if !is_ident_start(self.cursor.peek()) {
            let found = self.found();
            self.syntax_error(format!("expected type name, found {found}"));
            return None;
        }
        self.ident(false)?;
        loop {
            match self.cursor.peek() {
                b'[' if self.cursor.peek_at(1) == b']' => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                b'<' => {
                    let mut depth = 0u32;
                    while !self.cursor.is_eof() {
                        match self.cursor.advance() {
                            b'<' => depth += 1,
                            b'>' => {
                                depth = depth.saturating_sub(1);
                                if depth == 0 {
                                    break;
                                }
                            }
                            b'\n' => break,
                            _ => {}
                        }
                    }
                }
                b'?' => {
                    self.cursor.advance();
                }
                _ => break,
            }
        }
        Some(self.cursor.slice_from(start))
    }

    /// `style selector { ... }` where the selector is a name or a quoted
    /// complex selector.
    pub(super) fn parse_style(&mut self, start: Checkpoint) -> Option<NodeId> {
        self.skip_trivia();
        let selector = match self.cursor.peek() {
            b'"' | b'\'' => self.parse_string_literal()?,
            _ => {
                let from = self.cursor.offset();
                self.cursor
                    .eat_while(|b| is_ident_continue(b) || matches!(b, b'.' | b'#' | b':' | b'-'));
                self.cursor.slice_from(from).to_owned()
            }
        };
        if selector.is_empty() {
            let found = self.found();
            self.syntax_error(format!("expected selector after `style`, found {found}"));
            return None;
        }

        let children = self.parse_block(Scope::Body, "style block")?;
        let selector = self.intern(&selector);
        let id = self.alloc_node(
            start,
            NodeKind::StyleBlock {
                selector,
                children: NodeRange::EMPTY,
            },
        );
        let children = self.ast.alloc_children(id, &children);
        self.ast.set_kind(id, NodeKind::StyleBlock { selector, children });
        Some(id)
    }

    /// `Point { x = 1; y = 2 }` for a declared struct.
    pub(super) fn parse_struct_statement(
        &mut self,
        start: Checkpoint,
        type_name: &str,
    ) -> Option<NodeId> {
        let entries = self.parse_struct_fields()?;
        let type_name = self.intern(type_name);
        let fields = self.ast.alloc_entries(&entries);
        Some(self.alloc_node(start, NodeKind::StructInst { type_name, fields }))
    }

    /// Field assignments of a struct instantiation, at the opening `{`.
    pub(super) fn parse_struct_fields(&mut self) -> Option<Vec<Entry>> {
        let open = self.cursor.checkpoint();
        self.cursor.advance();
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.match_byte(b'}') {
                return Some(entries);
            }
            if self.cursor.is_eof() {
                self.syntax_error("expected `}` to close struct literal, found end of input");
                return None;
            }
            if entries.len() == self.options.max_struct_fields {
                let limit = self.options.max_struct_fields;
                self.limit_exceeded("struct literal", limit);
                self.skip_group(open, b'{');
                return None;
            }

            let Some(key) = self.expect_ident("field name") else {
                self.skip_group(open, b'{');
                return None;
            };
            self.skip_trivia();
            if !(self.at_assign() || self.cursor.peek() == b':') {
                let found = self.found();
                self.syntax_error(format!("expected `=` after field `{key}`, found {found}"));
                self.skip_group(open, b'{');
                return None;
            }
            self.cursor.advance();
            let Some(value) = self.parse_value(ValueCtx::Statement) else {
                self.skip_group(open, b'{');
                return None;
            };
            let key = self.intern(key);
            entries.push(Entry { key, value });

            self.skip_inline_space();
            if !self.cursor.match_byte(b';') {
                self.cursor.match_byte(b',');
            }
        }
    }

    /// `user.name = value`, `items[0] = value` or `list.push(4)`, kept as
    /// statement text.
    pub(super) fn parse_path_statement(&mut self, start: Checkpoint) -> Option<NodeId> {
        let text = self.capture_text(start, ValueCtx::Statement)?;
        let expr = self.intern(text);
        Some(self.alloc_node(start, NodeKind::ExpressionStmt { expr }))
    }
}
