//! Declarations and statements introduced by a keyword.

use kry_ir::{NodeId, NodeKind, NodeRange, StructField, VarQualifier};
use kry_lexer_core::{is_ident_start, Checkpoint};

use super::value::ValueCtx;
use crate::{Parser, Scope};

impl<'src> Parser<'src> {
    /// `const|let|var name[: type] = value` or `state name: type [= value]`.
    pub(super) fn parse_var_decl(
        &mut self,
        start: Checkpoint,
        qualifier: VarQualifier,
    ) -> Option<NodeId> {
        let what = format!("variable name after `{}`", qualifier.as_str());
        let name = self.expect_ident(&what)?;
        self.skip_inline_space();

        let ty = if self.cursor.match_byte(b':') {
            Some(self.parse_type_name()?)
        } else {
            if qualifier == VarQualifier::State {
                let found = self.found();
                self.syntax_error(format!(
                    "expected `:` and a type after state `{name}`, found {found}"
                ));
                return None;
            }
            None
        };
        self.skip_inline_space();

        let value = if self.at_assign() {
            self.cursor.advance();
            Some(self.parse_value(ValueCtx::Statement)?)
        } else if qualifier == VarQualifier::Const {
            let found = self.found();
            self.syntax_error(format!("expected `=` after const `{name}`, found {found}"));
            return None;
        } else {
            None
        };

        let name = self.intern(name);
        let ty = ty.map(|ty| self.intern(ty));
        Some(self.alloc_node(
            start,
            NodeKind::VarDecl {
                name,
                ty,
                value,
                qualifier,
            },
        ))
    }

    /// `function name(params) [-> type] { ... }`
    pub(super) fn parse_function(&mut self, start: Checkpoint) -> Option<NodeId> {
        let name = self.expect_ident("function name")?;
        self.skip_trivia();
        if self.cursor.peek() != b'(' {
            let found = self.found();
            self.syntax_error(format!("expected `(` after function `{name}`, found {found}"));
            return None;
        }
        let (params, _) = self.parse_params()?;
        self.skip_trivia();
        let return_type = if self.cursor.match_str("->") || self.cursor.match_byte(b':') {
            Some(self.parse_type_name()?)
        } else {
            None
        };

        let body = self.parse_block(Scope::Function, &format!("function `{name}`"))?;
        let name = self.intern(name);
        let params = self.ast.alloc_params(&params);
        let return_type = return_type.map(|ty| self.intern(ty));
        let make = |body| NodeKind::FunctionDecl {
            name,
            params,
            return_type,
            body,
        };
        let id = self.alloc_node(start, make(NodeRange::EMPTY));
        let body = self.ast.alloc_children(id, &body);
        self.ast.set_kind(id, make(body));
        Some(id)
    }

    /// `struct Name { field: type [= default] ... }`
    pub(super) fn parse_struct_decl(&mut self, start: Checkpoint) -> Option<NodeId> {
        let name = self.expect_ident("struct name")?;
        self.skip_trivia();
        let open = self.cursor.checkpoint();
        self.expect(b'{', &format!("`{{` after struct `{name}`"))?;

        let mut fields = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.match_byte(b'}') {
                break;
            }
            if fields.len() == self.options.max_struct_fields {
                let limit = self.options.max_struct_fields;
                self.limit_exceeded(&format!("struct `{name}`"), limit);
                self.skip_group(open, b'{');
                return None;
            }
            let field = self.expect_ident("field name")?;
            self.skip_trivia();
            let ty = if self.cursor.match_byte(b':') {
                Some(self.parse_type_name()?)
            } else {
                None
            };
            self.skip_trivia();
            let default = if self.at_assign() {
                self.cursor.advance();
                Some(self.parse_value(ValueCtx::Statement)?)
            } else {
                None
            };
            let field = self.intern(field);
            let ty = ty.map(|ty| self.intern(ty));
            fields.push(StructField {
                name: field,
                ty,
                default,
            });
            self.skip_inline_space();
            if !self.cursor.match_byte(b',') {
                self.cursor.match_byte(b';');
            }
        }

        self.struct_names.insert(name);
        let name = self.intern(name);
        let fields = self.ast.alloc_fields(&fields);
        Some(self.alloc_node(start, NodeKind::StructDecl { name, fields }))
    }

    /// `import Name from "module"`, `import { a, b } from "module"` or
    /// `import "module"`.
    pub(super) fn parse_import(&mut self, start: Checkpoint) -> Option<NodeId> {
        self.skip_trivia();
        let mut names = Vec::new();
        let mut destructured = false;

        match self.cursor.peek() {
            b'"' | b'\'' => {
                let module = self.parse_string_literal()?;
                let module = self.intern(&module);
                return Some(self.alloc_node(
                    start,
                    NodeKind::Import {
                        names: kry_ir::NameRange::EMPTY,
                        module,
                        destructured: false,
                    },
                ));
            }
            b'{' => {
                self.cursor.advance();
                destructured = true;
                loop {
                    self.skip_trivia();
                    if self.cursor.match_byte(b'}') {
                        break;
                    }
                    let name = self.expect_ident("imported name")?;
                    names.push(self.intern(name));
                    self.skip_trivia();
                    if self.cursor.match_byte(b',') {
                        continue;
                    }
                    self.expect(b'}', "`,` or `}` in import list")?;
                    break;
                }
            }
            _ => loop {
                let name = self.expect_ident("imported name")?;
                names.push(self.intern(name));
                self.skip_trivia();
                if !self.cursor.match_byte(b',') {
                    break;
                }
            },
        }

        self.skip_trivia();
        if !self.cursor.at_keyword("from") {
            let found = self.found();
            self.syntax_error(format!("expected `from` in import, found {found}"));
            return None;
        }
        self.cursor.match_str("from");
        let module = self.parse_module_path()?;
        let module = self.intern(&module);
        let names = self.ast.alloc_names(&names);
        Some(self.alloc_node(
            start,
            NodeKind::Import {
                names,
                module,
                destructured,
            },
        ))
    }

    /// Quoted path or dotted name: `"./widgets"` or `ui.widgets`.
    fn parse_module_path(&mut self) -> Option<String> {
        self.skip_trivia();
        match self.cursor.peek() {
            b'"' | b'\'' => self.parse_string_literal(),
            byte if is_ident_start(byte) => {
                let from = self.cursor.offset();
                self.cursor.eat_while(|b| {
                    kry_lexer_core::is_ident_continue(b) || b == b'.' || b == b'/' || b == b'-'
                });
                Some(self.cursor.slice_from(from).to_owned())
            }
            _ => {
                let found = self.found();
                self.syntax_error(format!("expected module path, found {found}"));
                None
            }
        }
    }

    /// `return [value]`, or `return { a, b }` exporting names at top level.
    pub(super) fn parse_return(&mut self, start: Checkpoint, scope: Scope) -> Option<NodeId> {
        self.skip_inline_space();
        if scope == Scope::TopLevel && self.cursor.peek() == b'{' {
            if let Some(exports) = self.try_export_list() {
                let exports = self.ast.alloc_names(&exports);
                return Some(self.alloc_node(start, NodeKind::ModuleReturn { exports }));
            }
        }

        let at_end = self.cursor.is_eof() || matches!(self.cursor.peek(), b'\n' | b';' | b'}');
        let value = if at_end {
            None
        } else {
            Some(self.parse_value(ValueCtx::Statement)?)
        };
        Some(self.alloc_node(start, NodeKind::Return { value }))
    }

    /// `{ a, b }` made only of names; restores the cursor otherwise.
    fn try_export_list(&mut self) -> Option<Vec<kry_ir::Name>> {
        let open = self.cursor.checkpoint();
        self.cursor.advance();
        let mut words = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.match_byte(b'}') {
                break;
            }
            let Some(word) = self.cursor.eat_identifier(false) else {
                self.cursor.restore(open);
                return None;
            };
            words.push(word);
            self.skip_trivia();
            if self.cursor.match_byte(b',') {
                continue;
            }
            if self.cursor.match_byte(b'}') {
                break;
            }
            self.cursor.restore(open);
            return None;
        }
        Some(words.into_iter().map(|word| self.intern(word)).collect())
    }

    /// `delete target`, where the target is a name or an access chain.
    pub(super) fn parse_delete(&mut self, start: Checkpoint) -> Option<NodeId> {
        self.skip_trivia();
        let target_start = self.cursor.checkpoint();
        if !is_ident_start(self.cursor.peek()) {
            let found = self.found();
            self.syntax_error(format!("expected target after `delete`, found {found}"));
            return None;
        }
        self.ident(false)?;
        let target = self.capture_chain(target_start)?;
        let target = self.intern(target);
        Some(self.alloc_node(start, NodeKind::Delete { target }))
    }

    /// `@lua { ... }`: foreign code kept verbatim.
    pub(super) fn parse_code_block(&mut self, start: Checkpoint) -> Option<NodeId> {
        self.cursor.advance();
        let Some(language) = self.ident(false) else {
            let found = self.found();
            self.syntax_error(format!("expected language name after `@`, found {found}"));
            return None;
        };
        self.skip_trivia();
        if self.cursor.peek() != b'{' {
            let found = self.found();
            self.syntax_error(format!("expected `{{` after `@{language}`, found {found}"));
            return None;
        }
        let Some((from, to)) = self.scan_balanced(b'{') else {
            self.syntax_error(format!("unterminated `@{language}` block"));
            return None;
        };
        let source = self.cursor.slice(from, to);
        let language = self.intern(language);
        let source = self.intern(source);
        Some(self.alloc_node(start, NodeKind::CodeBlock { language, source }))
    }
}
