//! Value sub-parser and expression-text capture.
//!
//! Literals (strings, numbers, arrays, objects, struct instances, ranges)
//! become structured [`Value`]s. Anything dynamic is captured as raw text
//! in a [`Value::Expression`]:
//!
//! - an identifier followed by `.`, `[` or `(` (access chains and calls)
//! - a value led by a unary operator, `(` or a template string
//! - a value followed by a binary operator
//! - arrow functions, found by scanning for `(params) =>` or `name =>`
//! - `{ ... }` blocks that are not object literals, and `$name`

use kry_diagnostic::Category;
use kry_ir::{Entry, Value, ValueId};
use kry_lexer_core::{is_ident_continue, is_ident_start, Checkpoint};

use crate::keyword::Keyword;
use crate::literal::scan_string;
use crate::recovery::skip_quoted;
use crate::Parser;

/// Where a value appears.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum ValueCtx {
    /// Property, declaration, field or element position.
    Statement,
    /// `for`/`if` header: a `{` ends the value and struct literals are off.
    Header,
}

enum IdentValue {
    Value(ValueId),
    /// `name => ...`, captured whole as expression text.
    Arrow,
}

/// Binary operators that turn a value into captured expression text.
const BINARY_OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "&&", "||", "+", "-", "*", "/", "%", "<", ">", "?",
];

/// Line openings that continue the expression on the previous line.
fn starts_with_continuation(line: &str) -> bool {
    line.starts_with('?')
        || line.starts_with(':')
        || line.starts_with("&&")
        || line.starts_with("||")
}

/// Can this byte begin an operand?
fn is_operand_start(byte: u8) -> bool {
    is_ident_continue(byte) || matches!(byte, b'(' | b'[' | b'"' | b'\'' | b'$' | b'`')
}

impl<'src> Parser<'src> {
    pub(crate) fn parse_value(&mut self, ctx: ValueCtx) -> Option<ValueId> {
        self.nested(|p| p.parse_value_inner(ctx))
    }

    fn parse_value_inner(&mut self, ctx: ValueCtx) -> Option<ValueId> {
        self.skip_trivia();
        let start = self.cursor.checkpoint();
        let first = self.cursor.peek();

        let lead = match first {
            b'(' => {
                let ctx = if self.at_arrow_params() {
                    ValueCtx::Statement
                } else {
                    ctx
                };
                return self.capture_expression(start, ctx);
            }
            b'!' | b'`' => return self.capture_expression(start, ctx),
            b'-' if !self.cursor.peek_at(1).is_ascii_digit() => {
                return self.capture_expression(start, ctx);
            }
            _ if self.cursor.at_keyword("typeof") => return self.capture_expression(start, ctx),
            b'"' | b'\'' => {
                let text = self.parse_string_literal()?;
                let text = self.intern(&text);
                self.ast.alloc_value(Value::String(text))
            }
            b'-' | b'0'..=b'9' => self.parse_number()?,
            b'$' => self.parse_dollar()?,
            b'[' => self.parse_array()?,
            b'{' => self.parse_brace()?,
            _ if is_ident_start(first) => match self.parse_ident_value(start, ctx)? {
                IdentValue::Value(value) => value,
                IdentValue::Arrow => return self.capture_expression(start, ValueCtx::Statement),
            },
            _ => {
                let found = self.found();
                self.syntax_error(format!("expected a value, found {found}"));
                return None;
            }
        };
        self.parse_value_tail(start, lead, ctx)
    }

    /// Range or trailing operator after a complete value.
    fn parse_value_tail(
        &mut self,
        start: Checkpoint,
        lead: ValueId,
        ctx: ValueCtx,
    ) -> Option<ValueId> {
        if self.cursor.rest().starts_with("..") && !self.cursor.rest().starts_with("...") {
            self.cursor.match_str("..");
            let end = self.parse_value(ctx)?;
            return Some(self.ast.alloc_value(Value::Range { start: lead, end }));
        }

        let after = self.cursor.checkpoint();
        self.skip_inline_space();
        if self.at_binary_operator() || self.continues_with_operator() {
            return self.capture_expression(start, ctx);
        }
        self.cursor.restore(after);
        Some(lead)
    }

    /// At a line break: does the next line carry on with `?`, `:`, `&&`
    /// or `||`?
    fn continues_with_operator(&self) -> bool {
        if self.cursor.peek() != b'\n' {
            return false;
        }
        starts_with_continuation(self.cursor.rest().trim_start())
    }

    fn at_binary_operator(&self) -> bool {
        let rest = self.cursor.rest();
        if rest.starts_with("//") || rest.starts_with("/*") || rest.starts_with("->") {
            return false;
        }
        BINARY_OPERATORS.iter().any(|op| rest.starts_with(op))
    }

    /// Identifier, access chain or struct literal at an identifier.
    fn parse_ident_value(&mut self, start: Checkpoint, ctx: ValueCtx) -> Option<IdentValue> {
        let word = self.ident(false)?;

        let after = self.cursor.checkpoint();
        self.skip_inline_space();
        if self.cursor.rest().starts_with("=>") {
            return Some(IdentValue::Arrow);
        }
        self.cursor.restore(after);

        let chained = match self.cursor.peek() {
            b'.' => self.cursor.peek_at(1) != b'.',
            b'[' | b'(' => true,
            _ => false,
        };
        if chained {
            let text = self.capture_chain(start)?;
            let text = self.intern(text);
            return Some(IdentValue::Value(
                self.ast.alloc_value(Value::Expression(text)),
            ));
        }

        if ctx == ValueCtx::Statement {
            self.skip_inline_space();
            if self.cursor.peek() == b'{' && self.looks_like_struct_body() {
                let entries = self.parse_struct_fields()?;
                let type_name = self.intern(word);
                let fields = self.ast.alloc_entries(&entries);
                return Some(IdentValue::Value(
                    self.ast
                        .alloc_value(Value::StructInstance { type_name, fields }),
                ));
            }
            self.cursor.restore(after);
        }

        let name = self.intern(word);
        Some(IdentValue::Value(
            self.ast.alloc_value(Value::Identifier(name)),
        ))
    }

    /// At `{`: is this `{ field = ...` or `{}` rather than a statement block?
    fn looks_like_struct_body(&mut self) -> bool {
        let open = self.cursor.checkpoint();
        self.cursor.advance();
        self.skip_trivia();
        let result = if self.cursor.peek() == b'}' {
            true
        } else {
            match self.cursor.eat_identifier(false) {
                Some(word) if !Keyword::is_control(word) => {
                    self.skip_inline_space();
                    self.at_assign()
                }
                _ => false,
            }
        };
        self.cursor.restore(open);
        result
    }

    /// At `(`: does a parameter list followed by `=>` start here?
    fn at_arrow_params(&mut self) -> bool {
        let open = self.cursor.checkpoint();
        self.cursor.advance();
        let mut ok = false;
        loop {
            self.skip_trivia();
            if self.cursor.match_byte(b')') {
                ok = true;
                break;
            }
            if self.cursor.eat_identifier(false).is_none() {
                break;
            }
            self.skip_trivia();
            if self.cursor.match_byte(b':') {
                self.skip_trivia();
                if self.cursor.eat_identifier(false).is_none() {
                    break;
                }
                self.skip_trivia();
            }
            if self.cursor.match_byte(b',') {
                continue;
            }
            if self.cursor.match_byte(b')') {
                ok = true;
            }
            break;
        }
        if ok {
            self.skip_trivia();
            ok = self.cursor.rest().starts_with("=>");
        }
        self.cursor.restore(open);
        ok
    }

    /// Access chain after an identifier: `.name`, `[index]`, `(args)`,
    /// repeated. Returns the text from `start`.
    pub(crate) fn capture_chain(&mut self, start: Checkpoint) -> Option<&'src str> {
        loop {
            match self.cursor.peek() {
                b'.' if self.cursor.peek_at(1) != b'.' => {
                    self.cursor.advance();
                    if !is_ident_start(self.cursor.peek()) {
                        let found = self.found();
                        self.syntax_error(format!(
                            "expected property name after `.`, found {found}"
                        ));
                        return None;
                    }
                    self.ident(false)?;
                }
                b'[' => {
                    self.expect_balanced(b'[', "index")?;
                }
                b'(' => {
                    self.expect_balanced(b'(', "argument list")?;
                }
                _ => break,
            }
        }
        let text = self.cursor.slice_from(start.offset());
        self.check_expression_len(text)?;
        Some(text)
    }

    /// Capture raw text from `start` to the next value boundary and wrap it
    /// as an expression value.
    fn capture_expression(&mut self, start: Checkpoint, ctx: ValueCtx) -> Option<ValueId> {
        let text = self.capture_text(start, ctx)?;
        let text = self.intern(text);
        Some(self.ast.alloc_value(Value::Expression(text)))
    }

    /// Raw text from `start` up to a boundary at bracket depth zero: a line
    /// break, `;`, `,`, an unmatched closer, or `{` in a header. A line
    /// ending in an operator continues onto the next line.
    pub(crate) fn capture_text(&mut self, start: Checkpoint, ctx: ValueCtx) -> Option<&'src str> {
        self.cursor.restore(start);
        let from = start.offset();
        let mut depth = 0u32;
        loop {
            match self.cursor.peek() {
                0 if self.cursor.is_eof() => break,
                quote @ (b'"' | b'\'' | b'`') => skip_quoted(&mut self.cursor, quote),
                b'/' if self.cursor.peek_at(1) == b'/' => break,
                b'/' if self.cursor.peek_at(1) == b'*' => {
                    self.cursor.skip_block_comment();
                }
                b'(' | b'[' => {
                    depth += 1;
                    self.cursor.advance();
                }
                b'{' if depth == 0 && ctx == ValueCtx::Header => break,
                b'{' => {
                    depth += 1;
                    self.cursor.advance();
                }
                b')' | b']' | b'}' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.cursor.advance();
                }
                b',' | b';' if depth == 0 => break,
                b'\n' if depth == 0 => {
                    if !self.continues_on_next_line(from) {
                        break;
                    }
                    self.cursor.advance();
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }

        let text = self.cursor.slice_from(from).trim();
        if text.is_empty() {
            let found = self.found();
            self.syntax_error(format!("expected an expression, found {found}"));
            return None;
        }
        self.check_expression_len(text)?;
        Some(text)
    }

    /// At a line break inside captured text: does the expression go on?
    fn continues_on_next_line(&self, from: u32) -> bool {
        let mut so_far = self.cursor.slice_from(from).trim_end();
        while so_far.ends_with("*/") {
            match so_far.rfind("/*") {
                Some(open) => so_far = so_far[..open].trim_end(),
                None => break,
            }
        }
        if so_far
            .bytes()
            .last()
            .is_some_and(|b| b"+-*/%&|<>=!?:,(".contains(&b))
        {
            return true;
        }
        starts_with_continuation(self.cursor.rest().trim_start())
    }

    fn check_expression_len(&mut self, text: &str) -> Option<()> {
        let limit = self.options.max_expression_len;
        if text.len() > limit {
            self.error(
                Category::BufferOverflow,
                format!("expression text is {} bytes, longer than {limit}", text.len()),
            );
            return None;
        }
        Some(())
    }

    /// Quoted string at the cursor, escapes resolved.
    pub(crate) fn parse_string_literal(&mut self) -> Option<String> {
        let start = self.cursor.checkpoint();
        match scan_string(&mut self.cursor) {
            Some(text) => Some(text),
            None => {
                self.cursor.restore(start);
                self.syntax_error("unterminated string literal");
                self.cursor.eat_while(|b| b != b'\n');
                None
            }
        }
    }

    /// `12`, `-3.5`, and `50%` when bare percentages are enabled.
    fn parse_number(&mut self) -> Option<ValueId> {
        let from = self.cursor.offset();
        self.cursor.match_byte(b'-');
        self.cursor.eat_while(|b| b.is_ascii_digit());
        if self.cursor.peek() == b'.' && self.cursor.peek_at(1).is_ascii_digit() {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit());
        }
        let text = self.cursor.slice_from(from);
        let Ok(value) = text.parse::<f64>() else {
            self.syntax_error(format!("invalid number literal `{text}`"));
            return None;
        };

        let mut is_percentage = false;
        if self.cursor.peek() == b'%' && !is_operand_start(self.cursor.peek_at(1)) {
            if !self.options.allow_bare_percent {
                self.syntax_error(format!(
                    "percentage `{text}%` must be written as a string: \"{text}%\""
                ));
                return None;
            }
            self.cursor.advance();
            is_percentage = true;
        }
        Some(self.ast.alloc_value(Value::Number {
            value,
            is_percentage,
        }))
    }

    /// `$name` is shorthand for `{name}`.
    fn parse_dollar(&mut self) -> Option<ValueId> {
        self.cursor.advance();
        if self.cursor.peek() == b'{' {
            return self.parse_expression_block();
        }
        let Some(name) = self.ident(false) else {
            let found = self.found();
            self.syntax_error(format!("expected variable name after `$`, found {found}"));
            return None;
        };
        let name = self.intern(name);
        Some(self.ast.alloc_value(Value::Expression(name)))
    }

    fn parse_array(&mut self) -> Option<ValueId> {
        let open = self.cursor.checkpoint();
        self.cursor.advance();
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.match_byte(b']') {
                break;
            }
            if items.len() == self.options.max_array_elements {
                let limit = self.options.max_array_elements;
                self.limit_exceeded("array literal", limit);
                self.skip_group(open, b'[');
                return None;
            }
            let Some(item) = self.parse_value(ValueCtx::Statement) else {
                self.skip_group(open, b'[');
                return None;
            };
            items.push(item);

            self.skip_trivia();
            if self.cursor.match_byte(b',') {
                continue;
            }
            if self.cursor.match_byte(b']') {
                break;
            }
            let found = self.found();
            self.syntax_error(format!("expected `,` or `]` in array literal, found {found}"));
            self.skip_group(open, b'[');
            return None;
        }
        let items = self.ast.alloc_values(&items);
        Some(self.ast.alloc_value(Value::Array(items)))
    }

    /// `{` in value position: object literal, empty object, or expression
    /// block, decided by looking for `key:` after the brace.
    fn parse_brace(&mut self) -> Option<ValueId> {
        let open = self.cursor.checkpoint();
        self.cursor.advance();
        self.skip_trivia();
        if self.cursor.match_byte(b'}') {
            return Some(self.ast.alloc_value(Value::Object(kry_ir::EntryRange::EMPTY)));
        }

        let mut is_object = match self.cursor.peek() {
            b'"' | b'\'' => scan_string(&mut self.cursor).is_some(),
            byte if is_ident_start(byte) => self.cursor.eat_identifier(true).is_some(),
            _ => false,
        };
        if is_object {
            self.skip_trivia();
            is_object = self.cursor.peek() == b':';
        }
        self.cursor.restore(open);

        if is_object {
            self.parse_object()
        } else {
            self.parse_expression_block()
        }
    }

    /// `{ expr }`: the trimmed interior becomes expression text.
    fn parse_expression_block(&mut self) -> Option<ValueId> {
        let (from, to) = self.expect_balanced(b'{', "expression block")?;
        let text = self.cursor.slice(from, to).trim();
        if text.is_empty() {
            self.syntax_error("empty expression block");
            return None;
        }
        self.check_expression_len(text)?;
        let text = self.intern(text);
        Some(self.ast.alloc_value(Value::Expression(text)))
    }

    fn parse_object(&mut self) -> Option<ValueId> {
        let open = self.cursor.checkpoint();
        self.cursor.advance();
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.match_byte(b'}') {
                break;
            }
            if entries.len() == self.options.max_object_entries {
                let limit = self.options.max_object_entries;
                self.limit_exceeded("object literal", limit);
                self.skip_group(open, b'{');
                return None;
            }
            let Some(entry) = self.parse_object_entry() else {
                self.skip_group(open, b'{');
                return None;
            };
            entries.push(entry);

            self.skip_trivia();
            if self.cursor.match_byte(b',') {
                continue;
            }
            if self.cursor.match_byte(b'}') {
                break;
            }
            let found = self.found();
            self.syntax_error(format!("expected `,` or `}}` in object literal, found {found}"));
            self.skip_group(open, b'{');
            return None;
        }
        let entries = self.ast.alloc_entries(&entries);
        Some(self.ast.alloc_value(Value::Object(entries)))
    }

    fn parse_object_entry(&mut self) -> Option<Entry> {
        let key = match self.cursor.peek() {
            b'"' | b'\'' => self.parse_string_literal()?,
            byte if is_ident_start(byte) => self.ident(true)?.to_owned(),
            _ => {
                let found = self.found();
                self.syntax_error(format!("expected object key, found {found}"));
                return None;
            }
        };
        self.expect(b':', &format!("`:` after key `{key}`"))?;
        let value = self.parse_value(ValueCtx::Statement)?;
        let key = self.intern(&key);
        Some(Entry { key, value })
    }

    /// Interior of a balanced group at the cursor, stepping over quoted
    /// text. `None` if the cursor is not on `open` or the group never closes.
    pub(crate) fn scan_balanced(&mut self, open: u8) -> Option<(u32, u32)> {
        let close = match open {
            b'(' => b')',
            b'[' => b']',
            b'{' => b'}',
            _ => return None,
        };
        if !self.cursor.match_byte(open) {
            return None;
        }
        let from = self.cursor.offset();
        let mut depth = 1u32;
        loop {
            match self.cursor.peek() {
                0 if self.cursor.is_eof() => return None,
                quote @ (b'"' | b'\'' | b'`') => skip_quoted(&mut self.cursor, quote),
                byte if byte == open => {
                    depth += 1;
                    self.cursor.advance();
                }
                byte if byte == close => {
                    depth -= 1;
                    if depth == 0 {
                        let to = self.cursor.offset();
                        self.cursor.advance();
                        return Some((from, to));
                    }
                    self.cursor.advance();
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// [`scan_balanced`](Self::scan_balanced), reporting an unclosed group.
    pub(crate) fn expect_balanced(&mut self, open: u8, what: &str) -> Option<(u32, u32)> {
        let start = self.cursor.checkpoint();
        if let Some(range) = self.scan_balanced(open) {
            return Some(range);
        }
        self.cursor.restore(start);
        let close = match open {
            b'(' => ')',
            b'[' => ']',
            _ => '}',
        };
        self.syntax_error(format!("unclosed {what}: missing `{close}`"));
        self.cursor.advance();
        None
    }

    /// After a failure inside a bracketed literal, move past the whole
    /// literal so statement recovery starts from a clean position.
    pub(crate) fn skip_group(&mut self, open: Checkpoint, byte: u8) {
        self.cursor.restore(open);
        if self.scan_balanced(byte).is_none() {
            self.cursor.restore(open);
            self.cursor.advance();
        }
    }
}
