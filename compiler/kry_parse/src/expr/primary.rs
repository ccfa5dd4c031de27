//! Primary and postfix expressions.

use kry_ir::{ArrowBody, ExprNode, Literal, TemplatePart};
use kry_lexer_core::{is_ident_continue, is_ident_start};

use super::{ExprParseError, ExprParser, ParseResult};
use crate::literal::scan_string;

impl<'src> ExprParser<'src> {
    /// Primary followed by any number of `.name`, `[index]` and `(args)`.
    pub(super) fn parse_postfix(&mut self) -> ParseResult {
        let mut expr = self.parse_primary()?;
        loop {
            self.skip_trivia();
            match self.cursor.peek() {
                b'.' if is_ident_start(self.cursor.peek_at(1)) => {
                    self.cursor.advance();
                    let property = self.ident("property name")?;
                    expr = ExprNode::PropertyAccess {
                        object: Box::new(expr),
                        property: property.to_owned(),
                    };
                }
                b'[' => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    self.expect("]", "`]` after index")?;
                    expr = match index {
                        ExprNode::Literal(Literal::String(member)) => ExprNode::Member {
                            object: Box::new(expr),
                            member,
                        },
                        index => ExprNode::ElementAccess {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                    };
                }
                b'(' => {
                    self.cursor.advance();
                    let args = self.parse_list(")", "`,` or `)` in call arguments")?;
                    expr = ExprNode::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult {
        self.skip_trivia();
        let start = self.cursor.offset();
        match self.cursor.peek() {
            b'0'..=b'9' => self.parse_number(),
            b'.' if self.cursor.peek_at(1).is_ascii_digit() => self.parse_number(),
            quote @ (b'"' | b'\'') => match scan_string(&mut self.cursor) {
                Some(text) => Ok(ExprNode::Literal(Literal::String(text))),
                None => Err(ExprParseError::Unterminated {
                    what: if quote == b'"' { "string" } else { "character string" },
                    offset: start,
                }),
            },
            b'`' => self.parse_template(),
            b'[' => {
                self.cursor.advance();
                let items = self.parse_list("]", "`,` or `]` in array")?;
                Ok(ExprNode::ArrayLit(items))
            }
            b'{' => self.parse_object(),
            b'(' => {
                if let Some(params) = self.try_arrow_params() {
                    return self.parse_arrow_body(params);
                }
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.expect(")", "`)` to close group")?;
                Ok(inner)
            }
            byte if is_ident_start(byte) => {
                let name = self.ident("expression")?;
                match name {
                    "true" => return Ok(ExprNode::Literal(Literal::Bool(true))),
                    "false" => return Ok(ExprNode::Literal(Literal::Bool(false))),
                    "null" | "undefined" => return Ok(ExprNode::Literal(Literal::Null)),
                    _ => {}
                }
                let after_name = self.cursor.checkpoint();
                self.skip_trivia();
                if self.cursor.match_str("=>") {
                    return self.parse_arrow_body(vec![name.to_owned()]);
                }
                self.cursor.restore(after_name);
                Ok(ExprNode::Identifier(name.to_owned()))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn ident(&mut self, expected: &'static str) -> Result<&'src str, ExprParseError> {
        match self.cursor.eat_identifier(false) {
            Some(name) => Ok(name),
            None => Err(self.unexpected(expected)),
        }
    }

    /// Comma separated expressions up to `close`; a trailing comma is allowed.
    fn parse_list(
        &mut self,
        close: &str,
        expected: &'static str,
    ) -> Result<Vec<ExprNode>, ExprParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.match_str(close) {
                return Ok(items);
            }
            items.push(self.parse_expr()?);
            self.skip_trivia();
            if self.cursor.match_byte(b',') {
                continue;
            }
            self.expect(close, expected)?;
            return Ok(items);
        }
    }

    /// Integer unless the literal has a fraction or exponent. Integers too
    /// large for `i64` become floats.
    fn parse_number(&mut self) -> ParseResult {
        let start = self.cursor.offset();
        let mut is_float = false;
        self.cursor.eat_while(|b| b.is_ascii_digit());
        if self.cursor.peek() == b'.' && self.cursor.peek_at(1).is_ascii_digit() {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit());
        }
        if matches!(self.cursor.peek(), b'e' | b'E') {
            let sign = usize::from(matches!(self.cursor.peek_at(1), b'+' | b'-'));
            if self.cursor.peek_at(1 + sign).is_ascii_digit() {
                is_float = true;
                for _ in 0..=sign {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|b| b.is_ascii_digit());
            }
        }
        if is_ident_continue(self.cursor.peek()) {
            self.cursor.eat_while(is_ident_continue);
            return Err(ExprParseError::InvalidNumber(
                self.cursor.slice_from(start).to_owned(),
            ));
        }

        let text = self.cursor.slice_from(start);
        if !is_float {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(ExprNode::Literal(Literal::Int(value)));
            }
        }
        text.parse::<f64>()
            .map(|value| ExprNode::Literal(Literal::Float(value)))
            .map_err(|_| ExprParseError::InvalidNumber(text.to_owned()))
    }

    /// `` `text ${expr} text` ``
    fn parse_template(&mut self) -> ParseResult {
        let start = self.cursor.offset();
        self.cursor.advance();
        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            if self.cursor.is_eof() {
                return Err(ExprParseError::Unterminated {
                    what: "template string",
                    offset: start,
                });
            }
            match self.cursor.peek() {
                b'`' => {
                    self.cursor.advance();
                    break;
                }
                b'$' if self.cursor.peek_at(1) == b'{' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    if !text.is_empty() {
                        parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                    }
                    let expr = self.parse_expr()?;
                    self.expect("}", "`}` to close template substitution")?;
                    parts.push(TemplatePart::Expr(expr));
                }
                b'\\' => {
                    self.cursor.advance();
                    let escaped = self.cursor.peek();
                    match escaped {
                        b'n' => text.push('\n'),
                        b't' => text.push('\t'),
                        b'r' => text.push('\r'),
                        b'`' | b'$' | b'\\' | b'"' | b'\'' => text.push(char::from(escaped)),
                        _ => {
                            text.push('\\');
                            continue;
                        }
                    }
                    self.cursor.advance();
                }
                _ => {
                    let from = self.cursor.offset();
                    self.cursor.advance_char();
                    text.push_str(self.cursor.slice_from(from));
                }
            }
        }
        if !text.is_empty() {
            parts.push(TemplatePart::Text(text));
        }
        Ok(ExprNode::Template(parts))
    }

    /// `{ key: value, "quoted": value, shorthand }`
    fn parse_object(&mut self) -> ParseResult {
        self.cursor.advance();
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.match_byte(b'}') {
                return Ok(ExprNode::ObjectLit(entries));
            }
            let key_start = self.cursor.offset();
            let key = match self.cursor.peek() {
                b'"' | b'\'' => scan_string(&mut self.cursor).ok_or(ExprParseError::Unterminated {
                    what: "object key",
                    offset: key_start,
                })?,
                _ => self.ident("object key")?.to_owned(),
            };
            self.skip_trivia();
            let value = if self.cursor.match_byte(b':') {
                self.parse_expr()?
            } else {
                ExprNode::Identifier(key.clone())
            };
            entries.push((key, value));
            self.skip_trivia();
            if self.cursor.match_byte(b',') {
                continue;
            }
            self.expect("}", "`,` or `}` in object")?;
            return Ok(ExprNode::ObjectLit(entries));
        }
    }

    /// `(a, b) =>` or `(a: int, b: string) =>` at the cursor. Type
    /// annotations are skipped. Consumes through `=>` on success and
    /// restores the cursor otherwise.
    fn try_arrow_params(&mut self) -> Option<Vec<String>> {
        let open = self.cursor.checkpoint();
        self.cursor.advance();
        let mut params = Vec::new();
        loop {
            self.skip_trivia();
            if self.cursor.match_byte(b')') {
                break;
            }
            let Some(name) = self.cursor.eat_identifier(false) else {
                self.cursor.restore(open);
                return None;
            };
            params.push(name.to_owned());
            self.skip_trivia();
            if self.cursor.match_byte(b':') {
                self.skip_trivia();
                if self.cursor.eat_identifier(false).is_none() {
                    self.cursor.restore(open);
                    return None;
                }
                self.skip_trivia();
            }
            if self.cursor.match_byte(b',') {
                continue;
            }
            if self.cursor.match_byte(b')') {
                break;
            }
            self.cursor.restore(open);
            return None;
        }
        self.skip_trivia();
        if self.cursor.match_str("=>") {
            Some(params)
        } else {
            self.cursor.restore(open);
            None
        }
    }

    /// Arrow body after `=>`: a raw `{ ... }` block or an expression.
    fn parse_arrow_body(&mut self, params: Vec<String>) -> ParseResult {
        self.skip_trivia();
        let start = self.cursor.offset();
        let body = if self.cursor.peek() == b'{' {
            let (from, to) =
                self.cursor
                    .skip_balanced(b'{')
                    .ok_or(ExprParseError::Unterminated {
                        what: "arrow function body",
                        offset: start,
                    })?;
            ArrowBody::Block(self.cursor.slice(from, to).trim().to_owned())
        } else {
            ArrowBody::Expr(Box::new(self.parse_expr()?))
        };
        Ok(ExprNode::ArrowFunc { params, body })
    }
}
