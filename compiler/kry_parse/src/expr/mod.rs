//! Expression-AST parser.
//!
//! Structures captured expression text into an [`ExprNode`] tree.
//!
//! # Precedence (lowest to highest)
//!
//! 1. assignment `=` (parsed, rejected later by conversion)
//! 2. conditional `?:` (right associative)
//! 3. `||`
//! 4. `&&`
//! 5. `==` `!=`
//! 6. `<` `>` `<=` `>=`
//! 7. `+` `-`
//! 8. `*` `/` `%`
//! 9. unary `!` `-` `typeof`
//! 10. postfix `.name`, `[index]`, `(args)`
//!
//! # Module Structure
//!
//! - `mod.rs`: entry point and the binary operator precedence chain
//! - `primary.rs`: literals, identifiers, groups, arrows, templates, postfix

mod primary;

use kry_ir::{BinaryOp, ExprNode, UnaryOp};
use kry_lexer_core::SourceCursor;
use kry_stack::{ensure_sufficient_stack, NestingBudget, DEFAULT_MAX_NESTING};
use tracing::trace;

/// Why captured text is not a well-formed expression.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExprParseError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unexpected `{found}` at offset {offset}, expected {expected}")]
    Unexpected {
        found: char,
        offset: u32,
        expected: &'static str,
    },
    #[error("unterminated {what} starting at offset {offset}")]
    Unterminated { what: &'static str, offset: u32 },
    #[error("invalid number literal `{0}`")]
    InvalidNumber(String),
    #[error("expression nested deeper than {0} levels")]
    TooDeep(u32),
}

type ParseResult = Result<ExprNode, ExprParseError>;

/// Parse a complete expression. Trailing input is an error.
pub fn parse_expression(text: &str) -> Result<ExprNode, ExprParseError> {
    let mut parser = ExprParser::new(text);
    parser.skip_trivia();
    if parser.cursor.is_eof() {
        return Err(ExprParseError::Empty);
    }
    let expr = parser.parse_expr()?;
    parser.skip_trivia();
    if !parser.cursor.is_eof() {
        return Err(parser.unexpected("end of expression"));
    }
    trace!(%expr, "parsed expression");
    Ok(expr)
}

struct ExprParser<'src> {
    cursor: SourceCursor<'src>,
    nesting: NestingBudget,
}

impl<'src> ExprParser<'src> {
    fn new(text: &'src str) -> Self {
        ExprParser {
            cursor: SourceCursor::new(text),
            nesting: NestingBudget::new(DEFAULT_MAX_NESTING),
        }
    }

    #[inline]
    fn skip_trivia(&mut self) {
        self.cursor.skip_whitespace_and_comments();
    }

    /// Error for the current position.
    fn unexpected(&self, expected: &'static str) -> ExprParseError {
        match self.cursor.rest().chars().next() {
            Some(found) => ExprParseError::Unexpected {
                found,
                offset: self.cursor.offset(),
                expected,
            },
            None => ExprParseError::UnexpectedEnd { expected },
        }
    }

    /// Consume `token` after trivia, or fail.
    fn expect(&mut self, token: &str, expected: &'static str) -> Result<(), ExprParseError> {
        self.skip_trivia();
        if self.cursor.match_str(token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Consume `op` unless it is the prefix of a longer operator in `not`.
    fn eat_op(&mut self, op: &str, not: &[&str]) -> bool {
        self.skip_trivia();
        let rest = self.cursor.rest();
        if !rest.starts_with(op) || not.iter().any(|longer| rest.starts_with(longer)) {
            return false;
        }
        self.cursor.match_str(op)
    }

    /// Parse an expression.
    ///
    /// Uses `ensure_sufficient_stack` and a nesting budget so deeply nested
    /// input fails cleanly.
    fn parse_expr(&mut self) -> ParseResult {
        if !self.nesting.enter() {
            return Err(ExprParseError::TooDeep(self.nesting.limit()));
        }
        let result = ensure_sufficient_stack(|| self.parse_assignment());
        self.nesting.exit();
        result
    }

    /// `target = value`, right associative.
    fn parse_assignment(&mut self) -> ParseResult {
        let target = self.parse_conditional()?;
        if self.eat_op("=", &["==", "=>"]) {
            let value = self.parse_expr()?;
            return Ok(ExprNode::binary(BinaryOp::Assign, target, value));
        }
        Ok(target)
    }

    /// `cond ? a : b`, right associative.
    fn parse_conditional(&mut self) -> ParseResult {
        let condition = self.parse_or()?;
        if !self.eat_op("?", &[]) {
            return Ok(condition);
        }
        let then_expr = self.parse_nested_conditional()?;
        self.expect(":", "`:` in conditional expression")?;
        let else_expr = self.parse_nested_conditional()?;
        Ok(ExprNode::Conditional {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    fn parse_nested_conditional(&mut self) -> ParseResult {
        if !self.nesting.enter() {
            return Err(ExprParseError::TooDeep(self.nesting.limit()));
        }
        let result = ensure_sufficient_stack(|| self.parse_conditional());
        self.nesting.exit();
        result
    }

    /// Parse `||` (lowest precedence binary).
    fn parse_or(&mut self) -> ParseResult {
        let mut left = self.parse_and()?;
        while self.eat_op("||", &[]) {
            let right = self.parse_and()?;
            left = ExprNode::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    /// Parse `&&`.
    fn parse_and(&mut self) -> ParseResult {
        let mut left = self.parse_equality()?;
        while self.eat_op("&&", &[]) {
            let right = self.parse_equality()?;
            left = ExprNode::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    /// Parse `==` and `!=`. `===` and `!==` are accepted as spellings of
    /// the same operators.
    fn parse_equality(&mut self) -> ParseResult {
        let mut left = self.parse_comparison()?;
        while let Some(op) = self.match_equality_op() {
            let right = self.parse_comparison()?;
            left = ExprNode::binary(op, left, right);
        }
        Ok(left)
    }

    fn match_equality_op(&mut self) -> Option<BinaryOp> {
        if self.eat_op("===", &[]) || self.eat_op("==", &[]) {
            Some(BinaryOp::Eq)
        } else if self.eat_op("!==", &[]) || self.eat_op("!=", &[]) {
            Some(BinaryOp::NotEq)
        } else {
            None
        }
    }

    /// Parse comparison operators (`<`, `>`, `<=`, `>=`).
    fn parse_comparison(&mut self) -> ParseResult {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.match_comparison_op() {
            let right = self.parse_additive()?;
            left = ExprNode::binary(op, left, right);
        }
        Ok(left)
    }

    fn match_comparison_op(&mut self) -> Option<BinaryOp> {
        if self.eat_op("<=", &[]) {
            Some(BinaryOp::LtEq)
        } else if self.eat_op(">=", &[]) {
            Some(BinaryOp::GtEq)
        } else if self.eat_op("<", &[]) {
            Some(BinaryOp::Lt)
        } else if self.eat_op(">", &[]) {
            Some(BinaryOp::Gt)
        } else {
            None
        }
    }

    fn parse_additive(&mut self) -> ParseResult {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.eat_op("+", &[]) {
                BinaryOp::Add
            } else if self.eat_op("-", &[]) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = ExprNode::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.eat_op("*", &[]) {
                BinaryOp::Mul
            } else if self.eat_op("/", &["//", "/*"]) {
                BinaryOp::Div
            } else if self.eat_op("%", &[]) {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = ExprNode::binary(op, left, right);
        }
        Ok(left)
    }

    /// Prefix operators, right recursive.
    fn parse_unary(&mut self) -> ParseResult {
        self.skip_trivia();
        let op = if self.eat_op("!", &["!="]) {
            UnaryOp::Not
        } else if self.eat_op("-", &[]) {
            UnaryOp::Neg
        } else if self.cursor.at_keyword("typeof") {
            self.cursor.match_str("typeof");
            UnaryOp::TypeOf
        } else {
            return self.parse_postfix();
        };

        if !self.nesting.enter() {
            return Err(ExprParseError::TooDeep(self.nesting.limit()));
        }
        let operand = ensure_sufficient_stack(|| self.parse_unary());
        self.nesting.exit();
        Ok(ExprNode::unary(op, operand?))
    }
}
