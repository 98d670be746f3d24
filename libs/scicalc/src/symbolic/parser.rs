//! Parser for single-variable expressions
//!
//! Grammar (loosest first):
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary (('**' | '^') unary)?
//! primary := number | name | name '(' sum ')' | '(' sum ')'
//! ```
//!
//! Integer literals are exact rationals, literals with a point or exponent are
//! floats. The only names are `x`, `pi`, `E` and the elementary functions.

use super::expr::{self, Constant, Expr, Func, Number};
use crate::lexer::{Token, TokenCursor};
use errors::CalcResult;
use num_bigint::BigInt;
use num_rational::BigRational;

pub const ALLOWED_FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh", "exp", "log", "ln",
    "sqrt",
];

struct Parser<'a> {
    cursor: TokenCursor<'a>,
}

impl<'a> Parser<'a> {
    fn sum(&mut self) -> CalcResult<Expr> {
        let mut terms = vec![self.product()?];
        loop {
            if self.cursor.eat(&Token::Plus) {
                terms.push(self.product()?);
            } else if self.cursor.eat(&Token::Minus) {
                terms.push(expr::neg(self.product()?));
            } else {
                return Ok(expr::add(terms));
            }
        }
    }

    fn product(&mut self) -> CalcResult<Expr> {
        let mut value = self.unary()?;
        loop {
            match self.cursor.peek() {
                Some(Token::Star) => {
                    self.cursor.next_token();
                    value = expr::mul(vec![value, self.unary()?]);
                },
                Some(Token::Slash) => {
                    self.cursor.next_token();
                    value = expr::div(value, self.unary()?);
                },
                Some(op @ (Token::DoubleSlash | Token::Percent)) => {
                    let op = op.to_string();
                    return Err(self
                        .cursor
                        .error(format!("operator '{}' is not supported", op)));
                },
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> CalcResult<Expr> {
        self.cursor.descend()?;
        let value = self.signed();
        self.cursor.ascend();
        value
    }

    fn signed(&mut self) -> CalcResult<Expr> {
        if self.cursor.eat(&Token::Minus) {
            return Ok(expr::neg(self.unary()?));
        }
        if self.cursor.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> CalcResult<Expr> {
        let base = self.primary()?;
        if self.cursor.eat(&Token::DoubleStar) || self.cursor.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Ok(expr::pow(base, exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> CalcResult<Expr> {
        match self.cursor.next_token() {
            Some(Token::Number(text)) => self.number(&text),
            Some(Token::Ident(name)) => self.name(&name),
            Some(Token::LParen) => {
                let inner = self.sum()?;
                self.cursor.expect(&Token::RParen)?;
                Ok(inner)
            },
            Some(other) => Err(self
                .cursor
                .error(format!("unexpected '{}'", other))),
            None => Err(self.cursor.error("unexpected end of expression")),
        }
    }

    fn number(&self, text: &str) -> CalcResult<Expr> {
        let is_float = text.contains(['.', 'e', 'E']);
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| self.cursor.error(format!("invalid number '{}'", text)))?;
            return Ok(Expr::Num(Number::Float(value)));
        }
        let value: BigInt = text
            .parse()
            .map_err(|_| self.cursor.error(format!("invalid number '{}'", text)))?;
        Ok(Expr::Num(Number::Rational(BigRational::from_integer(value))))
    }

    fn name(&mut self, name: &str) -> CalcResult<Expr> {
        match name {
            "x" => return Ok(Expr::Var),
            "pi" => return Ok(Expr::Const(Constant::Pi)),
            "E" => return Ok(Expr::Const(Constant::E)),
            _ => {},
        }
        if !ALLOWED_FUNCTIONS.contains(&name) {
            return Err(self.cursor.error(format!(
                "unknown name '{}'; the only variable is 'x'",
                name
            )));
        }
        if !self.cursor.eat(&Token::LParen) {
            return Err(self.cursor.unexpected(&format!("'{}' must be called", name)));
        }
        let arg = self.sum()?;
        if self.cursor.peek() == Some(&Token::Comma) {
            return Err(self
                .cursor
                .error(format!("'{}' takes exactly one argument", name)));
        }
        self.cursor.expect(&Token::RParen)?;

        if name == "sqrt" {
            return Ok(expr::pow(arg, Expr::ratio(1, 2)));
        }
        match Func::from_name(name) {
            Some(f) => Ok(expr::func(f, arg)),
            None => Err(self.cursor.error(format!("unknown function '{}'", name))),
        }
    }
}

/// Parse an expression in `x` into canonical form
pub fn parse(source: &str) -> CalcResult<Expr> {
    let mut parser = Parser {
        cursor: TokenCursor::new(source)?,
    };
    if parser.cursor.is_at_end() {
        return Err(parser.cursor.error("expression is empty"));
    }
    let value = parser.sum()?;
    if !parser.cursor.is_at_end() {
        return Err(parser.cursor.unexpected("expected end of expression"));
    }
    Ok(value)
}
