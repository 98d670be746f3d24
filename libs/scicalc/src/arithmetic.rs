//! Safe arithmetic expression evaluator
//!
//! Expressions are parsed into [`Node`], whose variants are exactly the allowed
//! operators and functions; nothing else can be represented, so nothing else can
//! be evaluated. Precedence and semantics follow the conventional Python rules:
//!
//! - `**` is right-associative and binds tighter than a unary minus on its left (`-2**2 == -4`)
//! - `%` takes the sign of the divisor (`-7 % 3 == 2`)
//! - `//` and `^` are rejected rather than silently reinterpreted

use crate::lexer::{Token, TokenCursor};
use errors::{CalcError, CalcResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Functions callable from an arithmetic expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Abs,
    Pow,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Self::Sqrt),
            "abs" => Some(Self::Abs),
            "pow" => Some(Self::Pow),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Pow => "pow",
        }
    }

    fn arity(self) -> usize {
        match self {
            Self::Sqrt | Self::Abs => 1,
            Self::Pow => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

/// Restricted expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Function, Vec<Node>),
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    cursor: TokenCursor<'a>,
}

impl<'a> Parser<'a> {
    fn parse(source: &'a str) -> CalcResult<Node> {
        let mut parser = Self {
            cursor: TokenCursor::new(source)?,
        };
        let node = parser.sum()?;
        if !parser.cursor.is_at_end() {
            return Err(parser.cursor.unexpected("expected an operator"));
        }
        Ok(node)
    }

    // sum := product (('+' | '-') product)*
    fn sum(&mut self) -> CalcResult<Node> {
        let mut left = self.product()?;
        loop {
            let op = match self.cursor.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.cursor.next_token();
            let right = self.product()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    // product := unary (('*' | '/' | '%') unary)*
    fn product(&mut self) -> CalcResult<Node> {
        let mut left = self.unary()?;
        loop {
            let op = match self.cursor.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                Some(Token::DoubleSlash) => {
                    return Err(self.cursor.error("operator '//' is not allowed"))
                },
                Some(Token::Caret) => return Err(self.cursor.error("operator '^' is not allowed")),
                _ => return Ok(left),
            };
            self.cursor.next_token();
            let right = self.unary()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    // unary := ('+' | '-') unary | power
    fn unary(&mut self) -> CalcResult<Node> {
        self.cursor.descend()?;
        let node = self.signed();
        self.cursor.ascend();
        node
    }

    fn signed(&mut self) -> CalcResult<Node> {
        let op = match self.cursor.peek() {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.power(),
        };
        self.cursor.next_token();
        Ok(Node::Unary(op, Box::new(self.unary()?)))
    }

    // power := primary ('**' unary)?
    fn power(&mut self) -> CalcResult<Node> {
        let base = self.primary()?;
        if self.cursor.eat(&Token::DoubleStar) {
            let exponent = self.unary()?;
            return Ok(Node::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> CalcResult<Node> {
        match self.cursor.next_token() {
            Some(Token::Number(text)) => text
                .parse::<f64>()
                .map(Node::Number)
                .map_err(|_| self.cursor.error(format!("invalid number literal '{}'", text))),
            Some(Token::LParen) => {
                let inner = self.sum()?;
                self.cursor.expect(&Token::RParen)?;
                Ok(inner)
            },
            Some(Token::Ident(name)) => self.call(&name),
            Some(other) => Err(self
                .cursor
                .error(format!("unexpected '{}' where a value was expected", other))),
            None => Err(self.cursor.error("unexpected end of expression")),
        }
    }

    fn call(&mut self, name: &str) -> CalcResult<Node> {
        if self.cursor.peek() != Some(&Token::LParen) {
            return Err(self.cursor.error(format!("name '{}' is not allowed", name)));
        }
        let function = Function::from_name(name)
            .ok_or_else(|| self.cursor.error(format!("function '{}' is not allowed", name)))?;
        self.cursor.expect(&Token::LParen)?;

        let mut args = Vec::new();
        if !self.cursor.eat(&Token::RParen) {
            loop {
                args.push(self.sum()?);
                if self.cursor.eat(&Token::Comma) {
                    continue;
                }
                self.cursor.expect(&Token::RParen)?;
                break;
            }
        }

        if args.len() != function.arity() {
            return Err(self.cursor.error(format!(
                "{}() takes exactly {} argument(s) ({} given)",
                function.name(),
                function.arity(),
                args.len()
            )));
        }
        Ok(Node::Call(function, args))
    }
}

/// Parse an expression into the restricted tree without evaluating it
pub fn parse(expression: &str) -> CalcResult<Node> {
    Parser::parse(expression)
}

// ============================================================================
// Evaluation
// ============================================================================

fn power(base: f64, exponent: f64, expression: &str) -> CalcResult<f64> {
    if base == 0.0 && exponent < 0.0 {
        return Err(CalcError::division_by_zero(expression));
    }
    Ok(base.powf(exponent))
}

fn eval_node(node: &Node, expression: &str) -> CalcResult<f64> {
    match node {
        Node::Number(value) => Ok(*value),
        Node::Unary(op, operand) => {
            let value = eval_node(operand, expression)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Neg => -value,
            })
        },
        Node::Binary(op, left, right) => {
            let l = eval_node(left, expression)?;
            let r = eval_node(right, expression)?;
            match op {
                BinaryOp::Add => Ok(l + r),
                BinaryOp::Sub => Ok(l - r),
                BinaryOp::Mul => Ok(l * r),
                BinaryOp::Div => {
                    if r == 0.0 {
                        return Err(CalcError::division_by_zero(expression));
                    }
                    Ok(l / r)
                },
                BinaryOp::Mod => {
                    if r == 0.0 {
                        return Err(CalcError::division_by_zero(expression));
                    }
                    let m = l % r;
                    // Result takes the sign of the divisor
                    if m != 0.0 && (m < 0.0) != (r < 0.0) {
                        Ok(m + r)
                    } else {
                        Ok(m)
                    }
                },
                BinaryOp::Pow => power(l, r, expression),
            }
        },
        Node::Call(function, args) => {
            let values = args
                .iter()
                .map(|arg| eval_node(arg, expression))
                .collect::<CalcResult<Vec<f64>>>()?;
            match (function, values.as_slice()) {
                (Function::Sqrt, [v]) => {
                    if *v < 0.0 {
                        return Err(CalcError::outside_domain("sqrt", *v));
                    }
                    Ok(v.sqrt())
                },
                (Function::Abs, [v]) => Ok(v.abs()),
                (Function::Pow, [b, e]) => power(*b, *e, expression),
                _ => Err(CalcError::invalid_expression(
                    expression,
                    format!("wrong number of arguments to {}()", function.name()),
                )),
            }
        },
    }
}

/// Evaluate an arithmetic expression to a finite float
pub fn evaluate_arithmetic(expression: &str) -> CalcResult<f64> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(CalcError::EmptyExpression);
    }

    let tree = parse(trimmed)?;
    let result = eval_node(&tree, trimmed)?;
    if !result.is_finite() {
        return Err(CalcError::non_finite(format!(
            "'{}' evaluates to {}",
            trimmed, result
        )));
    }

    debug!(expression = trimmed, result, "arithmetic evaluated");
    Ok(result)
}

// ============================================================================
// Request / response
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ArithmeticRequest {
    /// Arithmetic expression, e.g. `2 * (3 + 5)`
    pub expression: String,
}

impl ArithmeticRequest {
    pub fn validate(&self) -> CalcResult<()> {
        if self.expression.trim().is_empty() {
            return Err(CalcError::EmptyExpression);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ArithmeticResponse {
    pub result: f64,
    pub expression: String,
}

/// Validate, evaluate and echo an arithmetic request
pub fn evaluate(request: &ArithmeticRequest) -> CalcResult<ArithmeticResponse> {
    request.validate()?;
    let result = evaluate_arithmetic(&request.expression)?;
    Ok(ArithmeticResponse {
        result,
        expression: request.expression.clone(),
    })
}
