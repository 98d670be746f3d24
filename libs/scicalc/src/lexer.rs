//! Tokenizer shared by the arithmetic evaluator and the symbolic parser

use errors::{CalcError, CalcResult};
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Longest accepted token stream
pub const MAX_TOKENS: usize = 4096;
/// Deepest accepted nesting of parentheses, calls and unary or power operands
pub const MAX_NESTING: usize = 200;

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Decimal literal: 12, 1.5, .5, 3., 1e-3
    #[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("**")]
    DoubleStar,

    #[token("/")]
    Slash,

    #[token("//")]
    DoubleSlash,

    #[token("%")]
    Percent,

    #[token("^")]
    Caret,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::DoubleStar => write!(f, "**"),
            Token::Slash => write!(f, "/"),
            Token::DoubleSlash => write!(f, "//"),
            Token::Percent => write!(f, "%"),
            Token::Caret => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Token with its byte span in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Tokenize the whole input, failing on the first character no token matches
pub fn tokenize(source: &str) -> CalcResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(_) if tokens.len() == MAX_TOKENS => {
                return Err(CalcError::invalid_expression(
                    source,
                    format!("expression is too long (more than {} tokens)", MAX_TOKENS),
                ));
            },
            Ok(token) => tokens.push(Spanned { token, span }),
            Err(()) => {
                let bad = source.get(span.clone()).unwrap_or("?");
                return Err(CalcError::invalid_expression(
                    source,
                    format!("unexpected character '{}' at position {}", bad, span.start),
                ));
            },
        }
    }
    Ok(tokens)
}

/// Cursor over a token stream, used by both recursive-descent parsers
pub(crate) struct TokenCursor<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(source: &'a str) -> CalcResult<Self> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
            depth: 0,
        })
    }

    /// Enter one nesting level; fails past [`MAX_NESTING`]
    pub fn descend(&mut self) -> CalcResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!(
                "expression is nested more than {} levels deep",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the next token if it equals `expected`
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, expected: &Token) -> CalcResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected '{}'", expected)))
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Build an error describing the token at the cursor
    pub fn unexpected(&self, wanted: &str) -> CalcError {
        let reason = match self.tokens.get(self.pos) {
            Some(s) => format!("{}, found '{}' at position {}", wanted, s.token, s.span.start),
            None => format!("{}, found end of input", wanted),
        };
        self.error(reason)
    }

    pub fn error(&self, reason: impl Into<String>) -> CalcError {
        CalcError::invalid_expression(self.source, reason)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_operators_prefer_longest_match() {
        assert_eq!(
            kinds("2 ** 3 // 4 * 5"),
            vec![
                Token::Number("2".into()),
                Token::DoubleStar,
                Token::Number("3".into()),
                Token::DoubleSlash,
                Token::Number("4".into()),
                Token::Star,
                Token::Number("5".into()),
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(
            kinds("1.5 .5 3. 1e-3"),
            vec![
                Token::Number("1.5".into()),
                Token::Number(".5".into()),
                Token::Number("3.".into()),
                Token::Number("1e-3".into()),
            ]
        );
    }

    #[test]
    fn test_identifiers_and_calls() {
        assert_eq!(
            kinds("sqrt(x)"),
            vec![
                Token::Ident("sqrt".into()),
                Token::LParen,
                Token::Ident("x".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_token_limit() {
        assert_eq!(kinds(&"1+".repeat(100)).len(), 200);
        let err = tokenize(&"1+".repeat(MAX_TOKENS)).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn test_nesting_limit() {
        let mut cursor = TokenCursor::new("1").unwrap();
        for _ in 0..MAX_NESTING {
            cursor.descend().unwrap();
        }
        assert!(matches!(
            cursor.descend(),
            Err(CalcError::InvalidExpression { .. })
        ));
        cursor.ascend();
        assert!(cursor.descend().is_ok());
    }

    #[test]
    fn test_rejects_unknown_character() {
        let err = tokenize("2 + $").unwrap_err();
        assert!(err.to_string().contains("'$'"));
        assert!(tokenize("os.system('x')").is_err());
    }
}
