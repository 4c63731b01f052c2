//! Recursive-descent parser producing the restricted expression AST.
//!
//! The AST is the sandbox boundary: only numbers, names, unary/binary
//! arithmetic, and calls to allow-listed functions exist. Anything else in
//! the input fails here, before any evaluation happens.
//!
//! Precedence and associativity follow Python: `**` is right-associative
//! and binds tighter than a leading unary minus, so `-x ** 2` is
//! `-(x ** 2)` and `2 ** 3 ** 2` is `2 ** (3 ** 2)`.

use crate::builtins::Func;
use crate::error::{ExprError, Result};

use super::token::{Span, Token, TokenKind, tokenize};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Name(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

/// Parse an expression string into its AST.
pub fn parse(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(input, &tokens);
    let expr = parser.parse_add()?;
    if let Some(t) = parser.peek() {
        return Err(parser.err(t.span, format!("unexpected token {:?}", t.kind)));
    }
    Ok(expr)
}

struct Parser<'a> {
    input: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn err(&self, span: Span, message: String) -> ExprError {
        ExprError::Parse {
            offset: span.start,
            message,
        }
    }

    fn end_err(&self, message: &str) -> ExprError {
        ExprError::Parse {
            offset: self.input.len(),
            message: message.to_string(),
        }
    }

    fn parse_add(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                Some(TokenKind::Percent) => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Minus) => {
                self.advance();
                let e = self.parse_unary()?;
                Ok(Expr::Neg(Box::new(e)))
            }
            Some(TokenKind::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_atom()?;
        if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::StarStar)) {
            self.advance();
            // Right-associative, and the exponent may carry a unary sign:
            // 2 ** -3 is valid.
            let exp = self.parse_unary()?;
            Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exp)))
        } else {
            Ok(base)
        }
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Num(n),
                ..
            }) => Ok(Expr::Number(n)),
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => {
                if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::LParen)) {
                    self.advance();
                    let args = self.parse_args()?;
                    let func = Func::from_name(&name)
                        .ok_or_else(|| ExprError::UnknownFunction(name.clone()))?;
                    if args.len() != func.arity() {
                        return Err(ExprError::WrongArity {
                            name: func.name(),
                            expected: func.arity(),
                            got: args.len(),
                        });
                    }
                    Ok(Expr::Call(func, args))
                } else {
                    Ok(Expr::Name(name))
                }
            }
            Some(Token {
                kind: TokenKind::LParen,
                ..
            }) => {
                let e = self.parse_add()?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(e),
                    Some(t) => Err(self.err(t.span, format!("expected ')', got {:?}", t.kind))),
                    None => Err(self.end_err("expected ')', got end of input")),
                }
            }
            Some(t) => Err(self.err(t.span, format!("unexpected token {:?}", t.kind))),
            None => Err(self.end_err("unexpected end of expression")),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::RParen)) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_add()?);
            match self.advance() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => return Ok(args),
                Some(t) => {
                    return Err(self.err(t.span, format!("expected ',' or ')', got {:?}", t.kind)));
                }
                None => return Err(self.end_err("expected ')', got end of input")),
            }
        }
    }
}
