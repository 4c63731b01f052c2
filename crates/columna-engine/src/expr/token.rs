//! Tokenizer for the expression language.
//!
//! Tokens carry byte spans into the source so error messages can point at
//! the offending input and so identifier substitution can splice new names
//! into the original text without disturbing spacing.

use crate::error::{ExprError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `**`, Python-style exponentiation.
    StarStar,
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

fn parse_err(offset: usize, message: impl Into<String>) -> ExprError {
    ExprError::Parse {
        offset,
        message: message.into(),
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i: usize = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if b == b'*' && bytes.get(i + 1) == Some(&b'*') {
            tokens.push(Token {
                kind: TokenKind::StarStar,
                span: Span {
                    start: i,
                    end: i + 2,
                },
            });
            i += 2;
            continue;
        }

        let start = i;
        let kind = match b {
            b'+' => {
                i += 1;
                TokenKind::Plus
            }
            b'-' => {
                i += 1;
                TokenKind::Minus
            }
            b'*' => {
                i += 1;
                TokenKind::Star
            }
            b'/' => {
                i += 1;
                TokenKind::Slash
            }
            b'%' => {
                i += 1;
                TokenKind::Percent
            }
            b'(' => {
                i += 1;
                TokenKind::LParen
            }
            b')' => {
                i += 1;
                TokenKind::RParen
            }
            b',' => {
                i += 1;
                TokenKind::Comma
            }
            _ if b.is_ascii_digit() || b == b'.' => {
                i += 1;
                while i < bytes.len() {
                    let c = bytes[i];
                    if c.is_ascii_digit() || c == b'.' || c == b'e' || c == b'E' {
                        i += 1;
                        continue;
                    }
                    // Exponent sign, as in 1.5e-3.
                    if (c == b'+' || c == b'-') && matches!(bytes[i - 1], b'e' | b'E') {
                        i += 1;
                        continue;
                    }
                    break;
                }
                let s = &input[start..i];
                let n: f64 = s
                    .parse()
                    .map_err(|_| parse_err(start, format!("invalid number: '{s}'")))?;
                TokenKind::Num(n)
            }
            _ if b.is_ascii_alphabetic() || b == b'_' => {
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                TokenKind::Ident(input[start..i].to_string())
            }
            _ => {
                let ch = input[i..].chars().next().unwrap_or('?');
                return Err(parse_err(i, format!("unexpected character: '{ch}'")));
            }
        };

        tokens.push(Token {
            kind,
            span: Span { start, end: i },
        });
    }

    Ok(tokens)
}
