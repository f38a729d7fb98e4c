//! Tokenizer for arithmetic expressions.
//!
//! Recognizes:
//! - Decimal numbers (digits with at most one '.', no sign, no exponent)
//! - Identifiers ([a-z_][a-z0-9_]*, lowercased)
//! - Operators (+, -, *, /)
//! - Parentheses
//!
//! Whitespace is removed and the input lowercased before scanning. Characters
//! that start none of the above are skipped without error.

use std::iter::Peekable;
use std::str::Chars;

use tracing::trace;

use super::types::{Operator, Token};

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        self.position += 1;
        self.chars.next()
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let c = *self.chars.peek()?;
            let token = match c {
                '(' => {
                    self.advance();
                    Some(Token::LeftParen)
                }
                ')' => {
                    self.advance();
                    Some(Token::RightParen)
                }
                c if c.is_ascii_digit() => self.read_number(),
                c if c.is_ascii_alphabetic() || c == '_' => Some(self.read_identifier()),
                c => {
                    let pos = self.position;
                    self.advance();
                    match Operator::from_symbol(c) {
                        Some(op) => Some(Token::Operator(op)),
                        None => {
                            trace!(character = %c, position = pos, "dropping unrecognized input");
                            None
                        }
                    }
                }
            };

            if token.is_some() {
                return token;
            }
        }
    }

    fn read_number(&mut self) -> Option<Token> {
        let mut num_str = String::new();
        let mut has_dot = false;

        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                num_str.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num_str.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // Always digits with an optional single dot, so this cannot fail
        num_str.parse::<f64>().ok().map(Token::Number)
    }

    fn read_identifier(&mut self) -> Token {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::Identifier(name)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Strip all whitespace and lowercase
fn normalize(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Split an expression into tokens, in input order.
///
/// Never fails: unrecognized characters are dropped.
pub fn tokenize(expression: &str) -> Vec<Token> {
    let normalized = normalize(expression);
    Lexer::new(&normalized).collect()
}
