//! `//go:build` constraint lines.
//!
//! A constraint is a boolean expression over build tags: `!`, `&&`, `||`
//! and parentheses, tightest-binding first. A file whose constraint does not
//! evaluate to true against the satisfied-tag set is excluded from the
//! package. Legacy `// +build` lines are not recognized.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn build_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^//go:build\s+(.+)$").unwrap())
}

/// Extract the constraint expression from a Go source file, if any.
///
/// Per the Go spec the line must appear before the package clause; scanning
/// stops there.
pub fn constraint_of(source: &str) -> Option<String> {
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("package ") {
            break;
        }
        if let Some(caps) = build_line().captures(trimmed) {
            return Some(caps[1].trim().to_string());
        }
    }
    None
}

/// Evaluate a constraint expression against the satisfied-tag set.
///
/// Malformed expressions evaluate to false, excluding the file — the safe
/// direction for a read-only analysis.
pub fn evaluate(expr: &str, tags: &HashSet<String>) -> bool {
    let tokens = tokenize(expr);
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        tags,
    };
    match parser.or_expr() {
        Some(v) if parser.pos == tokens.len() => v,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '!' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '&' | '|' => {
                chars.next();
                if chars.next_if_eq(&c).is_some() {
                    tokens.push(if c == '&' { Token::And } else { Token::Or });
                }
            }
            _ => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if ident.is_empty() {
                    // Unknown character; force a parse failure.
                    chars.next();
                    tokens.push(Token::RParen);
                } else {
                    tokens.push(Token::Ident(ident));
                }
            }
        }
    }
    tokens
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    tags: &'a HashSet<String>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn or_expr(&mut self) -> Option<bool> {
        let mut value = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            value |= self.and_expr()?;
        }
        Some(value)
    }

    fn and_expr(&mut self) -> Option<bool> {
        let mut value = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            value &= self.unary()?;
        }
        Some(value)
    }

    fn unary(&mut self) -> Option<bool> {
        match self.peek()? {
            Token::Not => {
                self.pos += 1;
                Some(!self.unary()?)
            }
            Token::LParen => {
                self.pos += 1;
                let value = self.or_expr()?;
                if self.peek() == Some(&Token::RParen) {
                    self.pos += 1;
                    Some(value)
                } else {
                    None
                }
            }
            Token::Ident(name) => {
                let satisfied = self.tags.contains(name.as_str());
                self.pos += 1;
                Some(satisfied)
            }
            _ => None,
        }
    }
}
