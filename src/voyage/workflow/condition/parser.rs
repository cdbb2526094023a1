// SPDX-License-Identifier: MIT

//! Guard expression parser
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or_expr    := and_expr ("or" and_expr)*
//! and_expr   := unary ("and" unary)*
//! unary      := "not" unary | primary
//! primary    := "(" or_expr ")" | "true" | "false" | path (op literal)?
//! ```

use super::ast::{CompareOp, Expression, Literal};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("expected {expected}, found {found}")]
    Unexpected { expected: String, found: String },
    #[error("empty expression")]
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Path(String),
    Str(String),
    Num(f64),
    Op(CompareOp),
    And,
    Or,
    Not,
    True,
    False,
    Null,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Path(p) => format!("'{}'", p),
            Token::Str(s) => format!("'{}'", s),
            Token::Num(n) => n.to_string(),
            Token::Op(op) => op.to_string(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::Not => "not".to_string(),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::Null => "null".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

/// Parse a guard expression string into an AST
pub fn parse(input: &str) -> Result<Expression, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(ParseError::Unexpected {
            expected: "end of expression".to_string(),
            found: tok.describe(),
        }),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '\'' | '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == c => break,
                        Some(ch) => s.push(ch),
                        None => return Err(ParseError::UnterminatedString),
                    }
                }
                tokens.push(Token::Str(s));
            }
            '=' | '!' | '<' | '>' => {
                chars.next();
                let eq = chars.next_if_eq(&'=').is_some();
                let op = match (c, eq) {
                    ('=', true) => CompareOp::Eq,
                    ('!', true) => CompareOp::NotEq,
                    ('<', true) => CompareOp::Lte,
                    ('>', true) => CompareOp::Gte,
                    ('<', false) => CompareOp::Lt,
                    ('>', false) => CompareOp::Gt,
                    _ => return Err(ParseError::UnexpectedChar(c)),
                };
                tokens.push(Token::Op(op));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut s = String::new();
                while let Some(ch) = chars.next_if(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-') {
                    s.push(ch);
                }
                let n = s.parse::<f64>().map_err(|_| ParseError::UnexpectedChar(c))?;
                tokens.push(Token::Num(n));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut word = String::new();
                while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == '.') {
                    word.push(ch);
                }
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    "contains" => Token::Op(CompareOp::Contains),
                    _ => Token::Path(word),
                });
            }
            other => return Err(ParseError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn unexpected(expected: &str, found: Option<Token>) -> ParseError {
        ParseError::Unexpected {
            expected: expected.to_string(),
            found: found
                .map(|t| t.describe())
                .unwrap_or_else(|| "end of expression".to_string()),
        }
    }

    fn or_expr(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and_expr()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.unary()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(Expression::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.or_expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    other => Err(Self::unexpected(")", other)),
                }
            }
            Some(Token::True) => Ok(Expression::True),
            Some(Token::False) => Ok(Expression::False),
            Some(Token::Path(path)) => {
                let Some(Token::Op(op)) = self.peek().cloned() else {
                    return Ok(Expression::Truthy(path));
                };
                self.pos += 1;
                let right = self.literal()?;
                Ok(Expression::Compare {
                    left: path,
                    op,
                    right,
                })
            }
            other => Err(Self::unexpected("a field path or '('", other)),
        }
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Literal::String(s)),
            Some(Token::Num(n)) => Ok(Literal::Number(n)),
            Some(Token::True) => Ok(Literal::Boolean(true)),
            Some(Token::False) => Ok(Literal::Boolean(false)),
            Some(Token::Null) => Ok(Literal::Null),
            other => Err(Self::unexpected("a literal", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare(left: &str, op: CompareOp, right: Literal) -> Expression {
        Expression::Compare {
            left: left.to_string(),
            op,
            right,
        }
    }

    #[test]
    fn test_parse_boolean_comparison() {
        assert_eq!(
            parse("requirements_complete == false").unwrap(),
            compare(
                "requirements_complete",
                CompareOp::Eq,
                Literal::Boolean(false)
            )
        );
    }

    #[test]
    fn test_parse_empty_string_literal() {
        assert_eq!(
            parse("interruption_message != ''").unwrap(),
            compare(
                "interruption_message",
                CompareOp::NotEq,
                Literal::String(String::new())
            )
        );
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!(
            parse("score >= 5").unwrap(),
            compare("score", CompareOp::Gte, Literal::Number(5.0))
        );
        assert_eq!(
            parse("score<-1.5").unwrap(),
            compare("score", CompareOp::Lt, Literal::Number(-1.5))
        );
        assert_eq!(
            parse("tags contains \"beach\"").unwrap(),
            compare("tags", CompareOp::Contains, Literal::String("beach".into()))
        );
        assert_eq!(
            parse("itinerary == null").unwrap(),
            compare("itinerary", CompareOp::Eq, Literal::Null)
        );
    }

    #[test]
    fn test_parse_truthy_and_not() {
        assert_eq!(
            parse("not requirements_complete").unwrap(),
            Expression::Not(Box::new(Expression::Truthy(
                "requirements_complete".to_string()
            )))
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a or b and c").unwrap();
        assert_eq!(
            expr,
            Expression::Or(
                Box::new(Expression::Truthy("a".into())),
                Box::new(Expression::And(
                    Box::new(Expression::Truthy("b".into())),
                    Box::new(Expression::Truthy("c".into()))
                ))
            )
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse("(a or b) and c").unwrap();
        assert!(matches!(expr, Expression::And(_, _)));
    }

    #[test]
    fn test_dotted_paths() {
        assert_eq!(
            parse("requirements.missing_info.question == ''").unwrap(),
            compare(
                "requirements.missing_info.question",
                CompareOp::Eq,
                Literal::String(String::new())
            )
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("a == 'x"), Err(ParseError::UnterminatedString));
        assert!(matches!(parse("a == "), Err(ParseError::Unexpected { .. })));
        assert!(matches!(parse("(a"), Err(ParseError::Unexpected { .. })));
        assert!(matches!(parse("a b"), Err(ParseError::Unexpected { .. })));
        assert_eq!(parse("a = 1"), Err(ParseError::UnexpectedChar('=')));
        assert_eq!(parse("a @ 1"), Err(ParseError::UnexpectedChar('@')));
    }
}
