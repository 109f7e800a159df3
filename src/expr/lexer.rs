//! Lexer for attribute expressions using logos

use logos::Logos;

use crate::error::ParseError;
use crate::expr::ast::Span;
use crate::layout::Rational;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(".")]
    Dot,

    // Literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Decimal literal converted exactly; too large a literal fails to lex
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| Rational::parse_decimal(lex.slice()))]
    Number(Rational),
}

/// Lex input string into tokens with spans
///
/// Unrecognised characters and number literals too large to represent
/// exactly are errors.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| match tok {
            Ok(tok) => Ok((tok, span)),
            Err(_) => {
                let text = &input[span.clone()];
                let message = if text.starts_with(|c: char| c.is_ascii_digit()) {
                    format!("Number literal {} is out of range", text)
                } else {
                    format!("Unexpected character '{}'", text)
                };
                Err(ParseError::Syntax {
                    message,
                    span,
                    expected: Vec::new(),
                })
            }
        })
        .collect()
}
