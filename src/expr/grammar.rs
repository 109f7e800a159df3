//! Expression parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::expr::ast::*;
use crate::expr::lexer::{self, Token};
use crate::expr::ExprLimits;

/// Parse an attribute expression into an AST
///
/// Grammar, loosest binding first:
///
/// ```text
/// sum     := product (('+' | '-') product)*
/// product := unary (('*' | '/') unary)*
/// unary   := '-'? atom
/// atom    := number | reference | '(' sum ')'
/// reference := ident ('.' ident)+
/// ```
pub fn parse_expression(input: &str) -> Result<Spanned<Expr<Reference>>, ParseError> {
    parse_expression_with_limits(input, &ExprLimits::default())
}

/// Parse an attribute expression, rejecting input beyond `limits`
pub fn parse_expression_with_limits(
    input: &str,
    limits: &ExprLimits,
) -> Result<Spanned<Expr<Reference>>, ParseError> {
    let len = input.len();
    let tokens = lexer::lex(input)?;
    check_limits(&tokens, limits)?;

    // Create a token stream chumsky can use
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expression_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| match errs.into_iter().next() {
            Some(err) => err.into(),
            None => ParseError::Syntax {
                span: 0..len,
                message: "Invalid expression".to_string(),
                expected: Vec::new(),
            },
        })
}

/// Reject token streams too long or too deeply parenthesised to walk safely
fn check_limits(tokens: &[(Token, Span)], limits: &ExprLimits) -> Result<(), ParseError> {
    if let Some((_, span)) = tokens.get(limits.max_tokens) {
        return Err(ParseError::Syntax {
            span: span.clone(),
            message: format!("Expression is longer than {} tokens", limits.max_tokens),
            expected: Vec::new(),
        });
    }

    let mut depth = 0usize;
    for (token, span) in tokens {
        match token {
            Token::ParenOpen => {
                depth += 1;
                if depth > limits.max_nesting {
                    return Err(ParseError::Syntax {
                        span: span.clone(),
                        message: format!(
                            "Parentheses nested deeper than {} levels",
                            limits.max_nesting
                        ),
                        expected: Vec::new(),
                    });
                }
            }
            Token::ParenClose => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Fold `first (op operand)*` into a left-associative tree
fn fold_binary(
    first: Spanned<Expr<Reference>>,
    rest: Vec<(BinaryOp, Spanned<Expr<Reference>>)>,
) -> Spanned<Expr<Reference>> {
    rest.into_iter().fold(first, |lhs, (op, rhs)| {
        let span = lhs.span.start..rhs.span.end;
        Spanned::new(
            Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    })
}

fn expression_parser<'a, I>(
) -> impl Parser<'a, I, Spanned<Expr<Reference>>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let sum = recursive(|expr| {
        let number = select! {
            Token::Number(n) => n,
        }
        .map_with(|n, e| Spanned::new(Expr::Number(n), span_range(&e.span())));

        let segment = select! {
            Token::Ident(s) => Identifier::new(s),
        }
        .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

        // A reference needs a target and an attribute: `id.attr`
        let reference = segment
            .separated_by(just(Token::Dot))
            .at_least(2)
            .collect::<Vec<_>>()
            .map_with(|segments, e| {
                Spanned::new(
                    Expr::Reference(Reference { segments }),
                    span_range(&e.span()),
                )
            });

        let atom = choice((
            number,
            reference,
            expr.delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ));

        let unary = just(Token::Minus)
            .or_not()
            .then(atom)
            .map_with(|(neg, operand), e| match neg {
                Some(_) => Spanned::new(Expr::Neg(Box::new(operand)), span_range(&e.span())),
                None => operand,
            });

        let product_op = choice((
            just(Token::Star).to(BinaryOp::Mul),
            just(Token::Slash).to(BinaryOp::Div),
        ));
        let product = unary
            .clone()
            .then(product_op.then(unary).repeated().collect::<Vec<_>>())
            .map(|(first, rest)| fold_binary(first, rest));

        let sum_op = choice((
            just(Token::Plus).to(BinaryOp::Add),
            just(Token::Minus).to(BinaryOp::Sub),
        ));
        product
            .clone()
            .then(sum_op.then(product).repeated().collect::<Vec<_>>())
            .map(|(first, rest)| fold_binary(first, rest))
    });

    sum.then_ignore(end())
}
