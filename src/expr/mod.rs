//! Expression evaluator for attribute declarations
//!
//! Turns an expression source like `parent.w / 2` into a tree whose
//! references name absolute node ids. The `parent` alias is resolved here,
//! from the declaring node's position in the tree.

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{parse_expression, parse_expression_with_limits};

use thiserror::Error;

use crate::error::ParseError;
use crate::layout::Attribute;

/// The relative alias for the nearest ancestor
pub const PARENT_ALIAS: &str = "parent";

/// Default cap on tokens in a single expression
pub const DEFAULT_MAX_TOKENS: usize = 1_024;

/// Default cap on parenthesis nesting in a single expression
pub const DEFAULT_MAX_NESTING: usize = 32;

/// Size bounds on a single expression
///
/// Expression trees are walked recursively, so their depth has to stay
/// bounded no matter what stack the caller runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprLimits {
    pub max_tokens: usize,
    pub max_nesting: usize,
}

impl Default for ExprLimits {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// Tree position of the node declaring an expression
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Id of the declaring node
    pub node: &'a str,
    /// Ancestor ids, root first, nearest ancestor last
    pub ancestors: &'a [&'a str],
}

impl<'a> Scope<'a> {
    pub fn new(node: &'a str, ancestors: &'a [&'a str]) -> Self {
        Self { node, ancestors }
    }

    /// The ancestor `depth` levels up (1 = parent)
    pub fn ancestor(&self, depth: usize) -> Option<&'a str> {
        let index = self.ancestors.len().checked_sub(depth)?;
        self.ancestors.get(index).copied()
    }
}

/// Errors raised while evaluating a single expression
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("'{name}' is not an attribute (expected one of: {})", Attribute::valid_names())]
    InvalidAttribute { name: String, span: Span },

    #[error("'parent' used on a node without an ancestor")]
    NoParent { span: Span },
}

/// Parse `source` and resolve every reference against `scope`
///
/// Node ids are not checked for existence here; that needs the whole tree.
pub fn evaluate(source: &str, scope: &Scope<'_>) -> Result<Spanned<Expr<AttrRef>>, ExprError> {
    evaluate_with_limits(source, scope, &ExprLimits::default())
}

/// Like [`evaluate`], with explicit size bounds
pub fn evaluate_with_limits(
    source: &str,
    scope: &Scope<'_>,
    limits: &ExprLimits,
) -> Result<Spanned<Expr<AttrRef>>, ExprError> {
    let expr = parse_expression_with_limits(source, limits)?;
    expr.try_map_refs(&mut |reference: Reference, _span: &Span| {
        resolve_reference(reference, scope)
    })
}

fn resolve_reference(reference: Reference, scope: &Scope<'_>) -> Result<AttrRef, ExprError> {
    let Reference { segments } = reference;
    // The grammar guarantees at least two segments
    let Some((last, path)) = segments.split_last() else {
        return Err(ExprError::Parse(ParseError::Syntax {
            span: 0..0,
            message: "Empty reference".to_string(),
            expected: Vec::new(),
        }));
    };

    let attribute =
        Attribute::from_name(last.node.as_str()).ok_or_else(|| ExprError::InvalidAttribute {
            name: last.node.0.clone(),
            span: last.span.clone(),
        })?;

    let node = match path {
        [first, rest @ ..] if first.node.as_str() == PARENT_ALIAS => {
            // `parent.parent.w` climbs one level per segment
            let mut depth = 1;
            for segment in rest {
                if segment.node.as_str() != PARENT_ALIAS {
                    return Err(ExprError::InvalidAttribute {
                        name: segment.node.0.clone(),
                        span: segment.span.clone(),
                    });
                }
                depth += 1;
            }
            let Some(ancestor) = scope.ancestor(depth) else {
                // Point at the first `parent` that has nothing to refer to
                let missing = path.get(scope.ancestors.len()).unwrap_or(first);
                return Err(ExprError::NoParent {
                    span: missing.span.clone(),
                });
            };
            ancestor.to_string()
        }
        [only] => only.node.0.clone(),
        [_, extra, ..] => {
            return Err(ExprError::InvalidAttribute {
                name: extra.node.0.clone(),
                span: extra.span.clone(),
            });
        }
        [] => {
            return Err(ExprError::Parse(ParseError::Syntax {
                span: last.span.clone(),
                message: format!("Reference '{}' has no target node", last.node),
                expected: Vec::new(),
            }));
        }
    };

    Ok(AttrRef { node, attribute })
}
