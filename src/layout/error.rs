//! Error types for the layout solver

use thiserror::Error;

use crate::error::ParseError;
use crate::expr::{ExprError, Span};

use super::solver::SolverError;
use super::types::Attribute;

/// Errors that can occur while resolving a layout tree
///
/// Every error is terminal for the solve: no partial layout is produced.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Malformed expression source
    #[error("{node}.{attribute}: {error}")]
    Parse {
        node: String,
        attribute: Attribute,
        expression: String,
        error: ParseError,
    },

    /// Reference to an attribute name outside the recognised set
    #[error("{node}.{attribute}: '{name}' is not an attribute (expected one of: {})", Attribute::valid_names())]
    InvalidAttribute {
        node: String,
        attribute: Attribute,
        name: String,
        span: Span,
    },

    /// `parent` used where there is no ancestor
    #[error("{node}.{attribute}: 'parent' used on a node without an ancestor")]
    NoParent {
        node: String,
        attribute: Attribute,
        span: Span,
    },

    /// Dotted reference to a node id that does not exist
    #[error("{node}.{attribute}: unknown node '{name}'{}", format_suggestions(.suggestions))]
    UnknownReference {
        node: String,
        attribute: Attribute,
        name: String,
        span: Span,
        suggestions: Vec<String>,
    },

    /// The same id appears on more than one node
    #[error("duplicate node id '{id}'")]
    DuplicateId { id: String },

    /// Product of two non-constant terms, or division by a non-constant
    #[error("{node}.{attribute}: expression '{expression}' is not linear")]
    NonLinear {
        node: String,
        attribute: Attribute,
        expression: String,
    },

    /// Division by a constant zero
    #[error("{node}.{attribute}: division by zero in '{expression}'")]
    DivisionByZero {
        node: String,
        attribute: Attribute,
        expression: String,
    },

    /// Constant folding exceeded the exact number range
    #[error("{node}.{attribute}: arithmetic overflow in '{expression}'")]
    ArithmeticOverflow {
        node: String,
        attribute: Attribute,
        expression: String,
    },

    /// Tree too large for the configured variable cap
    #[error("layout needs {variables} variables, limit is {limit}")]
    TooManyVariables { variables: usize, limit: usize },

    /// Solution lacks a value for some of a node's attributes
    #[error("no solved value for {node}: {}", format_attributes(.missing))]
    IncompleteSolution {
        node: String,
        missing: Vec<Attribute>,
    },

    /// Linear system has no unique solution
    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl LayoutError {
    /// Attach declaration context to an expression error
    pub fn from_expr(
        error: ExprError,
        node: impl Into<String>,
        attribute: Attribute,
        expression: impl Into<String>,
    ) -> Self {
        let node = node.into();
        match error {
            ExprError::Parse(error) => Self::Parse {
                node,
                attribute,
                expression: expression.into(),
                error,
            },
            ExprError::InvalidAttribute { name, span } => Self::InvalidAttribute {
                node,
                attribute,
                name,
                span,
            },
            ExprError::NoParent { span } => Self::NoParent {
                node,
                attribute,
                span,
            },
        }
    }

    /// Create an unknown reference error with suggestions
    pub fn unknown_reference(
        node: impl Into<String>,
        attribute: Attribute,
        name: impl Into<String>,
        span: Span,
        suggestions: Vec<String>,
    ) -> Self {
        Self::UnknownReference {
            node: node.into(),
            attribute,
            name: name.into(),
            span,
            suggestions,
        }
    }

    /// Get the span within the expression source, if available
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::Parse { error, .. } => Some(error.span()),
            Self::InvalidAttribute { span, .. } => Some(span),
            Self::NoParent { span, .. } => Some(span),
            Self::UnknownReference { span, .. } => Some(span),
            _ => None,
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnknownReference { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

fn format_attributes(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(|a| a.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_unknown_reference_display() {
        let err = LayoutError::unknown_reference(
            "rect2",
            Attribute::X,
            "rectl",
            0..5,
            vec!["rect1".to_string()],
        );
        assert_snapshot!(err.to_string(), @"rect2.x: unknown node 'rectl' (did you mean: rect1?)");
        assert_eq!(err.suggestions(), Some(&["rect1".to_string()][..]));
    }

    #[test]
    fn test_no_parent_display() {
        let err = LayoutError::from_expr(
            ExprError::NoParent { span: 0..6 },
            "root",
            Attribute::W,
            "parent.w",
        );
        assert_snapshot!(err.to_string(), @"root.w: 'parent' used on a node without an ancestor");
        assert_eq!(err.span(), Some(&(0..6)));
    }

    #[test]
    fn test_too_many_variables_display() {
        let err = LayoutError::TooManyVariables {
            variables: 12,
            limit: 6,
        };
        assert_snapshot!(err.to_string(), @"layout needs 12 variables, limit is 6");
    }

    #[test]
    fn test_incomplete_solution_display() {
        let err = LayoutError::IncompleteSolution {
            node: "a".to_string(),
            missing: vec![Attribute::W, Attribute::Right],
        };
        assert_snapshot!(err.to_string(), @"no solved value for a: w, right");
    }
}
