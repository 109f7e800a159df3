//! Expression trees for attribute declarations

use std::fmt;

use crate::layout::{Attribute, Rational};

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric + underscore, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// An arithmetic expression whose references are of type `R`
///
/// The parser produces `Expr<Reference>` (raw dotted paths); scope resolution
/// turns it into `Expr<AttrRef>` with absolute node ids.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<R> {
    Number(Rational),
    Reference(R),
    Neg(Box<Spanned<Expr<R>>>),
    Binary {
        op: BinaryOp,
        lhs: Box<Spanned<Expr<R>>>,
        rhs: Box<Spanned<Expr<R>>>,
    },
}

/// A dotted reference as written, e.g. `parent.w` or `rect1.right`
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub segments: Vec<Spanned<Identifier>>,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<_> = self.segments.iter().map(|s| s.node.as_str()).collect();
        f.write_str(&path.join("."))
    }
}

/// A reference resolved to an absolute node id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrRef {
    pub node: String,
    pub attribute: Attribute,
}

impl fmt::Display for AttrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.attribute)
    }
}

impl<R> Spanned<Expr<R>> {
    /// Rebuild the tree, converting every reference with `f`
    pub fn try_map_refs<S, E>(
        self,
        f: &mut impl FnMut(R, &Span) -> Result<S, E>,
    ) -> Result<Spanned<Expr<S>>, E> {
        let Spanned { node, span } = self;
        let node = match node {
            Expr::Number(n) => Expr::Number(n),
            Expr::Reference(r) => Expr::Reference(f(r, &span)?),
            Expr::Neg(inner) => Expr::Neg(Box::new(inner.try_map_refs(f)?)),
            Expr::Binary { op, lhs, rhs } => Expr::Binary {
                op,
                lhs: Box::new(lhs.try_map_refs(f)?),
                rhs: Box::new(rhs.try_map_refs(f)?),
            },
        };
        Ok(Spanned::new(node, span))
    }

    /// Collect all references with their spans, left to right
    pub fn references(&self) -> Vec<(&R, &Span)> {
        let mut refs = Vec::new();
        collect_refs(self, &mut refs);
        refs
    }
}

fn collect_refs<'a, R>(expr: &'a Spanned<Expr<R>>, refs: &mut Vec<(&'a R, &'a Span)>) {
    match &expr.node {
        Expr::Number(_) => {}
        Expr::Reference(r) => refs.push((r, &expr.span)),
        Expr::Neg(inner) => collect_refs(inner, refs),
        Expr::Binary { lhs, rhs, .. } => {
            collect_refs(lhs, refs);
            collect_refs(rhs, refs);
        }
    }
}

impl<R: fmt::Display> fmt::Display for Expr<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Reference(r) => write!(f, "{}", r),
            Expr::Neg(inner) => write!(f, "-({})", inner.node),
            Expr::Binary { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs.node, op.symbol(), rhs.node)
            }
        }
    }
}
