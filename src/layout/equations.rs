//! Equation building: one equation per declared attribute plus the two
//! identities of every node

use std::collections::BTreeMap;
use std::fmt;

use crate::expr::{self, AttrRef, BinaryOp, Expr, ExprLimits, Scope, Spanned};

use super::config::SolverConfig;
use super::error::LayoutError;
use super::find_similar;
use super::rational::Rational;
use super::symbols::SymbolTable;
use super::types::{Attribute, Identity, LayoutNode};

/// `Σ(coefficient · variable) + constant`, keyed by symbol table column
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinearExpr {
    /// Never holds a zero coefficient
    pub terms: BTreeMap<usize, Rational>,
    pub constant: Rational,
}

impl LinearExpr {
    pub fn constant(value: Rational) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    pub fn variable(index: usize) -> Self {
        Self {
            terms: BTreeMap::from([(index, Rational::ONE)]),
            constant: Rational::ZERO,
        }
    }

    pub fn as_constant(&self) -> Option<Rational> {
        self.terms.is_empty().then_some(self.constant)
    }

    pub fn checked_add(mut self, other: &LinearExpr) -> Option<Self> {
        for (&index, &coefficient) in &other.terms {
            let sum = match self.terms.get(&index) {
                Some(existing) => existing.checked_add(coefficient)?,
                None => coefficient,
            };
            if sum.is_zero() {
                self.terms.remove(&index);
            } else {
                self.terms.insert(index, sum);
            }
        }
        self.constant = self.constant.checked_add(other.constant)?;
        Some(self)
    }

    pub fn checked_scale(mut self, factor: Rational) -> Option<Self> {
        if factor.is_zero() {
            return Some(Self::default());
        }
        for coefficient in self.terms.values_mut() {
            *coefficient = coefficient.checked_mul(factor)?;
        }
        self.constant = self.constant.checked_mul(factor)?;
        Some(self)
    }

    pub fn checked_sub(self, other: &LinearExpr) -> Option<Self> {
        let negated = other.clone().checked_scale(Rational::ONE.checked_neg()?)?;
        self.checked_add(&negated)
    }
}

/// Where an equation came from, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquationOrigin {
    /// `node.attribute = source` as written
    Declared {
        node: String,
        attribute: Attribute,
        source: String,
    },
    /// The implicit `right = x + w` or `bottom = y + h`
    Identity { node: String, identity: Identity },
}

impl fmt::Display for EquationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared {
                node,
                attribute,
                source,
            } => write!(f, "{}.{} = {}", node, attribute, source.trim()),
            Self::Identity { node, identity } => write!(
                f,
                "{node}.{} = {node}.{} + {node}.{}",
                identity.derived(),
                identity.origin(),
                identity.extent()
            ),
        }
    }
}

/// A linear relation `expr = 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub expr: LinearExpr,
    pub origin: EquationOrigin,
}

/// A declared attribute after scope resolution
struct Declaration<'t> {
    attribute: Attribute,
    source: &'t str,
    expr: Spanned<Expr<AttrRef>>,
}

/// Build the full equation list for `root`
///
/// All expressions are evaluated and every reference checked before any
/// equation is emitted, so an unknown id fails the solve up front.
pub fn build_equations(
    root: &LayoutNode,
    symbols: &SymbolTable,
    config: &SolverConfig,
) -> Result<Vec<Equation>, LayoutError> {
    let declared = collect_declarations(root, symbols, &config.expr_limits())?;

    let mut equations = Vec::with_capacity(declared.len() * 2);
    for (node, declarations) in declared {
        for declaration in declarations {
            equations.push(declared_equation(node, declaration, symbols)?);
        }
        for identity in Identity::ALL {
            equations.push(identity_equation(node, identity, symbols)?);
        }
    }
    Ok(equations)
}

/// Pre-order walk evaluating each node's declarations in its scope
fn collect_declarations<'t>(
    root: &'t LayoutNode,
    symbols: &SymbolTable,
    limits: &ExprLimits,
) -> Result<Vec<(&'t LayoutNode, Vec<Declaration<'t>>)>, LayoutError> {
    let mut out = Vec::new();
    // Ids from the root down to the node being visited
    let mut ancestors: Vec<&'t str> = Vec::new();
    // Each entry carries its depth, which is also its ancestor count
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        ancestors.truncate(depth);
        let scope = Scope::new(&node.id, &ancestors);

        let mut declarations = Vec::with_capacity(node.attributes.len());
        for (&attribute, source) in &node.attributes {
            let expr = expr::evaluate_with_limits(source, &scope, limits)
                .map_err(|e| LayoutError::from_expr(e, &node.id, attribute, source.as_str()))?;

            for (reference, span) in expr.references() {
                if !symbols.contains_node(&reference.node) {
                    return Err(LayoutError::unknown_reference(
                        &node.id,
                        attribute,
                        &reference.node,
                        span.clone(),
                        find_similar(symbols.node_ids(), &reference.node, 2),
                    ));
                }
            }

            declarations.push(Declaration {
                attribute,
                source,
                expr,
            });
        }
        out.push((node, declarations));

        ancestors.push(&node.id);
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    Ok(out)
}

fn declared_equation(
    node: &LayoutNode,
    declaration: Declaration<'_>,
    symbols: &SymbolTable,
) -> Result<Equation, LayoutError> {
    let Declaration {
        attribute,
        source,
        expr,
    } = declaration;

    let rhs = linearize(&expr, symbols).map_err(|kind| {
        let node = node.id.clone();
        let expression = source.trim().to_string();
        match kind {
            LinearizeError::NonLinear => LayoutError::NonLinear {
                node,
                attribute,
                expression,
            },
            LinearizeError::DivisionByZero => LayoutError::DivisionByZero {
                node,
                attribute,
                expression,
            },
            LinearizeError::Overflow => LayoutError::ArithmeticOverflow {
                node,
                attribute,
                expression,
            },
            LinearizeError::Unresolved(reference) => LayoutError::IncompleteSolution {
                node: reference.node,
                missing: vec![reference.attribute],
            },
        }
    })?;

    // declared_var - rhs = 0
    let lhs = LinearExpr::variable(column(symbols, &node.id, attribute)?);
    let expr = lhs
        .checked_sub(&rhs)
        .ok_or_else(|| LayoutError::ArithmeticOverflow {
            node: node.id.clone(),
            attribute,
            expression: source.trim().to_string(),
        })?;

    Ok(Equation {
        expr,
        origin: EquationOrigin::Declared {
            node: node.id.clone(),
            attribute,
            source: source.to_string(),
        },
    })
}

fn identity_equation(
    node: &LayoutNode,
    identity: Identity,
    symbols: &SymbolTable,
) -> Result<Equation, LayoutError> {
    // derived - origin - extent = 0
    let minus_one = Rational::from(-1);
    let terms = BTreeMap::from([
        (column(symbols, &node.id, identity.derived())?, Rational::ONE),
        (column(symbols, &node.id, identity.origin())?, minus_one),
        (column(symbols, &node.id, identity.extent())?, minus_one),
    ]);
    Ok(Equation {
        expr: LinearExpr {
            terms,
            constant: Rational::ZERO,
        },
        origin: EquationOrigin::Identity {
            node: node.id.clone(),
            identity,
        },
    })
}

fn column(symbols: &SymbolTable, node: &str, attribute: Attribute) -> Result<usize, LayoutError> {
    symbols
        .index_of(node, attribute)
        .ok_or_else(|| LayoutError::IncompleteSolution {
            node: node.to_string(),
            missing: vec![attribute],
        })
}

#[derive(Debug, Clone, PartialEq)]
enum LinearizeError {
    NonLinear,
    DivisionByZero,
    Overflow,
    /// Reference without a symbol table column
    Unresolved(AttrRef),
}

/// Fold an expression tree into linear form over symbol table columns
///
/// Operator chains parse left-deep, so the left spine is walked in a loop and
/// only right operands and negations recurse.
fn linearize(
    expr: &Spanned<Expr<AttrRef>>,
    symbols: &SymbolTable,
) -> Result<LinearExpr, LinearizeError> {
    use LinearizeError::*;

    let mut spine = Vec::new();
    let mut current = expr;
    let mut acc = loop {
        match &current.node {
            Expr::Binary { op, lhs, rhs } => {
                spine.push((*op, rhs.as_ref()));
                current = lhs.as_ref();
            }
            Expr::Number(value) => break LinearExpr::constant(*value),
            Expr::Reference(reference) => {
                let column = symbols
                    .index_of(&reference.node, reference.attribute)
                    .ok_or_else(|| Unresolved(reference.clone()))?;
                break LinearExpr::variable(column);
            }
            Expr::Neg(inner) => {
                break linearize(inner, symbols)?
                    .checked_scale(Rational::from(-1))
                    .ok_or(Overflow)?
            }
        }
    };

    for (op, rhs) in spine.into_iter().rev() {
        let rhs = linearize(rhs, symbols)?;
        acc = match op {
            BinaryOp::Add => acc.checked_add(&rhs).ok_or(Overflow)?,
            BinaryOp::Sub => acc.checked_sub(&rhs).ok_or(Overflow)?,
            BinaryOp::Mul => match (acc.as_constant(), rhs.as_constant()) {
                (Some(factor), _) => rhs.checked_scale(factor).ok_or(Overflow)?,
                (None, Some(factor)) => acc.checked_scale(factor).ok_or(Overflow)?,
                (None, None) => return Err(NonLinear),
            },
            BinaryOp::Div => {
                let divisor = rhs.as_constant().ok_or(NonLinear)?;
                if divisor.is_zero() {
                    return Err(DivisionByZero);
                }
                let factor = divisor.recip().ok_or(Overflow)?;
                acc.checked_scale(factor).ok_or(Overflow)?
            }
        };
    }
    Ok(acc)
}
