//! Exact linear system solver
//!
//! Gauss-Jordan elimination over rationals. Equations are added one at a time
//! and immediately reduced against the rows already accepted, so the row set
//! is always in reduced row echelon form:
//!
//! - a new row that reduces to `0 = 0` is redundant and dropped,
//! - a new row that reduces to `0 = c` (c != 0) is a contradiction,
//! - otherwise it becomes the pivot row for its highest-indexed column and
//!   that column is eliminated from every other row.
//!
//! Each row remembers which input equations were combined into it, so a
//! contradiction names exactly the equations that produced it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;
use tracing::{debug, trace};

use super::equations::{Equation, EquationOrigin};
use super::rational::Rational;
use super::symbols::SymbolTable;
use super::types::{Attribute, Variable};

/// Free variables listed in error messages before truncating
const MAX_LISTED_VARIABLES: usize = 10;

/// Errors from the linear solver
#[derive(Debug, Error)]
pub enum SolverError {
    /// Inconsistent over-constraint
    #[error("contradictory constraints: {}", format_equations(.equations))]
    Contradiction { equations: Vec<EquationOrigin> },

    /// Some variables are not pinned by any equation
    #[error("underdetermined layout, no unique value for: {}", format_variables(.free))]
    Underdetermined { free: Vec<Variable> },

    /// Elimination exceeded the exact number range
    #[error("arithmetic overflow while eliminating '{equation}'")]
    Overflow { equation: EquationOrigin },

    /// Equation mentions a column the symbol table does not have
    #[error("equation '{equation}' uses column {column}, but only {columns} exist")]
    UnknownColumn {
        equation: EquationOrigin,
        column: usize,
        columns: usize,
    },
}

fn format_equations(equations: &[EquationOrigin]) -> String {
    equations
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_variables(variables: &[Variable]) -> String {
    let mut listed: Vec<String> = variables
        .iter()
        .take(MAX_LISTED_VARIABLES)
        .map(|v| v.to_string())
        .collect();
    if variables.len() > MAX_LISTED_VARIABLES {
        listed.push(format!(
            "and {} more",
            variables.len() - MAX_LISTED_VARIABLES
        ));
    }
    listed.join(", ")
}

/// One row of the augmented matrix: `Σ coefficients + constant = 0`
#[derive(Debug, Clone)]
struct Row {
    /// Sparse, never holds a zero coefficient
    coefficients: BTreeMap<usize, Rational>,
    constant: Rational,
    /// Indices of the input equations combined into this row
    support: BTreeSet<usize>,
}

impl Row {
    /// `self -= factor * other`
    fn subtract_scaled(&mut self, other: &Row, factor: Rational) -> Option<()> {
        for (&column, &coefficient) in &other.coefficients {
            let delta = coefficient.checked_mul(factor)?;
            let updated = match self.coefficients.get(&column) {
                Some(existing) => existing.checked_sub(delta)?,
                None => delta.checked_neg()?,
            };
            if updated.is_zero() {
                self.coefficients.remove(&column);
            } else {
                self.coefficients.insert(column, updated);
            }
        }
        self.constant = self
            .constant
            .checked_sub(other.constant.checked_mul(factor)?)?;
        self.support.extend(other.support.iter().copied());
        Some(())
    }

    fn scale(&mut self, factor: Rational) -> Option<()> {
        for coefficient in self.coefficients.values_mut() {
            *coefficient = coefficient.checked_mul(factor)?;
        }
        self.constant = self.constant.checked_mul(factor)?;
        Some(())
    }
}

/// Incremental elimination over the columns of a symbol table
pub struct LinearSolver<'a> {
    symbols: &'a SymbolTable,
    /// Origins of every equation added, by input index
    origins: Vec<EquationOrigin>,
    /// Accepted rows in reduced form
    rows: Vec<Row>,
    /// Column -> row whose pivot it is
    pivot_rows: Vec<Option<usize>>,
    redundant: usize,
}

impl<'a> LinearSolver<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            origins: Vec::new(),
            rows: Vec::new(),
            pivot_rows: vec![None; symbols.len()],
            redundant: 0,
        }
    }

    /// Number of independent equations accepted so far
    pub fn rank(&self) -> usize {
        self.rows.len()
    }

    /// Number of equations that reduced to `0 = 0`
    pub fn redundant(&self) -> usize {
        self.redundant
    }

    /// Add an equation, failing fast if it contradicts the ones before it
    pub fn add_equation(&mut self, equation: Equation) -> Result<(), SolverError> {
        let columns = self.symbols.len();
        if let Some((&column, _)) = equation.expr.terms.last_key_value() {
            if column >= columns {
                return Err(SolverError::UnknownColumn {
                    equation: equation.origin,
                    column,
                    columns,
                });
            }
        }

        let index = self.origins.len();
        self.origins.push(equation.origin);

        let mut row = Row {
            coefficients: equation
                .expr
                .terms
                .into_iter()
                .filter(|(_, coefficient)| !coefficient.is_zero())
                .collect(),
            constant: equation.expr.constant,
            support: BTreeSet::from([index]),
        };

        // Accepted rows only mention their own pivot plus free columns, so one
        // pass over the pivots present in the new row clears them all.
        let pivoted: Vec<(usize, usize)> = row
            .coefficients
            .keys()
            .filter_map(|&column| {
                let pivot_row = self.pivot_rows.get(column).copied().flatten()?;
                Some((column, pivot_row))
            })
            .collect();
        for (column, pivot_row) in pivoted {
            let Some(&factor) = row.coefficients.get(&column) else {
                continue;
            };
            row.subtract_scaled(&self.rows[pivot_row], factor)
                .ok_or_else(|| self.overflow(index))?;
        }

        let Some((&pivot, &coefficient)) = row.coefficients.last_key_value() else {
            if row.constant.is_zero() {
                self.redundant += 1;
                trace!(equation = %self.origins[index], "redundant equation");
                return Ok(());
            }
            let equations = row
                .support
                .iter()
                .map(|&i| self.origins[i].clone())
                .collect();
            return Err(SolverError::Contradiction { equations });
        };

        let normalize = coefficient.recip().ok_or_else(|| self.overflow(index))?;
        row.scale(normalize).ok_or_else(|| self.overflow(index))?;

        // Keep earlier rows reduced with respect to the new pivot
        for existing in &mut self.rows {
            if let Some(&factor) = existing.coefficients.get(&pivot) {
                if existing.subtract_scaled(&row, factor).is_none() {
                    return Err(SolverError::Overflow {
                        equation: self.origins[index].clone(),
                    });
                }
            }
        }

        self.pivot_rows[pivot] = Some(self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    fn overflow(&self, index: usize) -> SolverError {
        SolverError::Overflow {
            equation: self.origins[index].clone(),
        }
    }

    /// Read off the unique solution, or name the columns left without a pivot
    pub fn solve(self) -> Result<Solution, SolverError> {
        let free: Vec<Variable> = self
            .pivot_rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_none())
            .filter_map(|(column, _)| self.symbols.variable(column))
            .collect();
        if !free.is_empty() {
            return Err(SolverError::Underdetermined { free });
        }

        let mut values = HashMap::with_capacity(self.rows.len());
        for (column, row) in self.pivot_rows.iter().enumerate() {
            let (Some(row), Some(variable)) = (row, self.symbols.variable(column)) else {
                continue;
            };
            // Fully reduced: the row reads `variable + constant = 0`
            let row = &self.rows[*row];
            let value = row
                .constant
                .checked_neg()
                .ok_or_else(|| self.overflow(row.support.first().copied().unwrap_or_default()))?;
            values.insert(variable, value);
        }

        debug!(
            variables = self.symbols.len(),
            rank = self.rows.len(),
            redundant = self.redundant,
            "solved linear system"
        );
        Ok(Solution { values })
    }
}

/// Solve a complete equation list
pub fn solve_system(
    symbols: &SymbolTable,
    equations: Vec<Equation>,
) -> Result<Solution, SolverError> {
    let mut solver = LinearSolver::new(symbols);
    for equation in equations {
        solver.add_equation(equation)?;
    }
    solver.solve()
}

/// Solution from the linear solver
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub values: HashMap<Variable, Rational>,
}

impl Solution {
    /// Get value for a variable
    pub fn get(&self, var: &Variable) -> Option<Rational> {
        self.values.get(var).copied()
    }

    /// Get value by node id and attribute
    pub fn get_by_id(&self, node: &str, attribute: Attribute) -> Option<Rational> {
        self.values.get(&Variable::new(node, attribute)).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
