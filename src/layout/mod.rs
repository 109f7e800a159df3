//! Layout solver for computing node positions and sizes
//!
//! Takes a tree of nodes whose attributes are linear expressions, turns it
//! into a linear system and solves it exactly, producing a ResolvedLayout
//! with concrete values for every node.

pub mod config;
pub mod equations;
pub mod error;
pub mod projector;
pub mod rational;
pub mod solver;
pub mod symbols;
pub mod types;

pub use config::{ConfigError, SolverConfig};
pub use equations::{build_equations, Equation, EquationOrigin, LinearExpr};
pub use error::LayoutError;
pub use projector::project;
pub use rational::Rational;
pub use solver::{solve_system, LinearSolver, Solution, SolverError};
pub use symbols::SymbolTable;
pub use types::*;

use tracing::debug;

/// Solve a layout tree with the default configuration
pub fn solve(root: &LayoutNode) -> Result<ResolvedLayout, LayoutError> {
    solve_with_config(root, &SolverConfig::default())
}

/// Solve a layout tree
///
/// Runs the full pipeline: variable numbering, equation building, exact
/// elimination and projection back onto the tree. Any failure aborts the
/// solve; no partial layout is returned.
pub fn solve_with_config(
    root: &LayoutNode,
    config: &SolverConfig,
) -> Result<ResolvedLayout, LayoutError> {
    let symbols = SymbolTable::build(root, config)?;
    debug!(
        nodes = symbols.len() / Attribute::COUNT,
        variables = symbols.len(),
        "numbered layout variables"
    );

    let equations = build_equations(root, &symbols, config)?;
    debug!(equations = equations.len(), "built layout equations");

    let solution = solve_system(&symbols, equations)?;
    project(root, &solution)
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    if a_chars.is_empty() {
        return n;
    }
    if n == 0 {
        return a_chars.len();
    }

    // Single rolling row
    let mut row: Vec<usize> = (0..=n).collect();
    for (i, ca) in a_chars.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[n]
}

/// Node ids within `max_distance` edits of `target`, closest first, at most three
pub(crate) fn find_similar<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut matches: Vec<(&str, usize)> = candidates
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then_some((name, dist))
        })
        .collect();

    matches.sort_by_key(|(_, d)| *d);
    matches
        .into_iter()
        .map(|(name, _)| name.to_string())
        .take(3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_same() {
        assert_eq!(levenshtein_distance("rect1", "rect1"), 0);
    }

    #[test]
    fn test_levenshtein_one_off() {
        assert_eq!(levenshtein_distance("rect1", "rectl"), 1);
        assert_eq!(levenshtein_distance("header", "heder"), 1);
    }

    #[test]
    fn test_levenshtein_different() {
        assert_eq!(levenshtein_distance("cat", "dog"), 3);
        assert_eq!(levenshtein_distance("", "dog"), 3);
    }

    #[test]
    fn test_find_similar() {
        let ids = ["rect1", "rect2", "footer"];
        let suggestions = find_similar(ids, "rectl", 2);
        assert_eq!(suggestions, vec!["rect1".to_string(), "rect2".to_string()]);
        assert!(find_similar(ids, "sidebar", 2).is_empty());
    }

    #[test]
    fn test_solve_nested_percentages() {
        let tree = LayoutNode::new("page", "Rect")
            .with(Attribute::X, 0)
            .with(Attribute::Y, 0)
            .with(Attribute::W, 300)
            .with(Attribute::H, 200)
            .with_child(
                LayoutNode::new("panel", "Rect")
                    .with(Attribute::X, "parent.x + 10")
                    .with(Attribute::Y, "parent.y + 10")
                    .with(Attribute::Right, "parent.right - 10")
                    .with(Attribute::H, "parent.h / 2")
                    .with_child(
                        LayoutNode::new("label", "Text")
                            .with(Attribute::X, "parent.x")
                            .with(Attribute::Y, "parent.y")
                            .with(Attribute::W, "parent.parent.w / 3")
                            .with(Attribute::Bottom, "parent.bottom"),
                    ),
            );

        let layout = solve(&tree).unwrap();
        let panel = layout.get("panel").unwrap().geometry;
        assert_eq!(panel.w, Rational::from(280));
        assert_eq!(panel.bottom, Rational::from(110));

        let label = layout.get("label").unwrap().geometry;
        assert_eq!(label.w, Rational::from(100));
        assert_eq!(label.h, Rational::from(100));
        assert_eq!(label.right, Rational::from(110));
    }

    #[test]
    fn test_solve_reports_free_variable() {
        let tree = LayoutNode::new("a", "Rect")
            .with(Attribute::X, 0)
            .with(Attribute::Y, 0)
            .with(Attribute::H, 10);
        let err = solve(&tree).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Solver(SolverError::Underdetermined { ref free })
                if free == &vec![Variable::new("a", Attribute::W)]
        ));
    }
}
