//! Mudblood Layout - exact constraint solving for box layouts
//!
//! Every node of a layout tree has six geometric attributes (`x`, `y`, `w`,
//! `h`, `right`, `bottom`). Attributes may be declared as linear expressions
//! over other nodes' attributes; the solver computes a unique exact value
//! for all of them or explains why it cannot.
//!
//! # Example
//!
//! ```rust
//! use mudblood_layout::layout::{solve, Attribute, LayoutNode, Rational};
//!
//! let tree = LayoutNode::new("page", "Rect")
//!     .with(Attribute::X, 0)
//!     .with(Attribute::Y, 0)
//!     .with(Attribute::W, 800)
//!     .with(Attribute::H, 600)
//!     .with_child(
//!         LayoutNode::new("half", "Rect")
//!             .with(Attribute::X, "parent.x")
//!             .with(Attribute::Y, "parent.y")
//!             .with(Attribute::W, "parent.w / 2")
//!             .with(Attribute::Bottom, "parent.bottom"),
//!     );
//!
//! let layout = solve(&tree).unwrap();
//! let half = layout.get("half").unwrap();
//! assert_eq!(half.geometry.right, Rational::from(400));
//! assert_eq!(half.bounds().h, 600.0);
//! ```

pub mod document;
pub mod error;
pub mod expr;
pub mod layout;

pub use document::{DocumentError, LayoutDocument};
pub use error::ParseError;
pub use layout::{
    solve, solve_with_config, LayoutError, LayoutNode, ResolvedLayout, SolverConfig, SolverError,
};

use thiserror::Error;

/// Errors that can occur between a TOML document and a resolved layout
#[derive(Debug, Error)]
pub enum SolveError {
    /// Error loading the document
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Error solving the layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Load and solve a TOML layout document with default configuration
///
/// # Example
///
/// ```rust
/// use mudblood_layout::solve_document;
///
/// let layout = solve_document(r#"
///     [root]
///     id = "box"
///     x = 10
///     y = 20
///     w = 30
///     h = "box.w * 2"
/// "#).unwrap();
///
/// assert_eq!(layout.root.bounds().bottom, 80.0);
/// ```
pub fn solve_document(source: &str) -> Result<ResolvedLayout, SolveError> {
    solve_document_with_config(source, &SolverConfig::default())
}

/// Load and solve a TOML layout document
pub fn solve_document_with_config(
    source: &str,
    config: &SolverConfig,
) -> Result<ResolvedLayout, SolveError> {
    let document = LayoutDocument::from_toml_str(source)?;
    Ok(solve_with_config(&document.root, config)?)
}
