//! Projection of solver values back onto the layout tree

use super::error::LayoutError;
use super::solver::Solution;
use super::types::{Attribute, Geometry, LayoutNode, ResolvedLayout, ResolvedNode};

/// Build a resolved tree mirroring `root`, with all six values per node
pub fn project(root: &LayoutNode, solution: &Solution) -> Result<ResolvedLayout, LayoutError> {
    let nodes: Vec<&LayoutNode> = root.iter().collect();
    let geometries = nodes
        .iter()
        .map(|node| geometry(node, solution))
        .collect::<Result<Vec<_>, _>>()?;

    // Reverse pre-order: a node's children are the last ones finished, most
    // recent first
    let mut finished: Vec<ResolvedNode> = Vec::with_capacity(nodes.len());
    for (node, geometry) in nodes.into_iter().zip(geometries).rev() {
        let first_child = finished.len().saturating_sub(node.children.len());
        let mut children = finished.split_off(first_child);
        children.reverse();
        finished.push(ResolvedNode {
            id: node.id.clone(),
            kind: node.kind.clone(),
            geometry,
            children,
        });
    }

    match finished.pop() {
        Some(root) => Ok(ResolvedLayout { root }),
        None => Err(LayoutError::IncompleteSolution {
            node: root.id.clone(),
            missing: Attribute::ALL.to_vec(),
        }),
    }
}

fn geometry(node: &LayoutNode, solution: &Solution) -> Result<Geometry, LayoutError> {
    let mut geometry = Geometry::default();
    let mut missing = Vec::new();
    for attribute in Attribute::ALL {
        match solution.get_by_id(&node.id, attribute) {
            Some(value) => geometry.set(attribute, value),
            None => missing.push(attribute),
        }
    }
    if !missing.is_empty() {
        return Err(LayoutError::IncompleteSolution {
            node: node.id.clone(),
            missing,
        });
    }
    Ok(geometry)
}
