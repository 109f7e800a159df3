//! Variable numbering for the linear system
//!
//! Every node gets a block of six consecutive columns, assigned in tree
//! pre-order, whether or not its attributes are ever referenced.

use std::collections::HashMap;

use super::config::SolverConfig;
use super::error::LayoutError;
use super::types::{Attribute, LayoutNode, Variable};

/// Injective mapping between (node id, attribute) and matrix columns
#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// Node ids in pre-order; node `i` owns columns `6i..6i+6`
    nodes: Vec<String>,
    positions: HashMap<String, usize>,
}

impl SymbolTable {
    /// Enumerate all nodes of `root`, enforcing the variable cap first
    pub fn build(root: &LayoutNode, config: &SolverConfig) -> Result<Self, LayoutError> {
        let node_count = root.iter().count();
        let variables = node_count.saturating_mul(Attribute::COUNT);
        if variables > config.max_variables {
            return Err(LayoutError::TooManyVariables {
                variables,
                limit: config.max_variables,
            });
        }

        let mut nodes = Vec::with_capacity(node_count);
        let mut positions = HashMap::with_capacity(node_count);
        for node in root.iter() {
            if positions.insert(node.id.clone(), nodes.len()).is_some() {
                return Err(LayoutError::DuplicateId {
                    id: node.id.clone(),
                });
            }
            nodes.push(node.id.clone());
        }

        Ok(Self { nodes, positions })
    }

    /// Total number of variables (matrix columns)
    pub fn len(&self) -> usize {
        self.nodes.len() * Attribute::COUNT
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Node ids in column order
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Column of a node's attribute
    pub fn index_of(&self, node: &str, attribute: Attribute) -> Option<usize> {
        self.positions
            .get(node)
            .map(|position| position * Attribute::COUNT + attribute.offset())
    }

    /// Reverse lookup from column to variable
    pub fn variable(&self, index: usize) -> Option<Variable> {
        let node = self.nodes.get(index / Attribute::COUNT)?;
        let attribute = Attribute::ALL[index % Attribute::COUNT];
        Some(Variable::new(node.clone(), attribute))
    }
}
