//! Core types for the layout solver

use std::collections::BTreeMap;
use std::fmt;

use super::rational::Rational;

/// The geometric attributes every node carries
///
/// Declaration order doubles as column order inside a node's block of
/// solver variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    X,
    Y,
    W,
    H,
    Right,
    Bottom,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::X,
        Attribute::Y,
        Attribute::W,
        Attribute::H,
        Attribute::Right,
        Attribute::Bottom,
    ];

    /// Number of attributes (and therefore solver variables) per node
    pub const COUNT: usize = Self::ALL.len();

    /// Look up an attribute by its source name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "w" => Some(Self::W),
            "h" => Some(Self::H),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::W => "w",
            Self::H => "h",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }

    /// Position of this attribute within a node's block of variables
    pub fn offset(self) -> usize {
        self as usize
    }

    /// Comma-separated list of valid names, for diagnostics
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|a| a.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The implicit relations that tie derived edges to position and size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
    /// right = x + w
    Right,
    /// bottom = y + h
    Bottom,
}

impl Identity {
    pub const ALL: [Identity; 2] = [Identity::Right, Identity::Bottom];

    /// The derived attribute on the left-hand side
    pub fn derived(self) -> Attribute {
        match self {
            Self::Right => Attribute::Right,
            Self::Bottom => Attribute::Bottom,
        }
    }

    pub fn origin(self) -> Attribute {
        match self {
            Self::Right => Attribute::X,
            Self::Bottom => Attribute::Y,
        }
    }

    pub fn extent(self) -> Attribute {
        match self {
            Self::Right => Attribute::W,
            Self::Bottom => Attribute::H,
        }
    }
}

/// A node in the element tree handed over by the parsing collaborator
///
/// Attribute values are raw expression sources; the solver never mutates the
/// tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    /// Unique across the whole tree
    pub id: String,
    /// Opaque tag for the renderer ("Rect", "Text", ...)
    pub kind: String,
    pub attributes: BTreeMap<Attribute, String>,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Declare an attribute. Accepts anything displayable, so both `800` and
    /// `"parent.w / 2"` work.
    pub fn with(mut self, attribute: Attribute, source: impl fmt::Display) -> Self {
        self.attributes.insert(attribute, source.to_string());
        self
    }

    pub fn with_child(mut self, child: LayoutNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = LayoutNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Iterate over this node and all descendants in pre-order
    pub fn iter(&self) -> impl Iterator<Item = &LayoutNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// A solver unknown: one attribute of one node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub node: String,
    pub attribute: Attribute,
}

impl Variable {
    pub fn new(node: impl Into<String>, attribute: Attribute) -> Self {
        Self {
            node: node.into(),
            attribute,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.attribute)
    }
}

/// Exact resolved values of a node's six attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: Rational,
    pub y: Rational,
    pub w: Rational,
    pub h: Rational,
    pub right: Rational,
    pub bottom: Rational,
}

impl Geometry {
    pub fn get(&self, attribute: Attribute) -> Rational {
        match attribute {
            Attribute::X => self.x,
            Attribute::Y => self.y,
            Attribute::W => self.w,
            Attribute::H => self.h,
            Attribute::Right => self.right,
            Attribute::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: Rational) {
        match attribute {
            Attribute::X => self.x = value,
            Attribute::Y => self.y = value,
            Attribute::W => self.w = value,
            Attribute::H => self.h = value,
            Attribute::Right => self.right = value,
            Attribute::Bottom => self.bottom = value,
        }
    }

    /// Floating-point view for renderers
    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x.to_f64(),
            y: self.y.to_f64(),
            w: self.w.to_f64(),
            h: self.h.to_f64(),
            right: self.right.to_f64(),
            bottom: self.bottom.to_f64(),
        }
    }
}

/// Resolved attributes as plain numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub right: f64,
    pub bottom: f64,
}

/// A node with all six attributes resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub id: String,
    pub kind: String,
    pub geometry: Geometry,
    pub children: Vec<ResolvedNode>,
}

impl ResolvedNode {
    pub fn bounds(&self) -> Bounds {
        self.geometry.bounds()
    }
}

/// Result of solving a layout tree, in the same shape as the input
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    pub root: ResolvedNode,
}

impl ResolvedLayout {
    /// Find a node by id
    pub fn get(&self, id: &str) -> Option<&ResolvedNode> {
        self.iter().find(|node| node.id == id)
    }

    /// Iterate over all resolved nodes in pre-order (the input's node order)
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedNode> {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names_round_trip() {
        for attribute in Attribute::ALL {
            assert_eq!(Attribute::from_name(attribute.name()), Some(attribute));
        }
        assert_eq!(Attribute::from_name("width"), None);
    }

    #[test]
    fn test_attribute_offsets_follow_declaration_order() {
        let offsets: Vec<_> = Attribute::ALL.iter().map(|a| a.offset()).collect();
        assert_eq!(offsets, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_identity_pairs() {
        assert_eq!(Identity::Right.derived(), Attribute::Right);
        assert_eq!(Identity::Right.origin(), Attribute::X);
        assert_eq!(Identity::Bottom.extent(), Attribute::H);
    }

    #[test]
    fn test_node_builder_and_preorder() {
        let tree = LayoutNode::new("root", "Rect")
            .with(Attribute::W, 800)
            .with_child(LayoutNode::new("a", "Rect").with_child(LayoutNode::new("a1", "Text")))
            .with_child(LayoutNode::new("b", "Rect"));

        assert_eq!(tree.attributes.get(&Attribute::W).map(String::as_str), Some("800"));
        let ids: Vec<_> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_geometry_bounds() {
        let mut geometry = Geometry::default();
        geometry.set(Attribute::W, Rational::new(801, 2).unwrap());
        assert_eq!(geometry.get(Attribute::W).to_f64(), 400.5);
        assert_eq!(geometry.bounds().w, 400.5);
    }
}
