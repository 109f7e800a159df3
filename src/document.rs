//! TOML layout documents
//!
//! A document describes one node tree:
//!
//! ```toml
//! [metadata]
//! name = "two columns"
//!
//! [root]
//! id = "page"
//! x = 0
//! y = 0
//! w = 800
//! h = 600
//!
//! [[root.children]]
//! id = "left"
//! kind = "Text"
//! x = "parent.x"
//! w = "parent.w / 2"
//! ```
//!
//! Attribute values are numbers or expression strings. Keys other than the
//! six attributes, `id`, `kind` and `children` are ignored, so documents may
//! carry renderer properties alongside the geometry.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::{Attribute, LayoutNode};

/// Node kind used when a document leaves `kind` out
pub const DEFAULT_KIND: &str = "Rect";

/// Errors that can occur when loading a layout document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read layout file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse layout TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("{node}.{attribute}: {value} is not a finite number")]
    InvalidValue {
        node: String,
        attribute: Attribute,
        value: f64,
    },
}

/// A loaded layout document
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDocument {
    /// Optional name from `[metadata]`
    pub name: Option<String>,
    pub root: LayoutNode,
}

#[derive(Deserialize)]
struct TomlDocument {
    metadata: Option<TomlMetadata>,
    root: TomlNode,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

#[derive(Deserialize)]
struct TomlNode {
    id: String,
    kind: Option<String>,
    x: Option<TomlValue>,
    y: Option<TomlValue>,
    w: Option<TomlValue>,
    h: Option<TomlValue>,
    right: Option<TomlValue>,
    bottom: Option<TomlValue>,
    #[serde(default)]
    children: Vec<TomlNode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TomlValue {
    Integer(i64),
    Float(f64),
    Expression(String),
}

impl TomlNode {
    fn into_layout_node(self) -> Result<LayoutNode, DocumentError> {
        let mut node = LayoutNode::new(self.id, self.kind.as_deref().unwrap_or(DEFAULT_KIND));
        let declared = [
            (Attribute::X, self.x),
            (Attribute::Y, self.y),
            (Attribute::W, self.w),
            (Attribute::H, self.h),
            (Attribute::Right, self.right),
            (Attribute::Bottom, self.bottom),
        ];
        for (attribute, value) in declared {
            let source = match value {
                None => continue,
                Some(TomlValue::Integer(value)) => value.to_string(),
                // f64 Display never uses exponent notation, so this stays a valid literal
                Some(TomlValue::Float(value)) if value.is_finite() => value.to_string(),
                Some(TomlValue::Float(value)) => {
                    return Err(DocumentError::InvalidValue {
                        node: node.id,
                        attribute,
                        value,
                    })
                }
                Some(TomlValue::Expression(source)) => source,
            };
            node.attributes.insert(attribute, source);
        }

        node.children = self
            .children
            .into_iter()
            .map(TomlNode::into_layout_node)
            .collect::<Result<_, _>>()?;
        Ok(node)
    }
}

impl LayoutDocument {
    /// Load a document from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load a document from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, DocumentError> {
        let parsed: TomlDocument = toml::from_str(content)?;
        Ok(LayoutDocument {
            name: parsed.metadata.and_then(|m| m.name),
            root: parsed.root.into_layout_node()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_nested_document() {
        let doc = LayoutDocument::from_toml_str(
            r#"
            [metadata]
            name = "sidebar"

            [root]
            id = "page"
            x = 0
            y = 0
            w = 800
            h = 600.5

            [[root.children]]
            id = "side"
            kind = "Text"
            color = "blue"
            x = "parent.x"
            y = "parent.y"
            w = "parent.w / 4"
            bottom = "parent.bottom"
            "#,
        )
        .unwrap();

        let expected = LayoutNode::new("page", "Rect")
            .with(Attribute::X, 0)
            .with(Attribute::Y, 0)
            .with(Attribute::W, 800)
            .with(Attribute::H, "600.5")
            .with_child(
                LayoutNode::new("side", "Text")
                    .with(Attribute::X, "parent.x")
                    .with(Attribute::Y, "parent.y")
                    .with(Attribute::W, "parent.w / 4")
                    .with(Attribute::Bottom, "parent.bottom"),
            );
        assert_eq!(doc.name.as_deref(), Some("sidebar"));
        assert_eq!(doc.root, expected);
    }

    #[test]
    fn test_missing_metadata() {
        let doc = LayoutDocument::from_toml_str("[root]\nid = \"a\"\n").unwrap();
        assert_eq!(doc.name, None);
        assert_eq!(doc.root, LayoutNode::new("a", DEFAULT_KIND));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let err = LayoutDocument::from_toml_str("[root]\nid = \"a\"\nw = inf\n").unwrap_err();
        assert!(matches!(
            err,
            DocumentError::InvalidValue { ref node, attribute: Attribute::W, .. } if node == "a"
        ));
    }

    #[test]
    fn test_missing_root_rejected() {
        let err = LayoutDocument::from_toml_str("[metadata]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, DocumentError::ParseError(_)));
    }
}
