use std::fmt;
use std::str::FromStr;

use crate::record::Value;

/// Decoded, still-nested tree for one layout instance.
///
/// Besides its content the node keeps two bookkeeping values that never
/// reach exported records: the identity anchor (offset where the node
/// started) and the relative offset (cursor right after the node). Equality
/// compares content only.
#[derive(Debug, Clone)]
pub struct ParsedNode {
    layout: &'static str,
    anchor: usize,
    relative_offset: usize,
    fields: Vec<(&'static str, Value)>,
    groups: Vec<(&'static str, Vec<ParsedNode>)>,
}

impl ParsedNode {
    pub fn new(layout: &'static str) -> Self {
        Self {
            layout,
            anchor: 0,
            relative_offset: 0,
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.push_field(name, value.into());
        self
    }

    pub fn with_group(mut self, name: &'static str, children: Vec<ParsedNode>) -> Self {
        self.push_group(name, children);
        self
    }

    pub(crate) fn push_field(&mut self, name: &'static str, value: Value) {
        self.fields.push((name, value));
    }

    pub(crate) fn push_group(&mut self, name: &'static str, children: Vec<ParsedNode>) {
        self.groups.push((name, children));
    }

    pub(crate) fn set_bookkeeping(&mut self, anchor: usize, relative_offset: usize) {
        self.anchor = anchor;
        self.relative_offset = relative_offset;
    }

    /// Name of the layout this node was decoded with.
    pub fn layout_name(&self) -> &'static str {
        self.layout
    }

    /// Offset in the source buffer where this node started.
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Bytes consumed from the buffer start once this node completed.
    pub fn relative_offset(&self) -> usize {
        self.relative_offset
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Leaf fields in wire order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(key, value)| (*key, value))
    }

    /// Children of the group called `name`; empty when absent.
    pub fn children(&self, name: &str) -> &[ParsedNode] {
        self.groups
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, children)| children.as_slice())
            .unwrap_or(&[])
    }

    pub fn groups(&self) -> impl Iterator<Item = (&'static str, &[ParsedNode])> {
        self.groups
            .iter()
            .map(|(key, children)| (*key, children.as_slice()))
    }

    /// Children of one declared kind from a node embedding both rigid-body
    /// and marker groups.
    pub fn select(&self, kind: AssetChild) -> &[ParsedNode] {
        self.children(kind.group_name())
    }

    /// True when any of this node's groups has entries.
    pub fn has_children(&self) -> bool {
        self.groups.iter().any(|(_, children)| !children.is_empty())
    }
}

impl PartialEq for ParsedNode {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && self.groups == other.groups
    }
}

/// Child kind selector for composite assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetChild {
    RigidBodies,
    Markers,
}

impl AssetChild {
    /// Group name both asset layouts use for this kind.
    pub fn group_name(self) -> &'static str {
        match self {
            AssetChild::RigidBodies => "rigid_bodies",
            AssetChild::Markers => "markers",
        }
    }
}

impl fmt::Display for AssetChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetChild::RigidBodies => f.write_str("RigidBodies"),
            AssetChild::Markers => f.write_str("Markers"),
        }
    }
}

/// Returned when a selector string names neither child kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("asset selector must be 'RigidBodies' or 'Markers', got '{0}'")]
pub struct InvalidSelector(pub String);

impl FromStr for AssetChild {
    type Err = InvalidSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RigidBodies" | "AssetRigidBodies" => Ok(AssetChild::RigidBodies),
            "Markers" | "AssetMarkers" => Ok(AssetChild::Markers),
            other => Err(InvalidSelector(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetChild, ParsedNode};
    use crate::record::Value;

    #[test]
    fn equality_ignores_bookkeeping() {
        let mut decoded = ParsedNode::new("prefix").with_field("frame_number", 3);
        decoded.set_bookkeeping(10, 14);
        let expected = ParsedNode::new("prefix").with_field("frame_number", 3);
        assert_eq!(decoded, expected);
        assert_eq!(decoded.relative_offset(), 14);
    }

    #[test]
    fn select_returns_one_child_kind() {
        let node = ParsedNode::new("asset")
            .with_field("id", 1)
            .with_group("rigid_bodies", vec![ParsedNode::new("rigid_body")])
            .with_group(
                "markers",
                vec![ParsedNode::new("marker"), ParsedNode::new("marker")],
            );
        assert_eq!(node.select(AssetChild::RigidBodies).len(), 1);
        assert_eq!(node.select(AssetChild::Markers).len(), 2);
        assert_eq!(node.field("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn selector_parsing() {
        assert_eq!("Markers".parse::<AssetChild>(), Ok(AssetChild::Markers));
        assert_eq!(
            "AssetRigidBodies".parse::<AssetChild>(),
            Ok(AssetChild::RigidBodies)
        );
        let err = "Skeletons".parse::<AssetChild>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "asset selector must be 'RigidBodies' or 'Markers', got 'Skeletons'"
        );
    }
}
