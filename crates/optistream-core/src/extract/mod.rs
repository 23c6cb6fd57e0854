//! Flattening of parsed trees into export-ready records.
//!
//! Each asset type maps to one rule in a lookup table, per registry kind.
//! A rule names the path of groups to follow from the root down to the
//! entity that becomes a row. Container levels crossed on the way are
//! dropped: a skeleton's rigid bodies, or a plate's channel samples, do not
//! carry the id of the container they came from.

pub mod error;

use crate::asset::{AssetType, RegistryKind};
use crate::decode::{AssetChild, ParsedNode, decode};
use crate::record::FlatRecord;
use crate::schema::{LayoutDescriptor, SchemaRegistry};

pub use error::ExtractError;

/// How one asset type's tree becomes rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// One record built from the root node's fields.
    Single,
    /// One record per node reached by following the group path.
    Path(&'static [&'static str]),
    /// Composite asset: the selector picks the path.
    Selectable {
        rigid_bodies: &'static [&'static str],
        markers: &'static [&'static str],
    },
}

const DATA_FRAME_RULES: &[(AssetType, Rule)] = &[
    (AssetType::Prefix, Rule::Single),
    (AssetType::MarkerSet, Rule::Path(&["marker_sets", "markers"])),
    (AssetType::LabeledMarker, Rule::Path(&["markers"])),
    (AssetType::LegacyMarkerSet, Rule::Path(&["markers"])),
    (AssetType::RigidBody, Rule::Path(&["rigid_bodies"])),
    (AssetType::Skeleton, Rule::Path(&["skeletons", "rigid_bodies"])),
    (
        AssetType::AssetRigidBody,
        Rule::Selectable {
            rigid_bodies: &["assets", "rigid_bodies"],
            markers: &["assets", "markers"],
        },
    ),
    (
        AssetType::AssetMarker,
        Rule::Selectable {
            rigid_bodies: &["assets", "rigid_bodies"],
            markers: &["assets", "markers"],
        },
    ),
    (AssetType::ForcePlate, Rule::Path(&["plates", "channels", "frames"])),
    (AssetType::Device, Rule::Path(&["devices", "channels", "frames"])),
    (AssetType::Suffix, Rule::Single),
];

const DESCRIPTION_RULES: &[(AssetType, Rule)] = &[
    (AssetType::MarkerSet, Rule::Path(&["markers"])),
    (AssetType::RigidBody, Rule::Path(&["markers"])),
    (AssetType::Skeleton, Rule::Path(&["rigid_bodies", "markers"])),
    (
        AssetType::AssetRigidBody,
        Rule::Selectable {
            rigid_bodies: &["rigid_bodies", "markers"],
            markers: &["markers"],
        },
    ),
    (
        AssetType::AssetMarker,
        Rule::Selectable {
            rigid_bodies: &["rigid_bodies", "markers"],
            markers: &["markers"],
        },
    ),
    (AssetType::ForcePlate, Rule::Path(&["channels"])),
    (AssetType::Device, Rule::Path(&["channels"])),
    (AssetType::Camera, Rule::Path(&["cameras"])),
];

/// Flattening rule registered for `tag` in the `kind` table.
///
/// # Errors
/// Returns `ExtractError::UnknownAssetType` when the table has no entry.
pub fn rule_for(kind: RegistryKind, tag: AssetType) -> Result<Rule, ExtractError> {
    let table = match kind {
        RegistryKind::DataFrame => DATA_FRAME_RULES,
        RegistryKind::Description => DESCRIPTION_RULES,
    };
    table
        .iter()
        .find(|(entry, _)| *entry == tag)
        .map(|(_, rule)| *rule)
        .ok_or(ExtractError::UnknownAssetType {
            tag,
            registry: kind,
        })
}

/// Child kind an asset accumulator is filled from.
pub fn implied_selector(tag: AssetType) -> Option<AssetChild> {
    match tag {
        AssetType::AssetRigidBody => Some(AssetChild::RigidBodies),
        AssetType::AssetMarker => Some(AssetChild::Markers),
        _ => None,
    }
}

/// Flatten `node` into one record per entity according to the rule for
/// `tag`.
///
/// # Errors
/// - `UnknownAssetType` when no rule exists for `tag`.
/// - `InvalidArgument` when a composite asset gets no selector, or a
///   single-kind asset gets one.
pub fn flatten(
    kind: RegistryKind,
    tag: AssetType,
    node: &ParsedNode,
    selector: Option<AssetChild>,
) -> Result<Vec<FlatRecord>, ExtractError> {
    let path = match (rule_for(kind, tag)?, selector) {
        (Rule::Single, None) => return Ok(vec![record_of(node)]),
        (Rule::Path(path), None) => path,
        (Rule::Selectable { rigid_bodies, .. }, Some(AssetChild::RigidBodies)) => rigid_bodies,
        (Rule::Selectable { markers, .. }, Some(AssetChild::Markers)) => markers,
        (Rule::Selectable { .. }, None) => return Err(ExtractError::SelectorRequired { tag }),
        (_, Some(_)) => return Err(ExtractError::SelectorNotApplicable { tag }),
    };

    let mut records = Vec::new();
    collect_leaves(node, path, &mut records);
    Ok(records)
}

fn collect_leaves(node: &ParsedNode, path: &[&str], out: &mut Vec<FlatRecord>) {
    match path.split_first() {
        None => out.push(record_of(node)),
        Some((group, rest)) => {
            for child in node.children(group) {
                collect_leaves(child, rest, out);
            }
        }
    }
}

/// Leaf fields only; the node's anchor and offset never become columns.
fn record_of(node: &ParsedNode) -> FlatRecord {
    node.fields()
        .map(|(name, value)| (name, value.clone()))
        .collect()
}

/// Decode-then-flatten helper bound to one asset type.
///
/// Holds the most recent parsed tree so records can be pulled after the
/// parse, and reports the offset where the next structure starts.
pub struct Unpacker<'r> {
    registry: &'r SchemaRegistry,
    tag: AssetType,
    layout: &'static LayoutDescriptor,
    parsed: Option<ParsedNode>,
}

impl<'r> Unpacker<'r> {
    /// # Errors
    /// Returns `ExtractError::Schema` when `registry` has no layout for
    /// `tag`.
    pub fn new(registry: &'r SchemaRegistry, tag: AssetType) -> Result<Self, ExtractError> {
        let layout = registry.get_layout(tag)?;
        Ok(Self {
            registry,
            tag,
            layout,
            parsed: None,
        })
    }

    pub fn tag(&self) -> AssetType {
        self.tag
    }

    /// Decode from `cursor` and keep the tree. A failed parse clears the
    /// previous tree.
    pub fn parse(&mut self, buffer: &[u8], cursor: usize) -> Result<usize, ExtractError> {
        self.parsed = None;
        let (node, end) = decode(self.layout, buffer, cursor)?;
        self.parsed = Some(node);
        Ok(end)
    }

    /// Cursor after the last parsed tree, 0 before any parse.
    pub fn relative_offset(&self) -> usize {
        self.parsed
            .as_ref()
            .map(ParsedNode::relative_offset)
            .unwrap_or(0)
    }

    pub fn parsed(&self) -> Option<&ParsedNode> {
        self.parsed.as_ref()
    }

    /// Records of a single-kind asset.
    ///
    /// # Errors
    /// `IllegalState` before a successful parse; `InvalidArgument` for
    /// composite assets, which need [`Unpacker::records_with`].
    pub fn records(&self) -> Result<Vec<FlatRecord>, ExtractError> {
        let node = self.require_parsed()?;
        flatten(self.registry.kind(), self.tag, node, None)
    }

    /// Records of one child kind of a composite asset, named by `selector`
    /// (`RigidBodies` or `Markers`).
    ///
    /// # Errors
    /// `IllegalState` before a successful parse; `InvalidArgument` for any
    /// other selector string.
    pub fn records_with(&self, selector: &str) -> Result<Vec<FlatRecord>, ExtractError> {
        let node = self.require_parsed()?;
        let selector = selector.parse::<AssetChild>()?;
        flatten(self.registry.kind(), self.tag, node, Some(selector))
    }

    fn require_parsed(&self) -> Result<&ParsedNode, ExtractError> {
        self.parsed
            .as_ref()
            .ok_or(ExtractError::NotParsed { tag: self.tag })
    }
}
