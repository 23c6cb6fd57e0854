//! Schema registries: asset type -> wire layout.
//!
//! Two registries exist, one for frame-of-data sections and one for
//! model-definition datasets. Both are built once, never mutated, and passed
//! explicitly to whatever decodes with them. Layouts are keyed by asset type
//! only; the stream protocol version does not select layouts.

pub mod descriptor;
pub mod error;
pub mod layout;

use std::collections::BTreeMap;

use crate::asset::{AssetType, RegistryKind};

pub use descriptor::{Field, LayoutDescriptor, Primitive};
pub use error::SchemaError;

/// Immutable map from asset type to layout for one registry kind.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    kind: RegistryKind,
    layouts: BTreeMap<AssetType, &'static LayoutDescriptor>,
}

impl SchemaRegistry {
    /// Registry of frame-of-data section layouts.
    pub fn data_frames() -> Self {
        let layouts = [
            (AssetType::Prefix, &layout::FRAME_PREFIX),
            (AssetType::MarkerSet, &layout::MARKER_SETS),
            (AssetType::LabeledMarker, &layout::LABELED_MARKERS),
            (AssetType::LegacyMarkerSet, &layout::LEGACY_MARKER_SET),
            (AssetType::RigidBody, &layout::RIGID_BODIES),
            (AssetType::Skeleton, &layout::SKELETONS),
            (AssetType::AssetRigidBody, &layout::ASSETS),
            (AssetType::AssetMarker, &layout::ASSETS),
            (AssetType::ForcePlate, &layout::FORCE_PLATES),
            (AssetType::Device, &layout::DEVICES),
            (AssetType::Suffix, &layout::FRAME_SUFFIX),
        ];
        Self::from_entries(RegistryKind::DataFrame, layouts)
    }

    /// Registry of model-definition dataset layouts.
    pub fn descriptions() -> Self {
        let layouts = [
            (AssetType::MarkerSet, &layout::MARKER_SET_DESCRIPTION),
            (AssetType::RigidBody, &layout::RIGID_BODY_DESCRIPTION),
            (AssetType::Skeleton, &layout::SKELETON_DESCRIPTION),
            (AssetType::AssetRigidBody, &layout::ASSET_DESCRIPTION),
            (AssetType::AssetMarker, &layout::ASSET_DESCRIPTION),
            (AssetType::ForcePlate, &layout::FORCE_PLATE_DESCRIPTION),
            (AssetType::Device, &layout::DEVICE_DESCRIPTION),
            (AssetType::Camera, &layout::CAMERA_DESCRIPTION),
        ];
        Self::from_entries(RegistryKind::Description, layouts)
    }

    /// Registry for `kind`.
    pub fn for_kind(kind: RegistryKind) -> Self {
        match kind {
            RegistryKind::DataFrame => Self::data_frames(),
            RegistryKind::Description => Self::descriptions(),
        }
    }

    fn from_entries<const N: usize>(
        kind: RegistryKind,
        entries: [(AssetType, &'static LayoutDescriptor); N],
    ) -> Self {
        Self {
            kind,
            layouts: entries.into_iter().collect(),
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// Layout registered for `tag`.
    ///
    /// # Errors
    /// Returns `SchemaError::UnknownAssetType` when `tag` has no layout in
    /// this registry (e.g. `Camera` in the data-frame registry).
    pub fn get_layout(&self, tag: AssetType) -> Result<&'static LayoutDescriptor, SchemaError> {
        self.layouts
            .get(&tag)
            .copied()
            .ok_or(SchemaError::UnknownAssetType {
                tag,
                registry: self.kind,
            })
    }

    pub fn contains(&self, tag: AssetType) -> bool {
        self.layouts.contains_key(&tag)
    }

    /// Registered tags in stable order.
    pub fn tags(&self) -> impl Iterator<Item = AssetType> + '_ {
        self.layouts.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::SchemaRegistry;
    use crate::asset::AssetType;
    use crate::error::ErrorKind;

    #[test]
    fn data_registry_excludes_cameras() {
        let registry = SchemaRegistry::data_frames();
        let err = registry.get_layout(AssetType::Camera).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAssetType);
        assert!(err.to_string().contains("Camera"));
    }

    #[test]
    fn description_registry_excludes_prefix_and_suffix() {
        let registry = SchemaRegistry::descriptions();
        assert!(registry.get_layout(AssetType::Prefix).is_err());
        assert!(registry.get_layout(AssetType::Suffix).is_err());
        assert!(registry.get_layout(AssetType::Camera).is_ok());
    }

    #[test]
    fn asset_tags_share_one_layout() {
        let registry = SchemaRegistry::data_frames();
        let rigid = registry.get_layout(AssetType::AssetRigidBody).unwrap();
        let markers = registry.get_layout(AssetType::AssetMarker).unwrap();
        assert!(std::ptr::eq(rigid, markers));
    }

    #[test]
    fn unverified_layouts_are_flagged() {
        let data = SchemaRegistry::data_frames();
        let desc = SchemaRegistry::descriptions();
        assert!(!data.get_layout(AssetType::LegacyMarkerSet).unwrap().verified);
        assert!(!desc.get_layout(AssetType::ForcePlate).unwrap().verified);
        assert!(data.get_layout(AssetType::ForcePlate).unwrap().verified);
    }

    #[test]
    fn minimum_lengths_follow_field_widths() {
        let registry = SchemaRegistry::data_frames();
        assert_eq!(registry.get_layout(AssetType::Prefix).unwrap().min_encoded_len(), 4);
        // 4 u32 + f64 + 3 u64 + i16 + sentinel
        assert_eq!(
            registry.get_layout(AssetType::Suffix).unwrap().min_encoded_len(),
            4 * 4 + 8 + 3 * 8 + 2 + 4
        );
    }
}
