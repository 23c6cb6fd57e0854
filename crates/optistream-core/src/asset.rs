use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category of trackable entity carried by the capture stream.
///
/// The set is closed: every layout, flattening rule and accumulator is keyed
/// by one of these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Prefix,
    MarkerSet,
    LabeledMarker,
    LegacyMarkerSet,
    RigidBody,
    Skeleton,
    AssetRigidBody,
    AssetMarker,
    ForcePlate,
    Device,
    Camera,
    Suffix,
}

impl AssetType {
    pub const ALL: [AssetType; 12] = [
        AssetType::Prefix,
        AssetType::MarkerSet,
        AssetType::LabeledMarker,
        AssetType::LegacyMarkerSet,
        AssetType::RigidBody,
        AssetType::Skeleton,
        AssetType::AssetRigidBody,
        AssetType::AssetMarker,
        AssetType::ForcePlate,
        AssetType::Device,
        AssetType::Camera,
        AssetType::Suffix,
    ];

    /// Tag name as it appears in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            AssetType::Prefix => "Prefix",
            AssetType::MarkerSet => "MarkerSet",
            AssetType::LabeledMarker => "LabeledMarker",
            AssetType::LegacyMarkerSet => "LegacyMarkerSet",
            AssetType::RigidBody => "RigidBody",
            AssetType::Skeleton => "Skeleton",
            AssetType::AssetRigidBody => "AssetRigidBody",
            AssetType::AssetMarker => "AssetMarker",
            AssetType::ForcePlate => "ForcePlate",
            AssetType::Device => "Device",
            AssetType::Camera => "Camera",
            AssetType::Suffix => "Suffix",
        }
    }

    /// Accumulator key, also used as the table name on export.
    pub fn key(self) -> &'static str {
        match self {
            AssetType::Prefix => "Prefix",
            AssetType::MarkerSet => "MarkerSets",
            AssetType::LabeledMarker => "LabeledMarkers",
            AssetType::LegacyMarkerSet => "LegacyMarkerSet",
            AssetType::RigidBody => "RigidBodies",
            AssetType::Skeleton => "Skeletons",
            AssetType::AssetRigidBody => "AssetRigidBodies",
            AssetType::AssetMarker => "AssetMarkers",
            AssetType::ForcePlate => "ForcePlates",
            AssetType::Device => "Devices",
            AssetType::Camera => "Cameras",
            AssetType::Suffix => "Suffix",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no asset type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized asset type '{0}'")]
pub struct UnknownAssetName(pub String);

impl FromStr for AssetType {
    type Err = UnknownAssetName;

    /// Accepts either the tag name (`RigidBody`) or the accumulator key
    /// (`RigidBodies`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetType::ALL
            .into_iter()
            .find(|tag| tag.name() == s || tag.key() == s)
            .ok_or_else(|| UnknownAssetName(s.to_string()))
    }
}

/// Which of the two registries a layout or rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    /// Time-series frame-of-data payloads.
    DataFrame,
    /// One-time model descriptions.
    Description,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::DataFrame => f.write_str("data frame"),
            RegistryKind::Description => f.write_str("description"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AssetType;

    #[test]
    fn parses_tag_names_and_keys() {
        assert_eq!("RigidBodies".parse::<AssetType>(), Ok(AssetType::RigidBody));
        assert_eq!("RigidBody".parse::<AssetType>(), Ok(AssetType::RigidBody));
        assert_eq!("AssetMarkers".parse::<AssetType>(), Ok(AssetType::AssetMarker));
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "Bananas".parse::<AssetType>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized asset type 'Bananas'");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<_> = AssetType::ALL.iter().map(|tag| tag.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), AssetType::ALL.len());
    }
}
