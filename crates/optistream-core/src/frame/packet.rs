use std::collections::BTreeMap;

use tracing::trace;

use super::FrameBucket;
use super::error::FrameError;
use crate::asset::{AssetType, RegistryKind};
use crate::decode::reader::ByteReader;
use crate::decode::{DecodeError, ParsedNode, decode};
use crate::extract::{flatten, implied_selector};
use crate::record::FlatRecord;
use crate::schema::{LayoutDescriptor, SchemaRegistry, layout};

/// One section of a frame-of-data payload: decoded once with the layout of
/// `decode_as`, flattened once per tag in `extract`.
pub(crate) struct FrameSection {
    pub(crate) decode_as: AssetType,
    extract: &'static [AssetType],
}

pub(crate) const DATA_FRAME_SECTIONS: &[FrameSection] = &[
    FrameSection {
        decode_as: AssetType::Prefix,
        extract: &[AssetType::Prefix],
    },
    FrameSection {
        decode_as: AssetType::MarkerSet,
        extract: &[AssetType::MarkerSet],
    },
    FrameSection {
        decode_as: AssetType::LegacyMarkerSet,
        extract: &[AssetType::LegacyMarkerSet],
    },
    FrameSection {
        decode_as: AssetType::RigidBody,
        extract: &[AssetType::RigidBody],
    },
    FrameSection {
        decode_as: AssetType::Skeleton,
        extract: &[AssetType::Skeleton],
    },
    FrameSection {
        decode_as: AssetType::AssetRigidBody,
        extract: &[AssetType::AssetRigidBody, AssetType::AssetMarker],
    },
    FrameSection {
        decode_as: AssetType::LabeledMarker,
        extract: &[AssetType::LabeledMarker],
    },
    FrameSection {
        decode_as: AssetType::ForcePlate,
        extract: &[AssetType::ForcePlate],
    },
    FrameSection {
        decode_as: AssetType::Device,
        extract: &[AssetType::Device],
    },
    FrameSection {
        decode_as: AssetType::Suffix,
        extract: &[AssetType::Suffix],
    },
];

/// Tags filled from a model-definition dataset type id.
pub fn dataset_tags(id: i32) -> Option<&'static [AssetType]> {
    match id {
        layout::DATASET_MARKER_SET => Some(&[AssetType::MarkerSet]),
        layout::DATASET_RIGID_BODY => Some(&[AssetType::RigidBody]),
        layout::DATASET_SKELETON => Some(&[AssetType::Skeleton]),
        layout::DATASET_FORCE_PLATE => Some(&[AssetType::ForcePlate]),
        layout::DATASET_DEVICE => Some(&[AssetType::Device]),
        layout::DATASET_CAMERA => Some(&[AssetType::Camera]),
        layout::DATASET_ASSET => Some(&[AssetType::AssetRigidBody, AssetType::AssetMarker]),
        _ => None,
    }
}

/// Dataset type id announcing `tag` in a model definition.
pub fn dataset_id(tag: AssetType) -> Option<i32> {
    match tag {
        AssetType::MarkerSet => Some(layout::DATASET_MARKER_SET),
        AssetType::RigidBody => Some(layout::DATASET_RIGID_BODY),
        AssetType::Skeleton => Some(layout::DATASET_SKELETON),
        AssetType::ForcePlate => Some(layout::DATASET_FORCE_PLATE),
        AssetType::Device => Some(layout::DATASET_DEVICE),
        AssetType::Camera => Some(layout::DATASET_CAMERA),
        AssetType::AssetRigidBody | AssetType::AssetMarker => Some(layout::DATASET_ASSET),
        _ => None,
    }
}

/// Turns whole payloads into buckets using the two registries.
///
/// Each call either returns a complete bucket or an error; nothing partial
/// escapes.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    data: SchemaRegistry,
    descriptions: SchemaRegistry,
    allow_unverified: bool,
}

impl FrameDecoder {
    pub fn new(allow_unverified: bool) -> Self {
        Self::with_registries(
            SchemaRegistry::data_frames(),
            SchemaRegistry::descriptions(),
            allow_unverified,
        )
    }

    pub fn with_registries(
        data: SchemaRegistry,
        descriptions: SchemaRegistry,
        allow_unverified: bool,
    ) -> Self {
        Self {
            data,
            descriptions,
            allow_unverified,
        }
    }

    pub fn data_registry(&self) -> &SchemaRegistry {
        &self.data
    }

    pub fn description_registry(&self) -> &SchemaRegistry {
        &self.descriptions
    }

    /// Decode a frame-of-data payload section by section, each section
    /// resuming at the previous one's relative offset.
    ///
    /// # Errors
    /// Any decode, extraction or verification failure; also
    /// `DecodeError::TrailingBytes` when bytes remain after the suffix.
    pub fn decode_frame_of_data(&self, payload: &[u8]) -> Result<FrameBucket, FrameError> {
        let mut bucket = FrameBucket::for_registry(&self.data);
        let mut cursor = 0;

        for section in DATA_FRAME_SECTIONS {
            let layout = self.data.get_layout(section.decode_as)?;
            let (node, end) = decode(layout, payload, cursor)?;
            self.check_verified(RegistryKind::DataFrame, section.decode_as, layout, &node)?;
            for &tag in section.extract {
                let records = flatten(RegistryKind::DataFrame, tag, &node, implied_selector(tag))?;
                bucket.log(tag, records)?;
            }
            trace!(section = %section.decode_as, start = cursor, end, "decoded frame section");
            cursor = end;
        }

        if cursor != payload.len() {
            return Err(DecodeError::TrailingBytes {
                consumed: cursor,
                trailing: payload.len() - cursor,
            }
            .into());
        }
        Ok(bucket)
    }

    /// Decode a model-definition payload: a dataset count, then per dataset
    /// a type id, a byte size and one description.
    ///
    /// Datasets of the same tag are concatenated and logged once, so the
    /// bucket holds the full catalog per tag.
    ///
    /// # Errors
    /// Any decode, extraction or verification failure;
    /// `FrameError::UnknownDatasetType` for unmapped type ids;
    /// `DecodeError::BoundaryMismatch` when a description does not end at
    /// its declared size.
    pub fn decode_model_definitions(&self, payload: &[u8]) -> Result<FrameBucket, FrameError> {
        let reader = ByteReader::new(payload);
        let count = reader.read_i32(0)?;
        let count = usize::try_from(count).map_err(|_| DecodeError::NegativeCount {
            group: "datasets",
            offset: 0,
            count,
        })?;
        let mut cursor = 4;
        let mut collected: BTreeMap<AssetType, Vec<FlatRecord>> = BTreeMap::new();

        for _ in 0..count {
            let type_offset = cursor;
            let id = reader.read_i32(cursor)?;
            let size = reader.read_i32(cursor + 4)?;
            cursor += 8;

            let tags = dataset_tags(id).ok_or(FrameError::UnknownDatasetType {
                id,
                offset: type_offset,
            })?;
            let size = usize::try_from(size).map_err(|_| DecodeError::NegativeCount {
                group: "dataset size",
                offset: type_offset + 4,
                count: size,
            })?;
            let boundary = reader.read_slice(cursor, size).map(|_| cursor + size)?;

            let layout = self.descriptions.get_layout(tags[0])?;
            let (node, end) = decode(layout, &payload[..boundary], cursor)?;
            if end != boundary {
                return Err(DecodeError::BoundaryMismatch {
                    context: "model-definition dataset",
                    expected: boundary,
                    actual: end,
                }
                .into());
            }
            self.check_verified(RegistryKind::Description, tags[0], layout, &node)?;

            for &tag in tags {
                let records =
                    flatten(RegistryKind::Description, tag, &node, implied_selector(tag))?;
                collected.entry(tag).or_default().extend(records);
            }
            trace!(dataset = id, start = cursor, end, "decoded model definition");
            cursor = boundary;
        }

        if cursor != payload.len() {
            return Err(DecodeError::TrailingBytes {
                consumed: cursor,
                trailing: payload.len() - cursor,
            }
            .into());
        }

        let mut bucket = FrameBucket::for_registry(&self.descriptions);
        for (tag, records) in collected {
            bucket.log(tag, records)?;
        }
        Ok(bucket)
    }

    /// Unverified layouts may only pass when they produced nothing, unless
    /// the session opted in.
    fn check_verified(
        &self,
        registry: RegistryKind,
        tag: AssetType,
        layout: &LayoutDescriptor,
        node: &ParsedNode,
    ) -> Result<(), FrameError> {
        if layout.verified || self.allow_unverified || !node.has_children() {
            return Ok(());
        }
        Err(FrameError::Unverified { tag, registry })
    }
}
