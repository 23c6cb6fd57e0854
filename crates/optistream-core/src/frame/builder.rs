//! Payload assembly, the inverse of `FrameDecoder`.
//!
//! Used to synthesize captures and test buffers. Sections without an
//! explicit node are written as empty groups.

use super::error::FrameError;
use super::packet::{DATA_FRAME_SECTIONS, dataset_id};
use crate::asset::AssetType;
use crate::decode::{EncodeError, ParsedNode, encode_into};
use crate::schema::{SchemaRegistry, layout};

/// Prefix section carrying `frame_number`.
pub fn prefix_node(frame_number: i32) -> ParsedNode {
    ParsedNode::new(layout::FRAME_PREFIX.name).with_field("frame_number", frame_number)
}

/// Suffix section with zeroed timing fields apart from `timestamp`.
pub fn suffix_node(timestamp: f64) -> ParsedNode {
    ParsedNode::new(layout::FRAME_SUFFIX.name)
        .with_field("timecode", 0u32)
        .with_field("timecode_sub", 0u32)
        .with_field("timestamp", timestamp)
        .with_field("camera_mid_exposure", 0u64)
        .with_field("data_received", 0u64)
        .with_field("transmit", 0u64)
        .with_field("precision_seconds", 0u32)
        .with_field("precision_fraction", 0u32)
        .with_field("params", 0)
}

/// Encode a frame-of-data payload from per-section nodes.
///
/// `sections` is keyed by the tag a section decodes as (`AssetRigidBody`
/// for the asset section). Prefix and suffix must be supplied.
pub fn encode_frame_of_data(
    registry: &SchemaRegistry,
    sections: &[(AssetType, ParsedNode)],
) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::new();
    for section in DATA_FRAME_SECTIONS {
        let layout = registry.get_layout(section.decode_as)?;
        let empty = ParsedNode::new(layout.name);
        let node = sections
            .iter()
            .find(|(tag, _)| *tag == section.decode_as)
            .map(|(_, node)| node)
            .unwrap_or(&empty);
        encode_into(layout, node, &mut out)?;
    }
    Ok(out)
}

/// Encode a model-definition payload: dataset count, then per dataset its
/// type id, byte size and description.
pub fn encode_model_definitions(
    registry: &SchemaRegistry,
    datasets: &[(AssetType, ParsedNode)],
) -> Result<Vec<u8>, FrameError> {
    let count = i32::try_from(datasets.len()).map_err(|_| {
        FrameError::Encode(EncodeError::CountOverflow { group: "datasets" })
    })?;
    let mut out = count.to_le_bytes().to_vec();
    for (tag, node) in datasets {
        let id = dataset_id(*tag).ok_or(FrameError::NoDatasetType { tag: *tag })?;
        let mut body = Vec::new();
        encode_into(registry.get_layout(*tag)?, node, &mut body)?;
        let size = i32::try_from(body.len()).map_err(|_| {
            FrameError::Encode(EncodeError::CountOverflow {
                group: "dataset size",
            })
        })?;
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&body);
    }
    Ok(out)
}
