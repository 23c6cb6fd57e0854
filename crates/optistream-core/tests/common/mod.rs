#![allow(dead_code)]

use std::fs;
use std::path::Path;

use etherparse::PacketBuilder;
use optistream_core::frame::{
    encode_frame_of_data, encode_model_definitions, prefix_node, suffix_node,
};
use optistream_core::schema::layout;
use optistream_core::source::message::{encode_message, layout as message, server_info_payload};
use optistream_core::{AssetType, ParsedNode, ProtocolVersion, SchemaRegistry};

pub fn marker(x: f32) -> ParsedNode {
    ParsedNode::new("marker_position")
        .with_field("x", x)
        .with_field("y", x + 1.0)
        .with_field("z", x + 2.0)
}

pub fn rigid_body(id: i32) -> ParsedNode {
    ParsedNode::new("rigid_body")
        .with_field("id", id)
        .with_field("x", 0.1f32)
        .with_field("y", 0.2f32)
        .with_field("z", 0.3f32)
        .with_field("qx", 0.0f32)
        .with_field("qy", 0.0f32)
        .with_field("qz", 0.0f32)
        .with_field("qw", 1.0f32)
        .with_field("mean_error", 0.0005f32)
        .with_field("params", 1)
}

pub fn labeled_marker(id: i32) -> ParsedNode {
    ParsedNode::new("labeled_marker")
        .with_field("id", id)
        .with_field("x", 1.5f32)
        .with_field("y", 2.5f32)
        .with_field("z", 3.5f32)
        .with_field("size", 0.014f32)
        .with_field("params", 0)
        .with_field("residual", 0.0002f32)
}

pub fn marker_sets(sets: usize, markers: usize) -> ParsedNode {
    let sets = (0..sets)
        .map(|set| {
            ParsedNode::new("marker_set")
                .with_field("name", format!("set{set}"))
                .with_group(
                    "markers",
                    (0..markers).map(|m| marker(m as f32)).collect(),
                )
        })
        .collect();
    ParsedNode::new("marker_sets").with_group("marker_sets", sets)
}

pub fn rigid_bodies(count: i32) -> ParsedNode {
    ParsedNode::new("rigid_bodies").with_group("rigid_bodies", (0..count).map(rigid_body).collect())
}

pub fn skeletons(skeletons: i32, bodies: i32) -> ParsedNode {
    let skeletons = (0..skeletons)
        .map(|id| {
            ParsedNode::new("skeleton").with_field("id", id).with_group(
                "rigid_bodies",
                (0..bodies).map(|b| rigid_body(id * 100 + b)).collect(),
            )
        })
        .collect();
    ParsedNode::new("skeletons").with_group("skeletons", skeletons)
}

pub fn labeled_markers(count: i32) -> ParsedNode {
    ParsedNode::new("labeled_markers").with_group("markers", (0..count).map(labeled_marker).collect())
}

pub fn assets(bodies: i32, markers: i32) -> ParsedNode {
    let asset = ParsedNode::new("asset")
        .with_field("id", 500)
        .with_group("rigid_bodies", (0..bodies).map(rigid_body).collect())
        .with_group(
            "markers",
            (0..markers).map(|m| labeled_marker(1000 + m)).collect(),
        );
    ParsedNode::new("assets").with_group("assets", vec![asset])
}

/// `devices` × `channels` × `frames` samples under the given top-level group
/// (`plates` or `devices`).
pub fn channel_devices(group: &'static str, devices: i32, channels: usize, frames: usize) -> ParsedNode {
    let devices = (0..devices)
        .map(|id| {
            let channels = (0..channels)
                .map(|c| {
                    let frames = (0..frames)
                        .map(|f| {
                            ParsedNode::new("channel_sample").with_field("value", (c * 10 + f) as f32)
                        })
                        .collect();
                    ParsedNode::new("channel").with_group("frames", frames)
                })
                .collect();
            ParsedNode::new("channel_device")
                .with_field("id", id)
                .with_group("channels", channels)
        })
        .collect();
    ParsedNode::new(group).with_group(group, devices)
}

/// Frame of data with content in every verified section.
pub fn full_frame(number: i32) -> Vec<u8> {
    encode_frame_of_data(
        &SchemaRegistry::data_frames(),
        &[
            (AssetType::Prefix, prefix_node(number)),
            (AssetType::MarkerSet, marker_sets(2, 3)),
            (AssetType::RigidBody, rigid_bodies(2)),
            (AssetType::Skeleton, skeletons(1, 3)),
            (AssetType::AssetRigidBody, assets(1, 2)),
            (AssetType::LabeledMarker, labeled_markers(4)),
            (AssetType::ForcePlate, channel_devices("plates", 2, 3, 4)),
            (AssetType::Device, channel_devices("devices", 1, 2, 2)),
            (AssetType::Suffix, suffix_node(f64::from(number) / 120.0)),
        ],
    )
    .unwrap()
}

pub fn rigid_body_frame(number: i32, bodies: i32) -> Vec<u8> {
    encode_frame_of_data(
        &SchemaRegistry::data_frames(),
        &[
            (AssetType::Prefix, prefix_node(number)),
            (AssetType::RigidBody, rigid_bodies(bodies)),
            (AssetType::Suffix, suffix_node(0.0)),
        ],
    )
    .unwrap()
}

pub fn marker_set_description(name: &str, markers: usize) -> ParsedNode {
    ParsedNode::new("marker_set_description")
        .with_field("name", name)
        .with_group(
            "markers",
            (0..markers)
                .map(|m| ParsedNode::new("marker_name").with_field("name", format!("{name}_{m}")))
                .collect(),
        )
}

pub fn rigid_body_marker_description(label: i32) -> ParsedNode {
    ParsedNode::new("rigid_body_marker_description")
        .with_field("x", 0.01f32)
        .with_field("y", 0.02f32)
        .with_field("z", 0.03f32)
        .with_field("active_label", label)
        .with_field("name", format!("m{label}"))
}

pub fn rigid_body_description(id: i32, markers: i32) -> ParsedNode {
    ParsedNode::new("rigid_body_description")
        .with_field("name", format!("body{id}"))
        .with_field("id", id)
        .with_field("parent_id", -1)
        .with_field("x", 0.0f32)
        .with_field("y", 0.0f32)
        .with_field("z", 0.0f32)
        .with_group(
            "markers",
            (0..markers).map(rigid_body_marker_description).collect(),
        )
}

pub fn skeleton_description(bodies: i32, markers: i32) -> ParsedNode {
    ParsedNode::new("skeleton_description")
        .with_field("name", "performer")
        .with_field("id", 1)
        .with_group(
            "rigid_bodies",
            (0..bodies).map(|b| rigid_body_description(b, markers)).collect(),
        )
}

pub fn force_plate_description(channels: usize) -> ParsedNode {
    let row = || {
        (0..12).fold(ParsedNode::new("calibration_row"), |node, c| {
            node.with_field(CALIBRATION_COLUMNS[c], 0.0f32)
        })
    };
    ParsedNode::new("force_plate_description")
        .with_field("id", 1)
        .with_field("serial", "FP-0001")
        .with_field("width", 0.6f32)
        .with_field("length", 0.4f32)
        .with_field("origin_x", 0.0f32)
        .with_field("origin_y", 0.0f32)
        .with_field("origin_z", 0.0f32)
        .with_group("calibration", (0..layout::CALIBRATION_ROWS).map(|_| row()).collect())
        .with_group("corners", (0..layout::PLATE_CORNERS).map(|c| marker(c as f32)).collect())
        .with_field("plate_type", 1)
        .with_field("channel_data_type", 0)
        .with_group("channels", channel_names(channels))
}

const CALIBRATION_COLUMNS: [&str; 12] = [
    "c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8", "c9", "c10", "c11",
];

fn channel_names(channels: usize) -> Vec<ParsedNode> {
    (0..channels)
        .map(|c| ParsedNode::new("channel_name").with_field("name", format!("ch{c}")))
        .collect()
}

pub fn device_description(channels: usize) -> ParsedNode {
    ParsedNode::new("device_description")
        .with_field("id", 9)
        .with_field("name", "emg")
        .with_field("serial", "EMG-9")
        .with_field("device_type", 2)
        .with_field("channel_data_type", 0)
        .with_group("channels", channel_names(channels))
}

pub fn camera_description(cameras: usize) -> ParsedNode {
    let cameras = (0..cameras)
        .map(|c| {
            ParsedNode::new("camera")
                .with_field("name", format!("cam{c}"))
                .with_field("x", c as f32)
                .with_field("y", 2.0f32)
                .with_field("z", 3.0f32)
                .with_field("qx", 0.0f32)
                .with_field("qy", 0.0f32)
                .with_field("qz", 0.0f32)
                .with_field("qw", 1.0f32)
        })
        .collect();
    ParsedNode::new("camera_description").with_group("cameras", cameras)
}

pub fn asset_description(bodies: i32, markers: i32) -> ParsedNode {
    ParsedNode::new("asset_description")
        .with_field("name", "prop")
        .with_field("asset_type", 1)
        .with_field("id", 500)
        .with_group(
            "rigid_bodies",
            (0..bodies).map(|b| rigid_body_description(b, 1)).collect(),
        )
        .with_group(
            "markers",
            (0..markers)
                .map(|m| {
                    ParsedNode::new("asset_marker_description")
                        .with_field("id", m)
                        .with_field("name", format!("am{m}"))
                })
                .collect(),
        )
}

/// Model definition with every verified dataset kind.
pub fn full_model_definition() -> Vec<u8> {
    encode_model_definitions(
        &SchemaRegistry::descriptions(),
        &[
            (AssetType::MarkerSet, marker_set_description("left", 3)),
            (AssetType::MarkerSet, marker_set_description("right", 3)),
            (AssetType::RigidBody, rigid_body_description(1, 4)),
            (AssetType::Skeleton, skeleton_description(2, 2)),
            (AssetType::Device, device_description(3)),
            (AssetType::Camera, camera_description(2)),
            (AssetType::AssetRigidBody, asset_description(1, 2)),
        ],
    )
    .unwrap()
}

pub fn message(message_id: u16, payload: &[u8]) -> Vec<u8> {
    encode_message(message_id, payload).unwrap()
}

pub fn server_info(version: ProtocolVersion) -> Vec<u8> {
    message(
        message::MSG_SERVER_INFO,
        &server_info_payload("Motive", version),
    )
}

/// Ethernet/IPv4/UDP frame carrying `payload` between the two ports.
pub fn udp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [1, 0, 94, 127, 0, 1])
        .ipv4([192, 168, 1, 10], [239, 255, 42, 99], 64)
        .udp(src_port, dst_port);
    let mut packet = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut packet, payload).unwrap();
    packet
}

/// Minimal little-endian PCAPNG: section header, one Ethernet interface,
/// one enhanced packet block per frame.
pub fn write_pcapng(path: &Path, frames: &[Vec<u8>]) {
    let mut out = Vec::new();
    let mut shb = Vec::new();
    shb.extend_from_slice(&0x1A2B_3C4Du32.to_le_bytes());
    shb.extend_from_slice(&1u16.to_le_bytes());
    shb.extend_from_slice(&0u16.to_le_bytes());
    shb.extend_from_slice(&(-1i64).to_le_bytes());
    out.extend(pcapng_block(0x0A0D_0D0A, &shb));

    let mut idb = Vec::new();
    idb.extend_from_slice(&1u16.to_le_bytes());
    idb.extend_from_slice(&0u16.to_le_bytes());
    idb.extend_from_slice(&65535u32.to_le_bytes());
    out.extend(pcapng_block(1, &idb));

    for (idx, frame) in frames.iter().enumerate() {
        let ts_us = 1_700_000_000_000_000u64 + idx as u64 * 8_333;
        let mut epb = Vec::new();
        epb.extend_from_slice(&0u32.to_le_bytes());
        epb.extend_from_slice(&((ts_us >> 32) as u32).to_le_bytes());
        epb.extend_from_slice(&(ts_us as u32).to_le_bytes());
        epb.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        epb.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        epb.extend_from_slice(frame);
        epb.resize(epb.len() + (4 - frame.len() % 4) % 4, 0);
        out.extend(pcapng_block(6, &epb));
    }
    fs::write(path, out).unwrap();
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (12 + body.len()) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_le_bytes());
    block.extend_from_slice(&total_len.to_le_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_le_bytes());
    block
}
