//! Wire layouts for the supported protocol version (source of truth).
//!
//! Data-frame layouts describe one section of a frame-of-data payload;
//! description layouts describe one dataset of a model-definition payload.

use super::descriptor::Field::{Fixed, Group, Scalar, Sentinel};
use super::descriptor::LayoutDescriptor;
use super::descriptor::Primitive::{CString, F32, F64, I16, I32, U32, U64};

// Frame-of-data sections.

pub static FRAME_PREFIX: LayoutDescriptor = LayoutDescriptor {
    name: "frame_prefix",
    fields: &[Scalar("frame_number", I32)],
    verified: true,
};

pub static MARKER_POSITION: LayoutDescriptor = LayoutDescriptor {
    name: "marker_position",
    fields: &[Scalar("x", F32), Scalar("y", F32), Scalar("z", F32)],
    verified: true,
};

pub static MARKER_SET_DATA: LayoutDescriptor = LayoutDescriptor {
    name: "marker_set",
    fields: &[Scalar("name", CString), Group("markers", &MARKER_POSITION)],
    verified: true,
};

pub static MARKER_SETS: LayoutDescriptor = LayoutDescriptor {
    name: "marker_sets",
    fields: &[Group("marker_sets", &MARKER_SET_DATA)],
    verified: true,
};

pub static LEGACY_MARKER_SET: LayoutDescriptor = LayoutDescriptor {
    name: "legacy_marker_set",
    fields: &[Group("markers", &MARKER_POSITION)],
    verified: false,
};

pub static RIGID_BODY_DATA: LayoutDescriptor = LayoutDescriptor {
    name: "rigid_body",
    fields: &[
        Scalar("id", I32),
        Scalar("x", F32),
        Scalar("y", F32),
        Scalar("z", F32),
        Scalar("qx", F32),
        Scalar("qy", F32),
        Scalar("qz", F32),
        Scalar("qw", F32),
        Scalar("mean_error", F32),
        Scalar("params", I16),
    ],
    verified: true,
};

pub static RIGID_BODIES: LayoutDescriptor = LayoutDescriptor {
    name: "rigid_bodies",
    fields: &[Group("rigid_bodies", &RIGID_BODY_DATA)],
    verified: true,
};

pub static SKELETON_DATA: LayoutDescriptor = LayoutDescriptor {
    name: "skeleton",
    fields: &[Scalar("id", I32), Group("rigid_bodies", &RIGID_BODY_DATA)],
    verified: true,
};

pub static SKELETONS: LayoutDescriptor = LayoutDescriptor {
    name: "skeletons",
    fields: &[Group("skeletons", &SKELETON_DATA)],
    verified: true,
};

pub static LABELED_MARKER_DATA: LayoutDescriptor = LayoutDescriptor {
    name: "labeled_marker",
    fields: &[
        Scalar("id", I32),
        Scalar("x", F32),
        Scalar("y", F32),
        Scalar("z", F32),
        Scalar("size", F32),
        Scalar("params", I16),
        Scalar("residual", F32),
    ],
    verified: true,
};

pub static LABELED_MARKERS: LayoutDescriptor = LayoutDescriptor {
    name: "labeled_markers",
    fields: &[Group("markers", &LABELED_MARKER_DATA)],
    verified: true,
};

/// One asset carries two independent child groups: rigid bodies and markers.
pub static ASSET_DATA: LayoutDescriptor = LayoutDescriptor {
    name: "asset",
    fields: &[
        Scalar("id", I32),
        Group("rigid_bodies", &RIGID_BODY_DATA),
        Group("markers", &LABELED_MARKER_DATA),
    ],
    verified: true,
};

pub static ASSETS: LayoutDescriptor = LayoutDescriptor {
    name: "assets",
    fields: &[Group("assets", &ASSET_DATA)],
    verified: true,
};

pub static CHANNEL_SAMPLE: LayoutDescriptor = LayoutDescriptor {
    name: "channel_sample",
    fields: &[Scalar("value", F32)],
    verified: true,
};

pub static CHANNEL_DATA: LayoutDescriptor = LayoutDescriptor {
    name: "channel",
    fields: &[Group("frames", &CHANNEL_SAMPLE)],
    verified: true,
};

pub static CHANNEL_DEVICE_DATA: LayoutDescriptor = LayoutDescriptor {
    name: "channel_device",
    fields: &[Scalar("id", I32), Group("channels", &CHANNEL_DATA)],
    verified: true,
};

pub static FORCE_PLATES: LayoutDescriptor = LayoutDescriptor {
    name: "force_plates",
    fields: &[Group("plates", &CHANNEL_DEVICE_DATA)],
    verified: true,
};

pub static DEVICES: LayoutDescriptor = LayoutDescriptor {
    name: "devices",
    fields: &[Group("devices", &CHANNEL_DEVICE_DATA)],
    verified: true,
};

pub static FRAME_SUFFIX: LayoutDescriptor = LayoutDescriptor {
    name: "frame_suffix",
    fields: &[
        Scalar("timecode", U32),
        Scalar("timecode_sub", U32),
        Scalar("timestamp", F64),
        Scalar("camera_mid_exposure", U64),
        Scalar("data_received", U64),
        Scalar("transmit", U64),
        Scalar("precision_seconds", U32),
        Scalar("precision_fraction", U32),
        Scalar("params", I16),
        Sentinel("end_of_data", END_OF_DATA),
    ],
    verified: true,
};

/// Value of the trailing sentinel closing every frame of data.
pub const END_OF_DATA: i32 = 0;

// Model-definition datasets.

pub static MARKER_NAME: LayoutDescriptor = LayoutDescriptor {
    name: "marker_name",
    fields: &[Scalar("name", CString)],
    verified: true,
};

pub static MARKER_SET_DESCRIPTION: LayoutDescriptor = LayoutDescriptor {
    name: "marker_set_description",
    fields: &[Scalar("name", CString), Group("markers", &MARKER_NAME)],
    verified: true,
};

pub static RIGID_BODY_MARKER_DESCRIPTION: LayoutDescriptor = LayoutDescriptor {
    name: "rigid_body_marker_description",
    fields: &[
        Scalar("x", F32),
        Scalar("y", F32),
        Scalar("z", F32),
        Scalar("active_label", I32),
        Scalar("name", CString),
    ],
    verified: true,
};

pub static RIGID_BODY_DESCRIPTION: LayoutDescriptor = LayoutDescriptor {
    name: "rigid_body_description",
    fields: &[
        Scalar("name", CString),
        Scalar("id", I32),
        Scalar("parent_id", I32),
        Scalar("x", F32),
        Scalar("y", F32),
        Scalar("z", F32),
        Group("markers", &RIGID_BODY_MARKER_DESCRIPTION),
    ],
    verified: true,
};

pub static SKELETON_DESCRIPTION: LayoutDescriptor = LayoutDescriptor {
    name: "skeleton_description",
    fields: &[
        Scalar("name", CString),
        Scalar("id", I32),
        Group("rigid_bodies", &RIGID_BODY_DESCRIPTION),
    ],
    verified: true,
};

pub static CALIBRATION_ROW: LayoutDescriptor = LayoutDescriptor {
    name: "calibration_row",
    fields: &[
        Scalar("c0", F32),
        Scalar("c1", F32),
        Scalar("c2", F32),
        Scalar("c3", F32),
        Scalar("c4", F32),
        Scalar("c5", F32),
        Scalar("c6", F32),
        Scalar("c7", F32),
        Scalar("c8", F32),
        Scalar("c9", F32),
        Scalar("c10", F32),
        Scalar("c11", F32),
    ],
    verified: true,
};

pub const CALIBRATION_ROWS: usize = 12;
pub const PLATE_CORNERS: usize = 4;

pub static CHANNEL_NAME: LayoutDescriptor = LayoutDescriptor {
    name: "channel_name",
    fields: &[Scalar("name", CString)],
    verified: true,
};

/// Calibration matrix and corner ordering have never been confirmed against
/// a live plate.
pub static FORCE_PLATE_DESCRIPTION: LayoutDescriptor = LayoutDescriptor {
    name: "force_plate_description",
    fields: &[
        Scalar("id", I32),
        Scalar("serial", CString),
        Scalar("width", F32),
        Scalar("length", F32),
        Scalar("origin_x", F32),
        Scalar("origin_y", F32),
        Scalar("origin_z", F32),
        Fixed("calibration", CALIBRATION_ROWS, &CALIBRATION_ROW),
        Fixed("corners", PLATE_CORNERS, &MARKER_POSITION),
        Scalar("plate_type", I32),
        Scalar("channel_data_type", I32),
        Group("channels", &CHANNEL_NAME),
    ],
    verified: false,
};

pub static DEVICE_DESCRIPTION: LayoutDescriptor = LayoutDescriptor {
    name: "device_description",
    fields: &[
        Scalar("id", I32),
        Scalar("name", CString),
        Scalar("serial", CString),
        Scalar("device_type", I32),
        Scalar("channel_data_type", I32),
        Group("channels", &CHANNEL_NAME),
    ],
    verified: true,
};

pub static CAMERA_ENTRY: LayoutDescriptor = LayoutDescriptor {
    name: "camera",
    fields: &[
        Scalar("name", CString),
        Scalar("x", F32),
        Scalar("y", F32),
        Scalar("z", F32),
        Scalar("qx", F32),
        Scalar("qy", F32),
        Scalar("qz", F32),
        Scalar("qw", F32),
    ],
    verified: true,
};

pub static CAMERA_DESCRIPTION: LayoutDescriptor = LayoutDescriptor {
    name: "camera_description",
    fields: &[Group("cameras", &CAMERA_ENTRY)],
    verified: true,
};

pub static ASSET_MARKER_DESCRIPTION: LayoutDescriptor = LayoutDescriptor {
    name: "asset_marker_description",
    fields: &[Scalar("id", I32), Scalar("name", CString)],
    verified: true,
};

pub static ASSET_DESCRIPTION: LayoutDescriptor = LayoutDescriptor {
    name: "asset_description",
    fields: &[
        Scalar("name", CString),
        Scalar("asset_type", I32),
        Scalar("id", I32),
        Group("rigid_bodies", &RIGID_BODY_DESCRIPTION),
        Group("markers", &ASSET_MARKER_DESCRIPTION),
    ],
    verified: true,
};

// Model-definition dataset type ids.
pub const DATASET_MARKER_SET: i32 = 0;
pub const DATASET_RIGID_BODY: i32 = 1;
pub const DATASET_SKELETON: i32 = 2;
pub const DATASET_FORCE_PLATE: i32 = 3;
pub const DATASET_DEVICE: i32 = 4;
pub const DATASET_CAMERA: i32 = 5;
pub const DATASET_ASSET: i32 = 6;
