//! Framing of the messages carried in each UDP datagram:
//! `message_id:u16`, `payload_size:u16`, then `payload_size` bytes.

pub const MESSAGE_ID_RANGE: std::ops::Range<usize> = 0..2;
pub const PAYLOAD_SIZE_RANGE: std::ops::Range<usize> = 2..4;
pub const HEADER_LEN: usize = 4;

pub const MSG_SERVER_INFO: u16 = 1;
pub const MSG_MODEL_DEFINITION: u16 = 5;
pub const MSG_FRAME_OF_DATA: u16 = 7;

/// Server-info payload: zero-padded sender name, app version, protocol
/// version.
pub const SERVER_NAME_LEN: usize = 256;
pub const APP_VERSION_RANGE: std::ops::Range<usize> = 256..260;
pub const PROTOCOL_VERSION_RANGE: std::ops::Range<usize> = 260..264;
pub const SERVER_INFO_LEN: usize = 264;
