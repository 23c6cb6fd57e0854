//! UDP extraction from link-layer frames.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::UdpError;
pub use parser::{UdpPacket, parse_udp_packet};
