//! Where buffers come from.
//!
//! `PacketSource` yields raw link-layer frames from a capture; `Transport`
//! yields decoded-ready stream events (one per frame-of-data or
//! model-definition message) to the streaming coordinator. `PcapReplay`
//! bridges the two.

pub mod message;
pub mod pcap;
pub mod queue;
pub mod replay;
pub mod udp;

use std::fmt;

use pcap_parser::Linktype;
use serde::Serialize;
use thiserror::Error;

use crate::asset::RegistryKind;

pub use pcap::PcapFileSource;
pub use queue::QueueTransport;
pub use replay::{PcapReplay, ReplayStats};

#[derive(Debug, Clone)]
pub struct PacketEvent {
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

/// Protocol version announced by the server, as four version bytes
/// (major, minor, build, revision).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProtocolVersion(pub [u8; 4]);

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, build, revision] = self.0;
        write!(f, "{major}.{minor}.{build}.{revision}")
    }
}

/// One buffer delivered by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    pub kind: RegistryKind,
    pub payload: Vec<u8>,
    /// Carried for every buffer; layouts are not selected by version.
    pub version: ProtocolVersion,
    pub ts: Option<f64>,
}

impl StreamEvent {
    pub fn frame(payload: Vec<u8>) -> Self {
        Self {
            kind: RegistryKind::DataFrame,
            payload,
            version: ProtocolVersion::default(),
            ts: None,
        }
    }

    pub fn description(payload: Vec<u8>) -> Self {
        Self {
            kind: RegistryKind::Description,
            payload,
            version: ProtocolVersion::default(),
            ts: None,
        }
    }
}

/// Serialized buffer delivery. Implementations hand out one event at a time,
/// so no two decodes ever overlap.
pub trait Transport {
    /// Prepare delivery. `Ok(false)` means the handshake was refused.
    fn start(&mut self) -> Result<bool, SourceError>;

    /// Next buffer, or `None` once the transport is exhausted or stopped.
    fn next_event(&mut self) -> Result<Option<StreamEvent>, SourceError>;

    /// Halt delivery; later `next_event` calls return `None`.
    fn stop(&mut self);
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
            truncated @ pcap::error::PcapSourceError::Truncated { .. } => {
                SourceError::Pcap(truncated.to_string())
            }
        }
    }
}
