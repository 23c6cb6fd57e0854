use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use super::message::{Message, parse_message};
use super::udp::parse_udp_packet;
use super::{
    PacketSource, PcapFileSource, ProtocolVersion, SourceError, StreamEvent, Transport,
};
use crate::asset::RegistryKind;
use crate::session::SessionConfig;

/// Counters for datagrams the replay did not turn into events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub packets: u64,
    pub events: u64,
    pub non_udp: u64,
    pub other_ports: u64,
    pub malformed: u64,
    pub ignored_messages: u64,
}

/// Transport that replays a recorded capture.
///
/// Only UDP datagrams touching the configured data or command port are
/// considered. Server-info messages update the protocol version stamped on
/// later events; frame-of-data and model-definition messages become events.
pub struct PcapReplay {
    path: PathBuf,
    ports: [u16; 2],
    source: Option<PcapFileSource>,
    version: ProtocolVersion,
    stats: ReplayStats,
}

impl PcapReplay {
    pub fn new(path: impl Into<PathBuf>, config: &SessionConfig) -> Self {
        Self {
            path: path.into(),
            ports: [config.data_port, config.command_port],
            source: None,
            version: ProtocolVersion::default(),
            stats: ReplayStats::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last protocol version announced in the capture.
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    fn event_from_datagram(
        &mut self,
        datagram: &[u8],
        ts: Option<f64>,
    ) -> Option<StreamEvent> {
        let message = match parse_message(datagram) {
            Ok(message) => message,
            Err(err) => {
                self.stats.malformed += 1;
                warn!(error = %err, "skipping malformed message");
                return None;
            }
        };
        let (kind, payload) = match message {
            Message::ServerInfo {
                name,
                protocol_version,
                ..
            } => {
                debug!(server = %name, version = %protocol_version, "server info");
                self.version = protocol_version;
                return None;
            }
            Message::FrameOfData(payload) => (RegistryKind::DataFrame, payload),
            Message::ModelDefinition(payload) => (RegistryKind::Description, payload),
            Message::Other { message_id } => {
                self.stats.ignored_messages += 1;
                trace!(message_id, "ignoring message");
                return None;
            }
        };
        Some(StreamEvent {
            kind,
            payload: payload.to_vec(),
            version: self.version,
            ts,
        })
    }
}

impl Transport for PcapReplay {
    fn start(&mut self) -> Result<bool, SourceError> {
        self.source = Some(PcapFileSource::open(&self.path)?);
        self.version = ProtocolVersion::default();
        self.stats = ReplayStats::default();
        info!(path = %self.path.display(), "capture replay started");
        Ok(true)
    }

    fn next_event(&mut self) -> Result<Option<StreamEvent>, SourceError> {
        loop {
            let Some(source) = self.source.as_mut() else {
                return Ok(None);
            };
            let Some(packet) = source.next_packet()? else {
                self.source = None;
                return Ok(None);
            };
            self.stats.packets += 1;

            let udp = match parse_udp_packet(packet.linktype, &packet.data) {
                Ok(Some(udp)) => udp,
                Ok(None) => {
                    self.stats.non_udp += 1;
                    continue;
                }
                Err(err) => {
                    self.stats.malformed += 1;
                    debug!(error = %err, "skipping undecodable frame");
                    continue;
                }
            };
            if !udp.touches_any(&self.ports) {
                self.stats.other_ports += 1;
                continue;
            }

            if let Some(event) = self.event_from_datagram(udp.payload, packet.ts) {
                self.stats.events += 1;
                return Ok(Some(event));
            }
        }
    }

    fn stop(&mut self) {
        if self.source.take().is_some() {
            info!(events = self.stats.events, "capture replay stopped");
        }
    }
}
