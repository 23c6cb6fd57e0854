use std::fs::File;
use std::path::Path;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader};

use crate::source::{PacketEvent, PacketSource, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
    read_magic_and_rewind,
};

/// Link-layer frames from a Motive session recorded to PCAP or PCAPNG.
///
/// Frames come back in capture order with their timestamp and link type;
/// picking out the NatNet command and data datagrams is left to
/// [`PcapReplay`](crate::source::PcapReplay).
pub struct PcapFileSource {
    inner: CaptureReader,
    packets_read: u64,
}

enum CaptureReader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Option<Linktype>,
    },
    Ng {
        reader: PcapNGReader<File>,
        linktypes: Vec<Linktype>,
    },
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let inner = open_reader(file)?;
        Ok(Self {
            inner,
            packets_read: 0,
        })
    }

    /// Link-layer frames handed out so far, NatNet or not.
    pub fn packets_read(&self) -> u64 {
        self.packets_read
    }
}

impl PacketSource for PcapFileSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        let event = next_packet(&mut self.inner)?;
        if event.is_some() {
            self.packets_read += 1;
        }
        Ok(event)
    }
}

fn open_reader(mut file: File) -> Result<CaptureReader, PcapSourceError> {
    let magic = read_magic_and_rewind(&mut file)?;
    if is_pcapng_magic(&magic) {
        let reader = PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
            .map_err(|e| PcapSourceError::pcap("pcapng reader init", e))?;
        Ok(CaptureReader::Ng {
            reader,
            linktypes: Vec::new(),
        })
    } else {
        let reader = LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
            .map_err(|e| PcapSourceError::pcap("pcap reader init", e))?;
        Ok(CaptureReader::Legacy {
            reader,
            linktype: None,
        })
    }
}

fn next_packet(reader: &mut CaptureReader) -> Result<Option<PacketEvent>, PcapSourceError> {
    match reader {
        CaptureReader::Legacy { reader, linktype } => pull(reader, "pcap", |block| match block {
            PcapBlockOwned::LegacyHeader(header) => {
                *linktype = Some(header.network);
                None
            }
            PcapBlockOwned::Legacy(packet) => Some(PacketEvent {
                ts: Some(legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec)),
                linktype: linktype.unwrap_or(Linktype::ETHERNET),
                data: packet.data.to_vec(),
            }),
            _ => None,
        }),
        CaptureReader::Ng { reader, linktypes } => pull(reader, "pcapng", |block| match block {
            PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                linktypes.push(intf.linktype);
                None
            }
            PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(PacketEvent {
                ts: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                linktype: linktype_for_interface(linktypes, packet.if_id),
                data: packet.data.to_vec(),
            }),
            _ => None,
        }),
    }
}

/// Advance `reader` until `on_block` yields a packet or the capture ends.
///
/// Section headers, interface blocks and statistics pass through
/// `on_block` too, so it can track per-capture link types.
fn pull<R, F>(
    reader: &mut R,
    context: &'static str,
    mut on_block: F,
) -> Result<Option<PacketEvent>, PcapSourceError>
where
    R: PcapReaderIterator,
    F: FnMut(PcapBlockOwned<'_>) -> Option<PacketEvent>,
{
    let mut stalled = 0;
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                stalled = 0;
                let event = on_block(block);
                reader.consume(offset);
                if event.is_some() {
                    return Ok(event);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                stalled += 1;
                if stalled > layout::MAX_STALLED_REFILLS {
                    return Err(PcapSourceError::Truncated { context });
                }
                reader
                    .refill()
                    .map_err(|e| PcapSourceError::pcap(context, e))?;
            }
            Err(e) => return Err(PcapSourceError::pcap(context, e)),
        }
    }
}
