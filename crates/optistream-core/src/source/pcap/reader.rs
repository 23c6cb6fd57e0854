use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::error::PcapSourceError;
use super::layout;

/// Peek the capture's magic number so the right `pcap-parser` reader can be
/// chosen, leaving the file positioned at its start.
///
/// # Errors
/// Returns `PcapSourceError::Io` when the file is shorter than four bytes or
/// cannot be rewound.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], PcapSourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Link type of the interface a packet was captured on.
///
/// Captures of a Motive host taken with a missing or stripped interface
/// block are assumed to be Ethernet.
pub fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    linktypes
        .get(if_id as usize)
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

/// PCAPNG high/low timestamp to seconds, assuming the default microsecond
/// resolution. NatNet frames at 120 Hz or more stay distinguishable.
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let ts = (u64::from(ts_high) << 32) | u64::from(ts_low);
    ts as f64 * 1e-6
}

pub fn legacy_ts_to_seconds(ts_sec: u32, ts_usec: u32) -> f64 {
    f64::from(ts_sec) + f64::from(ts_usec) * 1e-6
}

#[cfg(test)]
mod tests {
    use super::{
        is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
        read_magic_and_rewind,
    };
    use crate::source::pcap::error::PcapSourceError;
    use pcap_parser::Linktype;
    use std::io::{Cursor, Read};

    #[test]
    fn detects_pcapng_but_not_legacy_magic() {
        assert!(is_pcapng_magic(&super::layout::PCAPNG_MAGIC));
        assert!(!is_pcapng_magic(&[0xd4, 0xc3, 0xb2, 0xa1]));
    }

    #[test]
    fn read_magic_rewinds() {
        let mut cursor = Cursor::new([0x0a, 0x0d, 0x0d, 0x0a, 0x01]);
        let magic = read_magic_and_rewind(&mut cursor).unwrap();
        assert_eq!(magic, [0x0a, 0x0d, 0x0d, 0x0a]);
        let mut first = [0u8; 1];
        cursor.read_exact(&mut first).unwrap();
        assert_eq!(first[0], 0x0a);
    }

    #[test]
    fn read_magic_too_short() {
        let mut cursor = Cursor::new([0x0a, 0x0d, 0x0d]);
        let err = read_magic_and_rewind(&mut cursor).unwrap_err();
        assert!(matches!(err, PcapSourceError::Io(_)));
    }

    #[test]
    fn packet_on_undeclared_interface_is_ethernet() {
        let linktypes = [Linktype::RAW];
        assert_eq!(linktype_for_interface(&linktypes, 0), Linktype::RAW);
        assert_eq!(linktype_for_interface(&linktypes, 1), Linktype::ETHERNET);
    }

    #[test]
    fn timestamps_convert_to_seconds() {
        assert!((pcapng_ts_to_seconds(0, 1_500_000) - 1.5).abs() < f64::EPSILON);
        // consecutive 120 Hz frames
        let gap = pcapng_ts_to_seconds(0, 1_008_333) - pcapng_ts_to_seconds(0, 1_000_000);
        assert!((gap - 0.008_333).abs() < 1e-9);
        assert!((legacy_ts_to_seconds(2, 250_000) - 2.25).abs() < f64::EPSILON);
    }
}
