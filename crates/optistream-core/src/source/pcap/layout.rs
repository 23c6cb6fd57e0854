/// Section header block type, as read from the first four bytes of a PCAPNG
/// file.
pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

/// Read buffer handed to `pcap-parser`.
pub const PCAP_READER_BUFFER_SIZE: usize = 64 * 1024;

/// Consecutive `Incomplete` results tolerated before the capture is treated
/// as cut off inside a block. One refill always suffices for a block that
/// fits the read buffer.
pub const MAX_STALLED_REFILLS: u32 = 2;
