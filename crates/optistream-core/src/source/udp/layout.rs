/// UDP header length in bytes.
pub const UDP_HEADER_LEN: usize = 8;
