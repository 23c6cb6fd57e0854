use super::error::UdpError;
use super::layout;

/// Bounds-checked view of a raw UDP datagram (header included).
pub struct DatagramReader<'a> {
    datagram: &'a [u8],
}

impl<'a> DatagramReader<'a> {
    pub fn new(datagram: &'a [u8]) -> Self {
        Self { datagram }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), UdpError> {
        if self.datagram.len() < needed {
            return Err(UdpError::TooShort {
                needed,
                actual: self.datagram.len(),
            });
        }
        Ok(())
    }

    /// Bytes after the 8-byte UDP header.
    pub fn payload(&self) -> Result<&'a [u8], UdpError> {
        self.require_len(layout::UDP_HEADER_LEN)?;
        self.datagram
            .get(layout::UDP_HEADER_LEN..)
            .ok_or(UdpError::TooShort {
                needed: layout::UDP_HEADER_LEN,
                actual: self.datagram.len(),
            })
    }
}
