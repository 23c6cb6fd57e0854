use super::error::MessageError;

pub struct MessageReader<'a> {
    bytes: &'a [u8],
}

impl<'a> MessageReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), MessageError> {
        if self.bytes.len() < needed {
            return Err(MessageError::TooShort {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], MessageError> {
        self.bytes
            .get(range.clone())
            .ok_or(MessageError::TooShort {
                needed: range.end,
                actual: self.bytes.len(),
            })
    }

    pub fn read_u16_le(&self, range: std::ops::Range<usize>) -> Result<u16, MessageError> {
        let bytes = self.read_slice(range)?;
        match bytes {
            [lo, hi] => Ok(u16::from_le_bytes([*lo, *hi])),
            _ => Err(MessageError::TooShort {
                needed: 2,
                actual: bytes.len(),
            }),
        }
    }

    pub fn read_array4(&self, range: std::ops::Range<usize>) -> Result<[u8; 4], MessageError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| MessageError::TooShort {
            needed: 4,
            actual: bytes.len(),
        })
    }

    /// Text up to the first NUL within `range`, lossily decoded.
    pub fn read_padded_text(&self, range: std::ops::Range<usize>) -> Result<String, MessageError> {
        let bytes = self.read_slice(range)?;
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::MessageReader;
    use crate::source::message::error::MessageError;

    #[test]
    fn padded_text_stops_at_nul() {
        let bytes = b"Motive\0\0junk";
        let reader = MessageReader::new(bytes);
        assert_eq!(reader.read_padded_text(0..12).unwrap(), "Motive");
    }

    #[test]
    fn read_past_end_reports_needed_len() {
        let reader = MessageReader::new(&[1, 2, 3]);
        let err = reader.read_u16_le(2..4).unwrap_err();
        assert!(matches!(err, MessageError::TooShort { needed: 4, actual: 3 }));
    }
}
