use super::error::DecodeError;
use crate::record::Value;
use crate::schema::Primitive;
use crate::schema::descriptor::PSTRING_LEN_WIDTH;

/// Bounds-checked little-endian access to a payload.
pub struct ByteReader<'a> {
    payload: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn remaining(&self, offset: usize) -> usize {
        self.payload.len().saturating_sub(offset)
    }

    pub fn read_slice(&self, offset: usize, len: usize) -> Result<&'a [u8], DecodeError> {
        offset
            .checked_add(len)
            .and_then(|end| self.payload.get(offset..end))
            .ok_or(DecodeError::TooShort {
                offset,
                needed: len,
                actual: self.remaining(offset),
            })
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_slice(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16, DecodeError> {
        self.read_array(offset).map(i16::from_le_bytes)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, DecodeError> {
        self.read_array(offset).map(u16::from_le_bytes)
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32, DecodeError> {
        self.read_array(offset).map(i32::from_le_bytes)
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, DecodeError> {
        self.read_array(offset).map(u32::from_le_bytes)
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64, DecodeError> {
        self.read_array(offset).map(u64::from_le_bytes)
    }

    pub fn read_f32(&self, offset: usize) -> Result<f32, DecodeError> {
        self.read_array(offset).map(f32::from_le_bytes)
    }

    pub fn read_f64(&self, offset: usize) -> Result<f64, DecodeError> {
        self.read_array(offset).map(f64::from_le_bytes)
    }

    /// NUL-terminated UTF-8 string; the returned width includes the NUL.
    pub fn read_cstring(&self, offset: usize) -> Result<(&'a str, usize), DecodeError> {
        let tail = self.payload.get(offset..).unwrap_or(&[]);
        let end = tail
            .iter()
            .position(|&byte| byte == 0)
            .ok_or(DecodeError::UnterminatedString { offset })?;
        let text =
            std::str::from_utf8(&tail[..end]).map_err(|_| DecodeError::InvalidUtf8 { offset })?;
        Ok((text, end + 1))
    }

    /// `u32`-length-prefixed UTF-8 string; the returned width includes the
    /// prefix.
    pub fn read_pstring(&self, offset: usize) -> Result<(&'a str, usize), DecodeError> {
        let len = self.read_u32(offset)? as usize;
        let bytes = self.read_slice(offset + PSTRING_LEN_WIDTH, len)?;
        let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset })?;
        Ok((text, PSTRING_LEN_WIDTH + len))
    }

    /// Read one scalar and return it with the number of bytes it occupied.
    pub fn read_value(
        &self,
        offset: usize,
        encoding: Primitive,
    ) -> Result<(Value, usize), DecodeError> {
        let value = match encoding {
            Primitive::I16 => Value::Int(self.read_i16(offset)?.into()),
            Primitive::U16 => Value::UInt(self.read_u16(offset)?.into()),
            Primitive::I32 => Value::Int(self.read_i32(offset)?.into()),
            Primitive::U32 => Value::UInt(self.read_u32(offset)?.into()),
            Primitive::U64 => Value::UInt(self.read_u64(offset)?),
            Primitive::F32 => Value::Float(self.read_f32(offset)?.into()),
            Primitive::F64 => Value::Float(self.read_f64(offset)?),
            Primitive::CString => {
                let (text, width) = self.read_cstring(offset)?;
                return Ok((Value::Text(text.to_string()), width));
            }
            Primitive::PString => {
                let (text, width) = self.read_pstring(offset)?;
                return Ok((Value::Text(text.to_string()), width));
            }
        };
        let width = encoding.width().unwrap_or(0);
        Ok((value, width))
    }
}

#[cfg(test)]
mod tests {
    use super::ByteReader;
    use crate::decode::error::DecodeError;
    use crate::record::Value;
    use crate::schema::Primitive;

    #[test]
    fn reads_little_endian_scalars() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(-2i16).to_le_bytes());
        payload.extend_from_slice(&1.5f32.to_le_bytes());
        let reader = ByteReader::new(&payload);

        assert_eq!(reader.read_value(0, Primitive::I16).unwrap(), (Value::Int(-2), 2));
        assert_eq!(reader.read_value(2, Primitive::F32).unwrap(), (Value::Float(1.5), 4));
    }

    #[test]
    fn short_read_reports_offset() {
        let payload = [0u8; 3];
        let reader = ByteReader::new(&payload);
        let err = reader.read_i32(0).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                offset: 0,
                needed: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn cstring_width_includes_terminator() {
        let payload = b"Hip\0rest";
        let reader = ByteReader::new(payload);
        assert_eq!(reader.read_cstring(0).unwrap(), ("Hip", 4));
    }

    #[test]
    fn cstring_without_terminator_is_rejected() {
        let payload = b"Hip";
        let reader = ByteReader::new(payload);
        let err = reader.read_cstring(0).unwrap_err();
        assert!(matches!(err, DecodeError::UnterminatedString { offset: 0 }));
    }

    #[test]
    fn pstring_rejects_invalid_utf8() {
        let mut payload = 2u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0xff, 0xfe]);
        let reader = ByteReader::new(&payload);
        let err = reader.read_pstring(0).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUtf8 { offset: 0 }));
    }
}
