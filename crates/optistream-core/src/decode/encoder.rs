use super::error::EncodeError;
use super::node::ParsedNode;
use crate::record::Value;
use crate::schema::{Field, LayoutDescriptor, Primitive};

/// Write `node` back through `layout`; the inverse of `decode`.
///
/// Used to build fixtures and replay captures. Group counts come from the
/// node's children; fixed groups must already have the declared length.
pub fn encode(layout: &LayoutDescriptor, node: &ParsedNode) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(layout.min_encoded_len());
    encode_into(layout, node, &mut out)?;
    Ok(out)
}

/// Append the encoding of `node` to `out`.
pub fn encode_into(
    layout: &LayoutDescriptor,
    node: &ParsedNode,
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    for field in layout.fields {
        match *field {
            Field::Scalar(name, encoding) => {
                let value = node.field(name).ok_or(EncodeError::MissingField {
                    layout: layout.name,
                    field: name,
                })?;
                encode_value(name, encoding, value, out)?;
            }
            Field::Group(name, nested) => {
                let children = node.children(name);
                let count = i32::try_from(children.len())
                    .map_err(|_| EncodeError::CountOverflow { group: name })?;
                out.extend_from_slice(&count.to_le_bytes());
                for child in children {
                    encode_into(nested, child, out)?;
                }
            }
            Field::Fixed(name, expected, nested) => {
                let children = node.children(name);
                if children.len() != expected {
                    return Err(EncodeError::FixedCountMismatch {
                        group: name,
                        expected,
                        actual: children.len(),
                    });
                }
                for child in children {
                    encode_into(nested, child, out)?;
                }
            }
            Field::Sentinel(_, value) => out.extend_from_slice(&value.to_le_bytes()),
        }
    }
    Ok(())
}

fn encode_value(
    field: &'static str,
    encoding: Primitive,
    value: &Value,
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let mismatch = || EncodeError::TypeMismatch { field, encoding };
    let out_of_range = || EncodeError::OutOfRange { field, encoding };

    match encoding {
        Primitive::I16 => {
            let v = value.as_i64().ok_or_else(mismatch)?;
            let v = i16::try_from(v).map_err(|_| out_of_range())?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        Primitive::U16 => {
            let v = value.as_u64().ok_or_else(mismatch)?;
            let v = u16::try_from(v).map_err(|_| out_of_range())?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        Primitive::I32 => {
            let v = value.as_i64().ok_or_else(mismatch)?;
            let v = i32::try_from(v).map_err(|_| out_of_range())?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        Primitive::U32 => {
            let v = value.as_u64().ok_or_else(mismatch)?;
            let v = u32::try_from(v).map_err(|_| out_of_range())?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        Primitive::U64 => {
            let v = value.as_u64().ok_or_else(mismatch)?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        Primitive::F32 => {
            let v = value.as_f64().ok_or_else(mismatch)?;
            out.extend_from_slice(&(v as f32).to_le_bytes());
        }
        Primitive::F64 => {
            let v = value.as_f64().ok_or_else(mismatch)?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        Primitive::CString => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if text.as_bytes().contains(&0) {
                return Err(EncodeError::InteriorNul { field });
            }
            out.extend_from_slice(text.as_bytes());
            out.push(0);
        }
        Primitive::PString => {
            let text = value.as_str().ok_or_else(mismatch)?;
            let len = u32::try_from(text.len()).map_err(|_| out_of_range())?;
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(text.as_bytes());
        }
    }
    Ok(())
}
