use super::error::DecodeError;
use super::node::ParsedNode;
use super::reader::ByteReader;
use crate::asset::AssetType;
use crate::schema::descriptor::GROUP_COUNT_WIDTH;
use crate::schema::{Field, LayoutDescriptor, SchemaRegistry};

/// Decode one instance of `layout` starting at `start_cursor`.
///
/// Returns the parsed tree and the cursor right after it. The function is
/// pure: the same buffer and cursor always give the same result.
///
/// # Errors
/// Returns a `MalformedStream`-kind `DecodeError` when a read would run past
/// the buffer end, a group count is negative or cannot fit in what is left,
/// a string is unterminated or not UTF-8, or a sentinel does not match.
pub fn decode(
    layout: &'static LayoutDescriptor,
    buffer: &[u8],
    start_cursor: usize,
) -> Result<(ParsedNode, usize), DecodeError> {
    if start_cursor > buffer.len() {
        return Err(DecodeError::CursorOutOfRange {
            cursor: start_cursor,
            len: buffer.len(),
        });
    }
    let reader = ByteReader::new(buffer);
    let mut cursor = start_cursor;
    let node = decode_node(&reader, layout, &mut cursor)?;
    Ok((node, cursor))
}

/// Look up the layout for `tag` in `registry`, then decode with it.
///
/// # Errors
/// Returns `DecodeError::Schema` (`UnknownAssetType`) when the registry has
/// no layout for `tag`, otherwise the errors of [`decode`].
pub fn decode_asset(
    registry: &SchemaRegistry,
    tag: AssetType,
    buffer: &[u8],
    start_cursor: usize,
) -> Result<(ParsedNode, usize), DecodeError> {
    let layout = registry.get_layout(tag)?;
    decode(layout, buffer, start_cursor)
}

fn decode_node(
    reader: &ByteReader<'_>,
    layout: &'static LayoutDescriptor,
    cursor: &mut usize,
) -> Result<ParsedNode, DecodeError> {
    let anchor = *cursor;
    let mut node = ParsedNode::new(layout.name);

    for field in layout.fields {
        match *field {
            Field::Scalar(name, encoding) => {
                let (value, width) = reader.read_value(*cursor, encoding)?;
                *cursor += width;
                node.push_field(name, value);
            }
            Field::Group(name, nested) => {
                let count_offset = *cursor;
                let count = reader.read_i32(count_offset)?;
                *cursor += GROUP_COUNT_WIDTH;
                let count = checked_count(reader, name, nested, count, count_offset, *cursor)?;
                let children = decode_children(reader, nested, count, cursor)?;
                node.push_group(name, children);
            }
            Field::Fixed(name, count, nested) => {
                let children = decode_children(reader, nested, count, cursor)?;
                node.push_group(name, children);
            }
            Field::Sentinel(name, expected) => {
                let actual = reader.read_i32(*cursor)?;
                if actual != expected {
                    return Err(DecodeError::UnexpectedValue {
                        field: name,
                        offset: *cursor,
                        expected,
                        actual,
                    });
                }
                *cursor += 4;
            }
        }
    }

    node.set_bookkeeping(anchor, *cursor);
    Ok(node)
}

fn decode_children(
    reader: &ByteReader<'_>,
    layout: &'static LayoutDescriptor,
    count: usize,
    cursor: &mut usize,
) -> Result<Vec<ParsedNode>, DecodeError> {
    let mut children = Vec::with_capacity(count);
    for _ in 0..count {
        children.push(decode_node(reader, layout, cursor)?);
    }
    Ok(children)
}

/// Reject counts that are negative or that could not fit in the bytes left
/// after the prefix, before anything is allocated for them.
fn checked_count(
    reader: &ByteReader<'_>,
    group: &'static str,
    nested: &LayoutDescriptor,
    count: i32,
    count_offset: usize,
    cursor: usize,
) -> Result<usize, DecodeError> {
    let count = usize::try_from(count).map_err(|_| DecodeError::NegativeCount {
        group,
        offset: count_offset,
        count,
    })?;
    let remaining = reader.remaining(cursor);
    let fits = count
        .checked_mul(nested.min_encoded_len())
        .is_some_and(|needed| needed <= remaining);
    if !fits {
        return Err(DecodeError::CountOverflow {
            group,
            offset: count_offset,
            count,
            remaining,
        });
    }
    Ok(count)
}
