/// Width of the `i32` count that prefixes every repeated group.
pub const GROUP_COUNT_WIDTH: usize = 4;
/// Width of the `u32` byte length that prefixes a `PString`.
pub const PSTRING_LEN_WIDTH: usize = 4;

/// Wire encoding of one scalar field. All multi-byte values are
/// little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    I16,
    U16,
    I32,
    U32,
    U64,
    F32,
    F64,
    /// UTF-8 terminated by a NUL byte.
    CString,
    /// UTF-8 prefixed by a `u32` byte length.
    PString,
}

impl Primitive {
    /// Fixed width in bytes, `None` for variable-length strings.
    pub fn width(self) -> Option<usize> {
        match self {
            Primitive::I16 | Primitive::U16 => Some(2),
            Primitive::I32 | Primitive::U32 | Primitive::F32 => Some(4),
            Primitive::U64 | Primitive::F64 => Some(8),
            Primitive::CString | Primitive::PString => None,
        }
    }

    /// Smallest number of bytes any encoding of this primitive occupies.
    pub fn min_width(self) -> usize {
        match self {
            Primitive::CString => 1,
            Primitive::PString => PSTRING_LEN_WIDTH,
            other => other.width().unwrap_or(0),
        }
    }
}

/// One entry of a layout, in wire order.
#[derive(Debug, Clone, Copy)]
pub enum Field {
    /// Leaf value surfaced in the parsed tree.
    Scalar(&'static str, Primitive),
    /// `i32` count followed by that many nested instances.
    Group(&'static str, &'static LayoutDescriptor),
    /// Nested instances repeated a fixed number of times, no prefix.
    Fixed(&'static str, usize, &'static LayoutDescriptor),
    /// `i32` that must equal the given value; consumed, never surfaced.
    Sentinel(&'static str, i32),
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Scalar(name, _)
            | Field::Group(name, _)
            | Field::Fixed(name, _, _)
            | Field::Sentinel(name, _) => name,
        }
    }

    fn min_encoded_len(&self) -> usize {
        match self {
            Field::Scalar(_, encoding) => encoding.min_width(),
            Field::Group(_, _) => GROUP_COUNT_WIDTH,
            Field::Fixed(_, count, layout) => count * layout.min_encoded_len(),
            Field::Sentinel(_, _) => 4,
        }
    }
}

/// Ordered byte-level description of one structure on the wire.
#[derive(Debug)]
pub struct LayoutDescriptor {
    pub name: &'static str,
    pub fields: &'static [Field],
    /// `false` when the layout could not be checked against a real server;
    /// content decoded through it is refused unless the session opts in.
    pub verified: bool,
}

impl LayoutDescriptor {
    /// Smallest encoded size of one instance, used to reject group counts
    /// that cannot possibly fit in the remaining buffer.
    pub fn min_encoded_len(&self) -> usize {
        self.fields.iter().map(Field::min_encoded_len).sum()
    }

    /// Names of the leaf fields in wire order.
    pub fn scalar_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter_map(|field| match field {
            Field::Scalar(name, _) => Some(*name),
            _ => None,
        })
    }

    /// Nested layout of the repeated or fixed group called `name`.
    pub fn group(&self, name: &str) -> Option<&'static LayoutDescriptor> {
        self.fields.iter().find_map(|field| match field {
            Field::Group(group, layout) | Field::Fixed(group, _, layout) if *group == name => {
                Some(*layout)
            }
            _ => None,
        })
    }
}
