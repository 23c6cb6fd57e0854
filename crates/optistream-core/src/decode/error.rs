use thiserror::Error;

use crate::error::ErrorKind;
use crate::schema::{Primitive, SchemaError};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload too short at offset {offset}: need {needed} bytes, got {actual}")]
    TooShort {
        offset: usize,
        needed: usize,
        actual: usize,
    },
    #[error("start cursor {cursor} is past the end of a {len}-byte buffer")]
    CursorOutOfRange { cursor: usize, len: usize },
    #[error("group '{group}' at offset {offset} declares a negative count ({count})")]
    NegativeCount {
        group: &'static str,
        offset: usize,
        count: i32,
    },
    #[error(
        "group '{group}' at offset {offset} declares {count} entries, which cannot fit in {remaining} remaining bytes"
    )]
    CountOverflow {
        group: &'static str,
        offset: usize,
        count: usize,
        remaining: usize,
    },
    #[error("string at offset {offset} has no NUL terminator")]
    UnterminatedString { offset: usize },
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
    #[error("field '{field}' at offset {offset}: expected {expected}, found {actual}")]
    UnexpectedValue {
        field: &'static str,
        offset: usize,
        expected: i32,
        actual: i32,
    },
    #[error("{context} ends at offset {actual}, declared boundary is {expected}")]
    BoundaryMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{trailing} unexpected trailing bytes after offset {consumed}")]
    TrailingBytes { consumed: usize, trailing: usize },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Schema(err) => err.kind(),
            _ => ErrorKind::MalformedStream,
        }
    }
}

/// Errors returned when a parsed tree cannot be written back through a layout.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("layout '{layout}' requires field '{field}'")]
    MissingField {
        layout: &'static str,
        field: &'static str,
    },
    #[error("field '{field}' cannot be encoded as {encoding:?}")]
    TypeMismatch {
        field: &'static str,
        encoding: Primitive,
    },
    #[error("field '{field}' is out of range for {encoding:?}")]
    OutOfRange {
        field: &'static str,
        encoding: Primitive,
    },
    #[error("string field '{field}' contains a NUL byte")]
    InteriorNul { field: &'static str },
    #[error("fixed group '{group}' needs {expected} entries, node has {actual}")]
    FixedCountMismatch {
        group: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("group '{group}' has too many entries for an i32 count")]
    CountOverflow { group: &'static str },
}

impl EncodeError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}
