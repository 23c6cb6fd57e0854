use std::fmt;

use serde::Serialize;

/// Contract-level classification shared by every error type in the crate.
///
/// Module errors carry the detail; `kind()` maps them onto the contract so
/// callers can branch without matching individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Buffer content does not match the layout (truncation, bad count,
    /// boundary mismatch, bad sentinel, invalid text).
    MalformedStream,
    /// No layout or rule is registered for the requested tag.
    UnknownAssetType,
    /// A caller-supplied argument is not acceptable (e.g. asset selector).
    InvalidArgument,
    /// An operation ran before the state it depends on existed.
    IllegalState,
    /// A metadata update named something that is not an accumulator key.
    InvalidAssetType,
    /// A layout flagged as unverified produced content and the session does
    /// not allow it.
    UnverifiedLayout,
    /// Filesystem or capture-source failure.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedStream => "MalformedStream",
            ErrorKind::UnknownAssetType => "UnknownAssetType",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::IllegalState => "IllegalState",
            ErrorKind::InvalidAssetType => "InvalidAssetType",
            ErrorKind::UnverifiedLayout => "UnverifiedLayout",
            ErrorKind::Io => "Io",
        };
        f.write_str(name)
    }
}
