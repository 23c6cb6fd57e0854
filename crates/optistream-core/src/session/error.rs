use thiserror::Error;

use crate::error::ErrorKind;
use crate::frame::FrameError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid asset type '{name}': not an accumulator key")]
    InvalidAssetType { name: String },
    #[error("session is not running; call start() first")]
    NotStarted,
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::InvalidAssetType { .. } => ErrorKind::InvalidAssetType,
            SessionError::NotStarted => ErrorKind::IllegalState,
            SessionError::Frame(err) => err.kind(),
            SessionError::Source(_) | SessionError::Io(_) | SessionError::Json(_) => ErrorKind::Io,
        }
    }

    /// True when the error concerns a single buffer and the session can
    /// carry on with the next one.
    pub fn is_buffer_error(&self) -> bool {
        matches!(self, SessionError::Frame(_))
    }
}
