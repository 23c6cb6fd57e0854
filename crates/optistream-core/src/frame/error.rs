use thiserror::Error;

use crate::asset::{AssetType, RegistryKind};
use crate::decode::{DecodeError, EncodeError};
use crate::error::ErrorKind;
use crate::extract::ExtractError;
use crate::schema::SchemaError;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("unknown model-definition dataset type {id} at offset {offset}")]
    UnknownDatasetType { id: i32, offset: usize },
    #[error(
        "{registry} layout for {tag} is unverified and produced data; enable allow_unverified_layouts to accept it"
    )]
    Unverified {
        tag: AssetType,
        registry: RegistryKind,
    },
    #[error("asset type {tag} has no model-definition dataset type")]
    NoDatasetType { tag: AssetType },
    #[error("{registry} bucket does not track asset type {tag}")]
    UntrackedAssetType {
        tag: AssetType,
        registry: RegistryKind,
    },
}

impl FrameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::Decode(err) => err.kind(),
            FrameError::Encode(err) => err.kind(),
            FrameError::Extract(err) => err.kind(),
            FrameError::Schema(err) => err.kind(),
            FrameError::UnknownDatasetType { .. }
            | FrameError::NoDatasetType { .. }
            | FrameError::UntrackedAssetType { .. } => ErrorKind::UnknownAssetType,
            FrameError::Unverified { .. } => ErrorKind::UnverifiedLayout,
        }
    }
}
