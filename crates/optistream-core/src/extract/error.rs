use thiserror::Error;

use crate::asset::{AssetType, RegistryKind};
use crate::decode::{DecodeError, InvalidSelector};
use crate::error::ErrorKind;
use crate::schema::SchemaError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no {registry} flattening rule for asset type {tag}")]
    UnknownAssetType {
        tag: AssetType,
        registry: RegistryKind,
    },
    #[error(transparent)]
    InvalidSelector(#[from] InvalidSelector),
    #[error("{tag} holds rigid bodies and markers; a selector is required")]
    SelectorRequired { tag: AssetType },
    #[error("{tag} has a single child kind; selectors only apply to assets")]
    SelectorNotApplicable { tag: AssetType },
    #[error("{tag} records requested before a successful parse")]
    NotParsed { tag: AssetType },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::UnknownAssetType { .. } => ErrorKind::UnknownAssetType,
            ExtractError::InvalidSelector(_)
            | ExtractError::SelectorRequired { .. }
            | ExtractError::SelectorNotApplicable { .. } => ErrorKind::InvalidArgument,
            ExtractError::NotParsed { .. } => ErrorKind::IllegalState,
            ExtractError::Decode(err) => err.kind(),
            ExtractError::Schema(err) => err.kind(),
        }
    }
}
