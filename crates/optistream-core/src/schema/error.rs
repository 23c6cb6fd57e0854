use thiserror::Error;

use crate::asset::{AssetType, RegistryKind};
use crate::error::ErrorKind;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no {registry} layout registered for asset type {tag}")]
    UnknownAssetType {
        tag: AssetType,
        registry: RegistryKind,
    },
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaError::UnknownAssetType { .. } => ErrorKind::UnknownAssetType,
        }
    }
}
