use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::SessionError;

/// Default UDP port for frame-of-data messages.
pub const DEFAULT_DATA_PORT: u16 = 1511;
/// Default UDP port for command responses.
pub const DEFAULT_COMMAND_PORT: u16 = 1510;

/// Session-level settings. Every field has a default, so a partial JSON
/// document is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Accept content decoded through layouts that were never verified
    /// against a live server (legacy markers, force-plate descriptions).
    pub allow_unverified_layouts: bool,
    pub data_port: u16,
    pub command_port: u16,
    /// Stop the run loop on the first rejected buffer instead of skipping it.
    pub stop_on_error: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            allow_unverified_layouts: false,
            data_port: DEFAULT_DATA_PORT,
            command_port: DEFAULT_COMMAND_PORT,
            stop_on_error: false,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SessionError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_DATA_PORT, SessionConfig};

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SessionConfig::from_json_str(r#"{"allow_unverified_layouts": true}"#).unwrap();
        assert!(config.allow_unverified_layouts);
        assert_eq!(config.data_port, DEFAULT_DATA_PORT);
        assert!(!config.stop_on_error);
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = SessionConfig::from_json_str("{not json").unwrap_err();
        assert!(err.to_string().contains("JSON error"));
    }
}
