//! JSON configuration file layer.
//!
//! Responsibilities:
//! - Read an optional JSON object of `key -> value` to sit between the environment and defaults.
//!
//! Does NOT handle:
//! - Writing configuration back to disk (resolved configuration is never persisted).
//!
//! Invariants:
//! - A missing file is skipped (`Ok(None)`).
//! - An unreadable, malformed, or non-object file is an error naming the path.

use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};

use super::error::ConfigError;

pub(crate) fn read_config_file(path: &Path) -> Result<Option<Map<String, Value>>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::ConfigFileRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let value: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::ConfigFileParse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ConfigError::ConfigFileNotObject {
            path: path.to_path_buf(),
        }),
    }
}
