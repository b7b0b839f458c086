//! Environment variable access for configuration resolution.
//!
//! Responsibilities:
//! - Read environment variables with empty/whitespace filtering.
//! - Coerce raw variable values into typed JSON values.
//! - Build the environment layer from the whitelist and rename table.
//! - Write the variables this crate exports (`PORT`, `VCAP_*`).
//!
//! Does NOT handle:
//! - Deciding which variables are whitelisted (see `transform.rs`).
//! - `.env` file loading (see `dotenv.rs`).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Only whitelisted variables ever reach the environment layer.
//! - When several variables rename to the same key, the later-declared one wins.

use serde_json::{Map, Value};

use super::transform::EnvTransforms;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Coerce a raw environment value.
///
/// JSON literals (`8080`, `true`, `{"a":1}`) become typed values; anything else
/// stays a string. The literal `undefined` is treated as unset.
pub fn parse_env_value(raw: &str) -> Option<Value> {
    if raw == "undefined" {
        return None;
    }
    Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

/// Collect whitelisted variables, renamed to their schema keys.
pub(crate) fn read_env_layer(transforms: &EnvTransforms) -> Map<String, Value> {
    let mut values = Map::new();
    for name in transforms.whitelist() {
        let Some(value) = env_var_or_none(name).and_then(|raw| parse_env_value(&raw)) else {
            continue;
        };
        if let Some((key, value)) = transforms.apply(name, value) {
            tracing::trace!(var = %name, key = %key, "environment variable mapped to config key");
            values.insert(key, value);
        }
    }
    values
}

/// Render a resolved value the way it should appear in the environment.
pub(crate) fn value_to_env_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Write a variable into the process environment.
pub(crate) fn export_env_var(key: &str, value: &str) {
    tracing::debug!(var = %key, "exporting variable to process environment");
    // SAFETY: exports happen during bootstrap/configure, which callers run at
    // startup before spawning threads that read the environment.
    unsafe {
        std::env::set_var(key, value);
    }
}
