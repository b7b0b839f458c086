//! Resolution options builder.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigOptions` describing where configuration comes from.
//! - Parse `KEY=VALUE` override strings.
//!
//! Does NOT handle:
//! - Performing resolution (see `resolve.rs` and `bootstrap.rs`).
//!
//! Invariants / Assumptions:
//! - Unset paths fall back to `.env` and `vcap-local.json` in the working directory.
//! - Unset arguments fall back to the process arguments.
//! - Overrides are applied verbatim and always win, except that `isLocal` is injected when absent.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::env::parse_env_value;
use super::error::ConfigError;
use crate::constants::{DEFAULT_APP_NAME, DEFAULT_ENV_PATH, DEFAULT_VCAP_PATH};
use crate::schema::Schema;

/// Where and how configuration is resolved.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    app_name: Option<String>,
    version: Option<String>,
    usage: Option<String>,
    env_path: Option<PathBuf>,
    vcap_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    schema: Option<Schema>,
    overrides: Map<String, Value>,
    args: Option<Vec<OsString>>,
}

impl ConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used for usage text and as the discovery fallback name.
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Enable `--version` with this version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Replace the generated usage line.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Path to the `.env` file.
    pub fn with_env_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_path = Some(path.into());
        self
    }

    /// Path to the local service-binding document.
    pub fn with_vcap_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.vcap_path = Some(path.into());
        self
    }

    /// Path to an optional JSON configuration file.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Schema to resolve. Defaults to the common options.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn with_overrides(mut self, overrides: Map<String, Value>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Arguments to parse, including the binary name. Defaults to the process arguments.
    pub fn with_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn env_path(&self) -> &Path {
        self.env_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_ENV_PATH))
    }

    pub fn vcap_path(&self) -> &Path {
        self.vcap_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_VCAP_PATH))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn overrides(&self) -> &Map<String, Value> {
        &self.overrides
    }

    pub(crate) fn command_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    pub(crate) fn args(&self) -> Vec<OsString> {
        match &self.args {
            Some(args) => args.clone(),
            None => std::env::args_os().collect(),
        }
    }
}

/// Parse a `KEY=VALUE` override. The value is coerced like an environment value.
pub fn parse_override(raw: &str) -> Result<(String, Value), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidOverride(raw.to_string()));
    }
    let value = parse_env_value(value).unwrap_or(Value::Null);
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_paths() {
        let options = ConfigOptions::new();
        assert_eq!(options.env_path(), Path::new(".env"));
        assert_eq!(options.vcap_path(), Path::new("vcap-local.json"));
        assert!(options.config_path().is_none());
        assert_eq!(options.command_name(), "app");
    }

    #[test]
    fn test_builder_sets_values() {
        let options = ConfigOptions::new()
            .with_app_name("orders")
            .with_env_path("/tmp/custom.env")
            .with_override("isLocal", false)
            .with_args(["orders", "--port", "1"]);

        assert_eq!(options.command_name(), "orders");
        assert_eq!(options.env_path(), Path::new("/tmp/custom.env"));
        assert_eq!(options.overrides().get("isLocal"), Some(&json!(false)));
        assert_eq!(options.args().len(), 3);
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("port=8080").unwrap(),
            ("port".to_string(), json!(8080))
        );
        assert_eq!(
            parse_override("bind=0.0.0.0").unwrap(),
            ("bind".to_string(), json!("0.0.0.0"))
        );
        assert_eq!(
            parse_override("url=http://x?a=b").unwrap(),
            ("url".to_string(), json!("http://x?a=b"))
        );
        assert!(matches!(
            parse_override("no-equals"),
            Err(ConfigError::InvalidOverride(_))
        ));
        assert!(matches!(
            parse_override("=value"),
            Err(ConfigError::InvalidOverride(_))
        ));
    }
}
