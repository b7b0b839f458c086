//! Error types for configuration resolution.
//!
//! Responsibilities:
//! - Define error variants for every resolution failure the caller can observe.
//! - Carry the underlying parser error so CLI callers can reuse its usage/exit behaviour.
//!
//! Does NOT handle:
//! - Missing optional inputs (`.env`, service-binding document); those are skipped, not errors.
//! - Missing values at query time; `Store::get` returns `None` instead.
//!
//! Invariants:
//! - File errors always include the offending path.
//! - Errors never include raw `.env` or binding document contents.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while bootstrapping or resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `Configurator::configure` was called before `Configurator::bootstrap`.
    #[error("Configuration has not been bootstrapped. Call Configurator::bootstrap before configure.")]
    NotBootstrapped,

    #[error("Configuration has already been bootstrapped")]
    AlreadyBootstrapped,

    /// Command-line parsing failed, or `--help`/`--version` was requested.
    ///
    /// Call `clap::Error::exit` to print usage and exit the way the parser intends.
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("Failed to read config file at {path}")]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}")]
    ConfigFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config file at {path} must contain a JSON object")]
    ConfigFileNotObject { path: PathBuf },

    #[error("Failed to read schema file at {path}")]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema file at {path}: {source}")]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two schema entries claim the same command-line spelling.
    #[error("Flag '{flag}' is declared by both '{first}' and '{second}'")]
    SchemaConflict {
        flag: String,
        first: String,
        second: String,
    },

    #[error("Invalid override '{0}': expected KEY=VALUE")]
    InvalidOverride(String),
}

impl ConfigError {
    /// Whether this error came from the command-line parser.
    pub fn is_cli(&self) -> bool {
        matches!(self, ConfigError::Cli(_))
    }
}
