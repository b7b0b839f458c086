//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish failures.
//! - Map `ConfigError` variants to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//! - Parser usage errors, which exit through `clap::Error::exit`.
//!
//! Invariants:
//! - Exit code 2 matches the parser's own usage-error code.

use appenv_config::ConfigError;
use thiserror::Error;

/// Structured exit codes for appenv.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    #[allow(dead_code)]
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Usage error - bad flags or a malformed override.
    UsageError = 2,

    /// Input error - a config or schema file could not be read, parsed or used.
    ///
    /// Scripts should fix the file and not retry.
    InputError = 3,

    /// Key not found - `get` asked for a key no layer defines.
    NotFound = 4,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::Cli(_) | ConfigError::InvalidOverride(_) => ExitCode::UsageError,
            ConfigError::ConfigFileRead { .. }
            | ConfigError::ConfigFileParse { .. }
            | ConfigError::ConfigFileNotObject { .. }
            | ConfigError::SchemaRead { .. }
            | ConfigError::SchemaParse { .. }
            | ConfigError::SchemaConflict { .. } => ExitCode::InputError,
            ConfigError::NotBootstrapped | ConfigError::AlreadyBootstrapped => {
                ExitCode::GeneralError
            }
        }
    }
}

/// Raised by `get` when no layer defines the requested key.
#[derive(Debug, Error)]
#[error("Key '{0}' is not defined by any configuration source")]
pub struct KeyNotFound(pub String);

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if no known error is found in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
                return ExitCode::from(config_err);
            }
            if cause.downcast_ref::<KeyNotFound>().is_some() {
                return ExitCode::NotFound;
            }
        }

        ExitCode::GeneralError
    }
}
