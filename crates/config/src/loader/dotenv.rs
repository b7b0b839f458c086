//! `.env` file loading.
//!
//! Responsibilities:
//! - Load `KEY=value` pairs from a `.env` file into the process environment.
//! - Honour the `DOTENV_DISABLED` gate so tests and CI can stay hermetic.
//!
//! Does NOT handle:
//! - Deciding which variables are used (see `transform.rs`).
//!
//! Invariants:
//! - Variables already present in the environment are never overwritten.
//! - Missing and malformed files are skipped; they never fail resolution.
//! - Log output never includes raw `.env` line contents.

use std::io::ErrorKind;
use std::path::Path;

use crate::constants::DOTENV_DISABLED_VAR;

/// What happened when loading a `.env` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotenvStatus {
    Loaded,
    Disabled,
    NotFound,
    /// The file failed to parse at `error_index`. Lines before it may have been applied.
    Malformed { error_index: Option<usize> },
    Unreadable { kind: ErrorKind },
}

/// Check if dotenv loading is disabled via environment variable.
pub fn dotenv_disabled() -> bool {
    matches!(
        std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
        Some("true") | Some("1")
    )
}

/// Load the `.env` file at `path`.
pub fn load_dotenv(path: &Path) -> DotenvStatus {
    if dotenv_disabled() {
        tracing::debug!("dotenv loading disabled via {DOTENV_DISABLED_VAR}");
        return DotenvStatus::Disabled;
    }

    let status = match dotenvy::from_path(path) {
        Ok(()) => DotenvStatus::Loaded,
        Err(dotenvy::Error::Io(io_err)) if io_err.kind() == ErrorKind::NotFound => {
            DotenvStatus::NotFound
        }
        Err(dotenvy::Error::Io(io_err)) => DotenvStatus::Unreadable {
            kind: io_err.kind(),
        },
        Err(dotenvy::Error::LineParse(_, idx)) => DotenvStatus::Malformed {
            error_index: Some(idx),
        },
        Err(_) => DotenvStatus::Malformed { error_index: None },
    };

    match status {
        DotenvStatus::Loaded => tracing::debug!(path = %path.display(), "loaded .env file"),
        DotenvStatus::NotFound => {
            tracing::debug!(path = %path.display(), "no .env file found, skipping")
        }
        DotenvStatus::Malformed { error_index } => tracing::warn!(
            path = %path.display(),
            ?error_index,
            "ignoring malformed .env file"
        ),
        DotenvStatus::Unreadable { kind } => {
            tracing::warn!(path = %path.display(), ?kind, "ignoring unreadable .env file")
        }
        DotenvStatus::Disabled => {}
    }

    status
}
