//! Shared test utilities for appenv integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Clear every variable the common options or platform discovery read.
//!
//! Invariants / Assumptions:
//! - Commands run inside the caller's directory so the default `.env` and
//!   `vcap-local.json` paths never resolve to files in the workspace.

use assert_cmd::Command;
use std::path::Path;

const CLEARED_VARS: [&str; 12] = [
    "PORT",
    "BIND",
    "NODE_ENV",
    "LOG_LEVEL",
    "VCAP_APPLICATION",
    "VCAP_SERVICES",
    "VCAP_APP_PORT",
    "VCAP_APP_HOST",
    "APPENV_ENV_PATH",
    "APPENV_VCAP_PATH",
    "APPENV_CONFIG_PATH",
    "APPENV_SCHEMA",
];

/// Returns a hermetic `appenv` command running in `dir`.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent `.env` contamination.
/// - Host variables that feed resolution are cleared.
pub fn appenv_cmd(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("appenv");
    cmd.current_dir(dir);
    cmd.env("DOTENV_DISABLED", "1");
    for name in CLEARED_VARS {
        cmd.env_remove(name);
    }
    cmd
}
