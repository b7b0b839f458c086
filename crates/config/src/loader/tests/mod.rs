//! Tests for configuration resolution.
//!
//! Responsibilities:
//! - Test layer precedence and the `isLocal` injection.
//! - Test the two-phase bootstrap/configure contract.
//! - Test `.env` loading, including malformed and disabled cases.
//!
//! Invariants:
//! - Tests use `serial_test` to prevent environment variable pollution.
//! - Every test points `.env` and `vcap-local.json` into a temporary directory.
//! - Platform variables are cleared for the duration of each test via `temp-env`.

use std::ffi::OsStr;

use tempfile::TempDir;

use crate::loader::ConfigOptions;

pub mod bootstrap_tests;

/// Variables that affect discovery or the common schema.
const AMBIENT_VARS: &[&str] = &[
    "VCAP_APPLICATION",
    "VCAP_SERVICES",
    "VCAP_APP_PORT",
    "VCAP_APP_HOST",
    "PORT",
    "NODE_ENV",
    "BIND",
    "LOG_LEVEL",
    "DOTENV_DISABLED",
];

pub const NO_ARGS: [&str; 0] = [];

/// Run `f` with ambient variables cleared and `vars` applied on top.
pub fn with_clean_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    let mut all: Vec<(&str, Option<&str>)> = AMBIENT_VARS
        .iter()
        .filter(|name| !vars.iter().any(|(key, _)| key == *name))
        .map(|name| (*name, None))
        .collect();
    all.extend_from_slice(vars);
    temp_env::with_vars(all, f)
}

/// Options whose file inputs live in `dir` and whose arguments are `args`.
pub fn hermetic_options<I, T>(dir: &TempDir, args: I) -> ConfigOptions
where
    I: IntoIterator<Item = T>,
    T: AsRef<OsStr>,
{
    let argv: Vec<std::ffi::OsString> = std::iter::once(OsStr::new("test-app").to_owned())
        .chain(args.into_iter().map(|a| a.as_ref().to_owned()))
        .collect();
    ConfigOptions::new()
        .with_app_name("test-app")
        .with_env_path(dir.path().join(".env"))
        .with_vcap_path(dir.path().join("vcap-local.json"))
        .with_args(argv)
}
