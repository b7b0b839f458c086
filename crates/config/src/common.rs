//! Pre-built options shared by most server processes.
//!
//! The key names are exported so callers can query the store without repeating literals.

use crate::schema::{CliOption, Schema};

/// Operational mode key.
pub const ENV: &str = "env";
pub const PORT: &str = "port";
pub const BIND: &str = "bind";
pub const LOG_LEVEL: &str = "logLevel";
/// Injected from platform discovery unless overridden.
pub const IS_LOCAL: &str = "isLocal";

pub fn env_option() -> CliOption {
    CliOption::choice("Operational mode", ["development", "test", "production"])
        .with_env("NODE_ENV")
        .with_default("production")
}

pub fn port_option() -> CliOption {
    CliOption::number("Port to bind to").with_env("PORT")
}

pub fn bind_option() -> CliOption {
    CliOption::string("Host to bind to").with_env("BIND")
}

pub fn log_level_option() -> CliOption {
    CliOption::choice("Log verbosity", ["error", "warn", "info", "debug", "trace"])
        .with_env("LOG_LEVEL")
        .with_default("info")
}

/// Schema used when the caller does not supply one.
pub fn common_options() -> Schema {
    Schema::new()
        .with(ENV, env_option())
        .with(PORT, port_option())
        .with(BIND, bind_option())
        .with(LOG_LEVEL, log_level_option())
}
