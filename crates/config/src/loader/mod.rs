//! Configuration loader: schema transforms, layer sources and resolution.
//!
//! Responsibilities:
//! - Turn a `Schema` into environment whitelists, rename tables, CLI flags and defaults.
//! - Read each source (argv, environment, `.env`, config file) into a layer.
//! - Assemble layers into a `Store`, either in one call (`configure`) or in two phases
//!   (`Configurator::bootstrap` then `Configurator::configure`).
//!
//! Does NOT handle:
//! - Platform discovery details (see `discovery.rs`).
//! - Layer lookup semantics (see `store.rs`).
//!
//! Invariants / Assumptions:
//! - Precedence, highest first: overrides > argv > env > file > defaults > cfenv literal.
//! - Missing `.env` and binding documents are skipped silently.
//! - The `DOTENV_DISABLED` variable is checked before `.env` is read.

mod argv;
mod bootstrap;
mod builder;
mod dotenv;
pub(crate) mod env;
mod error;
mod file;
mod resolve;
mod transform;

pub use bootstrap::{Configurator, bootstrap};
pub use builder::{ConfigOptions, parse_override};
pub use dotenv::{DotenvStatus, dotenv_disabled, load_dotenv};
pub use env::{env_var_or_none, parse_env_value};
pub use error::ConfigError;
pub use resolve::configure;
pub use transform::EnvTransforms;

#[cfg(test)]
mod tests;
