//! Layered configuration resolution for server processes.
//!
//! This crate merges command-line arguments, environment variables, a `.env`
//! file, a local service-binding document, an optional JSON config file and
//! schema defaults into one queryable [`Store`], and reports whether the process
//! runs locally or on the cloud platform.

pub mod common;
pub mod constants;
pub mod discovery;
mod loader;
pub mod schema;
pub mod store;

pub use common::common_options;
pub use discovery::{AppEnv, ServiceBindings};
pub use loader::{
    ConfigError, ConfigOptions, Configurator, DotenvStatus, EnvTransforms, bootstrap, configure,
    dotenv_disabled, env_var_or_none, load_dotenv, parse_env_value, parse_override,
};
pub use schema::{CliOption, OptionType, Schema};
pub use store::{Layer, LayerKind, Store};
