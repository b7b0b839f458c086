//! Two-phase bootstrap/configure.
//!
//! Responsibilities:
//! - Run the one-time process initialization (`.env`, discovery, binding export) in `bootstrap`.
//! - Resolve any number of schemas afterwards with `configure`, reusing that initialization.
//!
//! Does NOT handle:
//! - Layer construction (see `resolve.rs`).
//!
//! Invariants / Assumptions:
//! - `configure` before `bootstrap` fails with `ConfigError::NotBootstrapped`.
//! - `bootstrap` succeeds at most once per `Configurator`.
//! - Discovery runs before the binding document is exported, so a local run stays local.
//! - `configure` never re-reads `.env` or re-runs discovery.

use super::builder::ConfigOptions;
use super::dotenv::load_dotenv;
use super::error::ConfigError;
use super::resolve::resolve;
use crate::common::common_options;
use crate::discovery::{AppEnv, ServiceBindings};
use crate::schema::Schema;
use crate::store::Store;

#[derive(Debug)]
struct Bootstrapped {
    options: ConfigOptions,
    app_env: AppEnv,
}

/// Explicit handle for two-phase configuration.
///
/// ```no_run
/// use appenv_config::{ConfigOptions, Configurator, common_options};
///
/// let mut configurator = Configurator::new();
/// configurator.bootstrap(ConfigOptions::new().with_app_name("orders"))?;
/// let config = configurator.configure(Some(&common_options()))?;
/// let port = config.get_i64("port");
/// # Ok::<(), appenv_config::ConfigError>(())
/// ```
#[derive(Debug, Default)]
pub struct Configurator {
    state: Option<Bootstrapped>,
}

impl Configurator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.state.is_some()
    }

    /// Load `.env`, discover the platform and export local bindings.
    pub fn bootstrap(&mut self, options: ConfigOptions) -> Result<&AppEnv, ConfigError> {
        if self.state.is_some() {
            return Err(ConfigError::AlreadyBootstrapped);
        }

        load_dotenv(options.env_path());
        let bindings = ServiceBindings::load(options.vcap_path());
        let app_env = AppEnv::discover(bindings.as_ref(), options.app_name());

        if let Some(bindings) = &bindings {
            let exported = bindings.export_to_env();
            if !exported.is_empty() {
                tracing::info!(vars = ?exported, "exported local service bindings");
            }
        }

        let state = self.state.insert(Bootstrapped { options, app_env });
        Ok(&state.app_env)
    }

    /// Discovery result captured by `bootstrap`.
    pub fn app_env(&self) -> Option<&AppEnv> {
        self.state.as_ref().map(|state| &state.app_env)
    }

    /// Resolve `schema`, or the bootstrap schema, or the common options.
    pub fn configure(&self, schema: Option<&Schema>) -> Result<Store, ConfigError> {
        let state = self.state.as_ref().ok_or(ConfigError::NotBootstrapped)?;
        match schema.or(state.options.schema()) {
            Some(schema) => resolve(schema, &state.options, &state.app_env),
            None => resolve(&common_options(), &state.options, &state.app_env),
        }
    }
}

/// Create a `Configurator` and bootstrap it in one step.
pub fn bootstrap(options: ConfigOptions) -> Result<Configurator, ConfigError> {
    let mut configurator = Configurator::new();
    configurator.bootstrap(options)?;
    Ok(configurator)
}
