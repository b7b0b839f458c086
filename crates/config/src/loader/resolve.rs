//! Layered store assembly.
//!
//! Responsibilities:
//! - Build every layer for a schema and stack them in precedence order.
//! - Inject the discovered `isLocal` flag into the overrides.
//! - Export the resolved `port` into `PORT` for local runs.
//! - Provide the single-phase `configure` entry point.
//!
//! Does NOT handle:
//! - One-time process initialization across several schemas (see `bootstrap.rs`).
//!
//! Invariants / Assumptions:
//! - Precedence, highest first: overrides > argv > env > file > defaults > cfenv literal.
//! - The cfenv literal is only queryable under its namespace (`cfenv:...`).
//! - `PORT` is written only when discovery reports a local run and `PORT` is unset.

use serde_json::{Map, Value};

use super::argv::{CommandText, build_command};
use super::builder::ConfigOptions;
use super::dotenv::load_dotenv;
use super::env::{env_var_or_none, export_env_var, read_env_layer, value_to_env_string};
use super::error::ConfigError;
use super::file::read_config_file;
use super::transform::EnvTransforms;
use crate::common::{IS_LOCAL, PORT, common_options};
use crate::constants::{CFENV_NAMESPACE, PORT_VAR};
use crate::discovery::{AppEnv, ServiceBindings};
use crate::schema::Schema;
use crate::store::{Layer, LayerKind, Store};

/// Resolve `schema` against the current process using an already-discovered `app_env`.
pub(crate) fn resolve(
    schema: &Schema,
    options: &ConfigOptions,
    app_env: &AppEnv,
) -> Result<Store, ConfigError> {
    let transforms = EnvTransforms::from_schema(schema);

    let command = build_command(
        schema,
        &transforms,
        &CommandText {
            name: options.command_name(),
            usage: options.usage(),
            version: options.version(),
        },
    )?;
    let argv = command.parse(schema, options.args())?;
    let env = read_env_layer(&transforms);
    let file = options
        .config_path()
        .map(read_config_file)
        .transpose()?
        .flatten();

    let mut overrides = options.overrides().clone();
    if !overrides.contains_key(IS_LOCAL) {
        overrides.insert(IS_LOCAL.to_string(), Value::Bool(app_env.is_local));
    }

    let mut cfenv = Map::new();
    cfenv.insert(CFENV_NAMESPACE.to_string(), app_env.to_literal());

    tracing::debug!(
        argv = argv.len(),
        env = env.len(),
        file = file.as_ref().map_or(0, Map::len),
        defaults = transforms.defaults().len(),
        overrides = overrides.len(),
        "assembled configuration layers"
    );

    let mut store = Store::new();
    store.push(Layer::new("overrides", LayerKind::Overrides, overrides));
    store.push(Layer::new("argv", LayerKind::Argv, argv));
    store.push(Layer::new("env", LayerKind::Env, env));
    if let Some(file) = file {
        store.push(Layer::new("file", LayerKind::File, file));
    }
    store.push(Layer::new(
        "defaults",
        LayerKind::Defaults,
        transforms.defaults().clone(),
    ));
    store.push(Layer::new(CFENV_NAMESPACE, LayerKind::Literal, cfenv));

    export_local_port(&store, app_env);

    Ok(store)
}

fn export_local_port(store: &Store, app_env: &AppEnv) {
    if !app_env.is_local || env_var_or_none(PORT_VAR).is_some() {
        return;
    }
    if let Some(port) = store.get(PORT).and_then(value_to_env_string) {
        export_env_var(PORT_VAR, &port);
    }
}

/// Resolve configuration in one call: load `.env`, discover the platform and build the store.
///
/// Unlike [`Configurator::bootstrap`](super::Configurator::bootstrap), this does not
/// export the service-binding document into the environment.
pub fn configure(options: &ConfigOptions) -> Result<Store, ConfigError> {
    load_dotenv(options.env_path());
    let bindings = ServiceBindings::load(options.vcap_path());
    let app_env = AppEnv::discover(bindings.as_ref(), options.app_name());

    match options.schema() {
        Some(schema) => resolve(schema, options, &app_env),
        None => resolve(&common_options(), options, &app_env),
    }
}
