//! appenv - inspect layered application configuration from the command line.
//!
//! Responsibilities:
//! - Parse `appenv` flags and forward application arguments to the schema parser.
//! - Bootstrap and resolve configuration through `appenv-config`.
//! - Format and display resolved values and schema descriptions.
//!
//! Does NOT handle:
//! - Resolution rules or precedence (see `crates/config`).
//!
//! Invariants:
//! - Logs go to stderr so stdout carries only command output.
//! - Parser errors from the application arguments exit through `clap::Error::exit`.

mod args;
mod error;
mod formatters;

use anyhow::{Context, Result};
use appenv_config::common::IS_LOCAL;
use appenv_config::{ConfigError, Configurator, Schema, Store, common_options};
use args::{Cli, Commands};
use clap::Parser;
use error::{ExitCodeExt, KeyNotFound};
use formatters::{get_formatter, option_rows, resolved_rows};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli) {
        Ok(output) => print!("{output}"),
        Err(err) => {
            if let Some(ConfigError::Cli(clap_err)) = err.downcast_ref::<ConfigError>() {
                clap_err.exit();
            }
            eprintln!("Error: {err:#}");
            std::process::exit(err.exit_code().as_i32());
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    let schema = load_schema(cli)?;
    let formatter = get_formatter(cli.format);

    let output = match &cli.command {
        Commands::Resolve { all, app_args } => {
            let store = resolve(cli, &schema, app_args)?;
            if *all {
                formatter.format_merged(&store.to_merged())?
            } else {
                let keys = schema.keys().chain(std::iter::once(IS_LOCAL));
                formatter.format_resolved(&resolved_rows(&store, keys))?
            }
        }
        Commands::Get { key, app_args } => {
            let store = resolve(cli, &schema, app_args)?;
            let value = store
                .get(key)
                .ok_or_else(|| KeyNotFound(key.clone()))?;
            formatter.format_value(value)?
        }
        Commands::Describe => formatter.format_options(&option_rows(&schema))?,
    };

    Ok(terminate(output))
}

fn load_schema(cli: &Cli) -> Result<Schema> {
    match &cli.schema {
        Some(path) => Schema::from_path(path)
            .with_context(|| format!("Failed to load schema from {}", path.display())),
        None => Ok(common_options()),
    }
}

fn resolve(cli: &Cli, schema: &Schema, app_args: &[String]) -> Result<Store> {
    let options = cli.config_options(app_args)?;
    let mut configurator = Configurator::new();
    let app_env = configurator.bootstrap(options)?;
    tracing::debug!(is_local = app_env.is_local, port = app_env.port, "Bootstrapped");
    Ok(configurator.configure(Some(schema))?)
}

fn terminate(mut output: String) -> String {
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}
