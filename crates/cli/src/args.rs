//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the `appenv` CLI structure using clap derive macros.
//! - Convert parsed arguments into `ConfigOptions` for the config crate.
//!
//! Non-responsibilities:
//! - Does not parse application flags; everything after `--` is forwarded to the
//!   schema-derived parser in `appenv-config`.

use std::path::PathBuf;

use appenv_config::{ConfigOptions, parse_override};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "appenv")]
#[command(about = "Resolve layered application configuration", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  appenv resolve -- --port 8080\n  appenv --schema schema.json get dbUrl\n  appenv --override isLocal=false resolve --all\n  appenv describe --format json\n"
)]
pub struct Cli {
    /// Path to the .env file loaded before resolution
    #[arg(long, global = true, env = "APPENV_ENV_PATH", value_name = "FILE")]
    pub env_path: Option<PathBuf>,

    /// Path to the local service-binding document
    #[arg(long, global = true, env = "APPENV_VCAP_PATH", value_name = "FILE")]
    pub vcap_path: Option<PathBuf>,

    /// Path to a JSON configuration file layered below the environment
    #[arg(long = "config", global = true, env = "APPENV_CONFIG_PATH", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// JSON schema file declaring the options to resolve (defaults to the common options)
    #[arg(long, global = true, env = "APPENV_SCHEMA", value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Override a key, taking precedence over every other source
    #[arg(long = "override", global = true, value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every schema key and print the result
    Resolve {
        /// Include every key from every layer, including the cfenv namespace
        #[arg(long)]
        all: bool,

        /// Application arguments parsed against the schema
        #[arg(last = true)]
        app_args: Vec<String>,
    },

    /// Print a single resolved value (nested keys use `:`)
    Get {
        key: String,

        /// Application arguments parsed against the schema
        #[arg(last = true)]
        app_args: Vec<String>,
    },

    /// List schema options with their types, backing variables and defaults
    Describe,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

impl Cli {
    /// Build resolution options, forwarding `app_args` as the application's command line.
    pub fn config_options(&self, app_args: &[String]) -> anyhow::Result<ConfigOptions> {
        let mut options = ConfigOptions::new()
            .with_app_name("appenv")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_usage("appenv resolve -- [OPTIONS]")
            .with_args(std::iter::once("appenv".to_string()).chain(app_args.iter().cloned()));

        if let Some(path) = &self.env_path {
            options = options.with_env_path(path);
        }
        if let Some(path) = &self.vcap_path {
            options = options.with_vcap_path(path);
        }
        if let Some(path) = &self.config_path {
            options = options.with_config_path(path);
        }
        for raw in &self.overrides {
            let (key, value) = parse_override(raw)?;
            options = options.with_override(key, value);
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_app_args_after_separator_are_forwarded() {
        let cli = Cli::try_parse_from([
            "appenv",
            "--override",
            "port=1",
            "resolve",
            "--",
            "--port",
            "8080",
        ])
        .unwrap();

        let Commands::Resolve { all, app_args } = &cli.command else {
            panic!("expected resolve");
        };
        assert!(!all);
        assert_eq!(app_args, &["--port", "8080"]);

        let options = cli.config_options(app_args).unwrap();
        assert_eq!(options.overrides().get("port"), Some(&json!(1)));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli::try_parse_from(["appenv", "--override", "nope", "describe"]).unwrap();
        assert!(cli.config_options(&[]).is_err());
    }
}
