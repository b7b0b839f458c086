//! Command-line layer built from the option schema.
//!
//! Responsibilities:
//! - Build a `clap::Command` with one flag per schema option.
//! - Reject schemas whose flag names collide before clap sees them.
//! - Parse arguments and collect the values that were given on the command line.
//!
//! Does NOT handle:
//! - Defaults; those live in their own layer so CLI values never mask env values with defaults.
//! - Reading environment variables (clap's `env` support is intentionally not used here).
//!
//! Invariants:
//! - Type coercion, choice validation, `--help` and `--version` are delegated to clap.
//! - Flags the schema does not declare, bare words and everything after `--` are
//!   ignored, so several schemas can resolve against the same process arguments.
//! - Only flags whose value source is the command line enter the layer.
//! - camelCase keys also accept a kebab-case spelling (`--logLevel` / `--log-level`).
//! - A schema that claims `help`, `version`, `-h` or `-V` takes that name from
//!   the built-in flag; the built-in keeps whatever spelling is left.

use std::collections::BTreeMap;
use std::ffi::OsString;

use clap::builder::{BoolishValueParser, PossibleValuesParser};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use serde_json::{Map, Number, Value};

use super::error::ConfigError;
use super::transform::EnvTransforms;
use crate::schema::{CliOption, OptionType, Schema};

const HELP_LONG: &str = "help";
const HELP_SHORT: char = 'h';
const VERSION_LONG: &str = "version";
const VERSION_SHORT: char = 'V';

/// Ids for built-in flags re-added after the schema claimed part of their spelling.
const HELP_ID: &str = "__help";
const VERSION_ID: &str = "__version";

/// Usage and version text applied to the generated command.
#[derive(Debug, Clone, Default)]
pub(crate) struct CommandText<'a> {
    pub name: &'a str,
    pub usage: Option<&'a str>,
    pub version: Option<&'a str>,
}

/// How many tokens a flag consumes after its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    /// `--help`, `--version`.
    None,
    /// Booleans: `--debug` or `--debug false`.
    OptionalBool,
    Value,
}

/// Which spellings of a built-in flag are still free.
#[derive(Debug, Clone, Copy, Default)]
struct Builtin {
    long: bool,
    short: bool,
}

impl Builtin {
    fn is_untouched(&self) -> bool {
        self.long && self.short
    }

    fn is_removed(&self) -> bool {
        !self.long && !self.short
    }
}

/// Every flag spelling accepted by a generated command.
#[derive(Debug, Default)]
struct FlagTable {
    longs: BTreeMap<String, Arity>,
    shorts: BTreeMap<char, Arity>,
    help: Builtin,
    version: Builtin,
}

impl FlagTable {
    /// Collect the schema's spellings, failing on the first one claimed by two keys.
    fn from_schema(schema: &Schema, has_version: bool) -> Result<Self, ConfigError> {
        let mut long_owners: BTreeMap<String, &str> = BTreeMap::new();
        let mut short_owners: BTreeMap<char, &str> = BTreeMap::new();
        let mut table = FlagTable::default();

        for (key, option) in schema.iter() {
            let arity = match option.kind {
                OptionType::Boolean => Arity::OptionalBool,
                _ => Arity::Value,
            };

            for name in long_names(key, option) {
                if let Some(first) = long_owners.get(&name)
                    && *first != key
                {
                    return Err(conflict(format!("--{name}"), first, key));
                }
                long_owners.insert(name.clone(), key);
                table.longs.insert(name, arity);
            }

            if let Some(short) = option.short {
                if let Some(first) = short_owners.get(&short) {
                    return Err(conflict(format!("-{short}"), first, key));
                }
                short_owners.insert(short, key);
                table.shorts.insert(short, arity);
            }
        }

        table.help = Builtin {
            long: !table.longs.contains_key(HELP_LONG),
            short: !table.shorts.contains_key(&HELP_SHORT),
        };
        table.version = Builtin {
            long: has_version && !table.longs.contains_key(VERSION_LONG),
            short: has_version && !table.shorts.contains_key(&VERSION_SHORT),
        };

        if table.help.long {
            table.longs.insert(HELP_LONG.to_string(), Arity::None);
        }
        if table.help.short {
            table.shorts.insert(HELP_SHORT, Arity::None);
        }
        if table.version.long {
            table.longs.insert(VERSION_LONG.to_string(), Arity::None);
        }
        if table.version.short {
            table.shorts.insert(VERSION_SHORT, Arity::None);
        }

        Ok(table)
    }

    /// Keep the binary name and every declared flag with its value; drop the rest.
    fn retain_declared(&self, args: Vec<OsString>) -> Vec<OsString> {
        let mut tokens = args.into_iter().peekable();
        let mut kept: Vec<OsString> = tokens.next().into_iter().collect();
        let mut ignored = 0usize;

        while let Some(token) = tokens.next() {
            let Some(text) = token.to_str() else {
                ignored += 1;
                continue;
            };
            if text == "--" {
                ignored += tokens.by_ref().count();
                break;
            }

            let (arity, inline_value) = if let Some(long) = text.strip_prefix("--") {
                match long.split_once('=') {
                    Some((name, _)) => (self.longs.get(name).copied(), true),
                    None => (self.longs.get(long).copied(), false),
                }
            } else if let Some(shorts) = text.strip_prefix('-').filter(|s| !s.is_empty()) {
                let mut chars = shorts.chars();
                let first = chars.next();
                let attached = !chars.as_str().is_empty();
                (first.and_then(|c| self.shorts.get(&c).copied()), attached)
            } else {
                ignored += 1;
                continue;
            };

            let next_text = tokens.peek().and_then(|next| next.to_str());
            match arity {
                Some(arity) => {
                    kept.push(token);
                    let takes_next = !inline_value
                        && match arity {
                            Arity::None => false,
                            Arity::OptionalBool => next_text.is_some_and(is_boolish),
                            Arity::Value => next_text.is_some_and(is_value_token),
                        };
                    if takes_next && let Some(value) = tokens.next() {
                        kept.push(value);
                    }
                }
                None => {
                    ignored += 1;
                    if !inline_value && next_text.is_some_and(|next| !next.starts_with('-')) {
                        tokens.next();
                        ignored += 1;
                    }
                }
            }
        }

        if ignored > 0 {
            tracing::debug!(ignored, "ignoring arguments not declared by the schema");
        }
        kept
    }
}

fn conflict(flag: String, first: &str, second: &str) -> ConfigError {
    ConfigError::SchemaConflict {
        flag,
        first: first.to_string(),
        second: second.to_string(),
    }
}

/// Long spellings for one option, without duplicates.
fn long_names(key: &str, option: &CliOption) -> Vec<String> {
    let mut names = vec![key.to_string()];
    for name in kebab_case(key).into_iter().chain(option.aliases.iter().cloned()) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn is_boolish(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "y" | "yes" | "t" | "true" | "on" | "1" | "n" | "no" | "f" | "false" | "off" | "0"
    )
}

/// Anything but another flag; negative numbers count as values.
fn is_value_token(raw: &str) -> bool {
    !raw.starts_with('-') || raw.parse::<f64>().is_ok()
}

/// A schema-derived command together with the spellings it accepts.
pub(crate) struct SchemaCommand {
    command: Command,
    flags: FlagTable,
}

/// Build the command for a schema. Help text comes from the annotated descriptions.
pub(crate) fn build_command(
    schema: &Schema,
    transforms: &EnvTransforms,
    text: &CommandText<'_>,
) -> Result<SchemaCommand, ConfigError> {
    let flags = FlagTable::from_schema(schema, text.version.is_some())?;

    let mut command = Command::new(text.name.to_string());
    if let Some(usage) = text.usage {
        command = command.override_usage(usage.to_string());
    }
    if let Some(version) = text.version {
        command = command.version(version.to_string());
    }

    for (key, option) in schema.iter() {
        let help = transforms
            .description(key)
            .map(str::to_string)
            .unwrap_or_else(|| option.annotated_description());
        command = command.arg(build_arg(key, option, help));
    }

    if !flags.help.is_untouched() {
        command = command.disable_help_flag(true);
        if !flags.help.is_removed() {
            command = command.arg(
                builtin_arg(HELP_ID, flags.help, HELP_LONG, HELP_SHORT)
                    .action(ArgAction::Help)
                    .help("Print help"),
            );
        }
    }
    if text.version.is_some() && !flags.version.is_untouched() {
        command = command.disable_version_flag(true);
        if !flags.version.is_removed() {
            command = command.arg(
                builtin_arg(VERSION_ID, flags.version, VERSION_LONG, VERSION_SHORT)
                    .action(ArgAction::Version)
                    .help("Print version"),
            );
        }
    }

    Ok(SchemaCommand { command, flags })
}

fn builtin_arg(id: &'static str, free: Builtin, long: &'static str, short: char) -> Arg {
    let mut arg = Arg::new(id);
    if free.long {
        arg = arg.long(long);
    }
    if free.short {
        arg = arg.short(short);
    }
    arg
}

fn build_arg(key: &str, option: &CliOption, help: String) -> Arg {
    let mut arg = Arg::new(key.to_string())
        .long(key.to_string())
        .help(help)
        .required(false)
        .action(ArgAction::Set);

    let kebab = kebab_case(key);
    for name in long_names(key, option).into_iter().skip(1) {
        arg = if Some(&name) == kebab.as_ref() {
            arg.visible_alias(name)
        } else {
            arg.alias(name)
        };
    }
    if let Some(short) = option.short {
        arg = arg.short(short);
    }

    match &option.kind {
        OptionType::String => arg.value_parser(value_parser!(String)),
        OptionType::Number => arg.value_parser(parse_finite).allow_negative_numbers(true),
        OptionType::Boolean => arg
            .num_args(0..=1)
            .default_missing_value("true")
            .value_parser(BoolishValueParser::new()),
        OptionType::Choice(choices) => {
            arg.value_parser(PossibleValuesParser::new(choices.iter().cloned()))
        }
    }
}

fn parse_finite(raw: &str) -> Result<f64, String> {
    let n: f64 = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
    if n.is_finite() {
        Ok(n)
    } else {
        Err(format!("'{raw}' is not a finite number"))
    }
}

/// `logLevel` -> `log-level`. Returns `None` when the key has no uppercase letters.
fn kebab_case(key: &str) -> Option<String> {
    if !key.chars().any(|c| c.is_ascii_uppercase()) {
        return None;
    }
    let mut out = String::with_capacity(key.len() + 4);
    for (idx, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if idx > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    Some(out)
}

impl SchemaCommand {
    /// Parse `args` (including the binary name) and return the command-line layer.
    pub(crate) fn parse<I, T>(
        self,
        schema: &Schema,
        args: I,
    ) -> Result<Map<String, Value>, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = self
            .flags
            .retain_declared(args.into_iter().map(Into::into).collect());
        let matches = self.command.try_get_matches_from(args)?;
        Ok(collect_values(&matches, schema))
    }
}

fn collect_values(matches: &ArgMatches, schema: &Schema) -> Map<String, Value> {
    let mut values = Map::new();
    for (key, option) in schema.iter() {
        if matches.value_source(key) != Some(ValueSource::CommandLine) {
            continue;
        }
        let value = match &option.kind {
            OptionType::String | OptionType::Choice(_) => matches
                .get_one::<String>(key)
                .map(|s| Value::String(s.clone())),
            OptionType::Number => matches.get_one::<f64>(key).and_then(|n| number_value(*n)),
            OptionType::Boolean => matches.get_one::<bool>(key).map(|b| Value::Bool(*b)),
        };
        if let Some(value) = value {
            values.insert(key.to_string(), value);
        }
    }
    values
}

/// Integral numbers are kept as integers so `8080` round-trips as `8080`, not `8080.0`.
fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}
