//! Option schema types.
//!
//! Responsibilities:
//! - Define `CliOption`, the declaration of a single configuration key.
//! - Define `Schema`, the ordered collection of options a caller resolves.
//! - Deserialize schemas from JSON documents (`{"port": {"type": "number", "env": "PORT"}}`).
//!
//! Does NOT handle:
//! - Deriving environment whitelists or rename tables (see `loader::transform`).
//! - Building CLI flags from options (see `loader::argv`).
//!
//! Invariants:
//! - Keys are unique within a `Schema`; inserting an existing key replaces it in place.
//! - Backing environment variable names keep their declaration order.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::de::{MapAccess, Visitor};
use serde_json::Value;

use crate::loader::ConfigError;

/// Value type of an option, used for CLI coercion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OptionType {
    #[default]
    String,
    Number,
    Boolean,
    /// A string restricted to the listed values.
    Choice(Vec<String>),
}

impl OptionType {
    /// Short name used in help and `describe` output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Choice(_) => "choice",
        }
    }
}

/// Declaration of one configuration key.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawCliOption")]
pub struct CliOption {
    /// Human-readable description shown in help output.
    pub description: String,
    /// Value type used for CLI coercion.
    pub kind: OptionType,
    /// Backing environment variables, in declaration order.
    pub env: Vec<String>,
    /// Value used when no other source defines the key.
    pub default: Option<Value>,
    /// Optional single-character flag.
    pub short: Option<char>,
    /// Extra long-flag aliases.
    pub aliases: Vec<String>,
}

impl CliOption {
    pub fn new(description: impl Into<String>, kind: OptionType) -> Self {
        Self {
            description: description.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(description, OptionType::String)
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self::new(description, OptionType::Number)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::new(description, OptionType::Boolean)
    }

    pub fn choice<I, S>(description: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            description,
            OptionType::Choice(choices.into_iter().map(Into::into).collect()),
        )
    }

    /// Add a backing environment variable. Later variables win when several are set.
    pub fn with_env(mut self, name: impl Into<String>) -> Self {
        self.env.push(name.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Description annotated with the backing variables, e.g. `Port to bind to (env:PORT)`.
    pub fn annotated_description(&self) -> String {
        if self.env.is_empty() {
            return self.description.clone();
        }
        let names: Vec<String> = self.env.iter().map(|name| format!("env:{name}")).collect();
        format!("{} ({})", self.description, names.join(", "))
    }
}

/// `env` accepts either a single name or a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnvNames {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCliOption {
    #[serde(default, alias = "describe")]
    description: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    choices: Option<Vec<String>>,
    #[serde(default)]
    env: Option<EnvNames>,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    short: Option<char>,
    #[serde(default, alias = "alias")]
    aliases: Vec<String>,
}

impl TryFrom<RawCliOption> for CliOption {
    type Error = String;

    fn try_from(raw: RawCliOption) -> Result<Self, Self::Error> {
        let kind = match (raw.kind.as_deref(), raw.choices) {
            (_, Some(choices)) => OptionType::Choice(choices),
            (None | Some("string"), None) => OptionType::String,
            (Some("number"), None) => OptionType::Number,
            (Some("boolean"), None) => OptionType::Boolean,
            (Some(other), None) => {
                return Err(format!(
                    "unknown option type '{other}' (expected string, number or boolean)"
                ));
            }
        };
        let env = match raw.env {
            None => Vec::new(),
            Some(EnvNames::One(name)) => vec![name],
            Some(EnvNames::Many(names)) => names,
        };
        Ok(Self {
            description: raw.description,
            kind,
            env,
            default: raw.default,
            short: raw.short,
            aliases: raw.aliases,
        })
    }
}

/// Ordered collection of options keyed by configuration name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    entries: Vec<(String, CliOption)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Schema::insert`].
    pub fn with(mut self, key: impl Into<String>, option: CliOption) -> Self {
        self.insert(key, option);
        self
    }

    /// Insert an option, returning the previous declaration for the key if any.
    pub fn insert(&mut self, key: impl Into<String>, option: CliOption) -> Option<CliOption> {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, option)),
            None => {
                self.entries.push((key, option));
                None
            }
        }
    }

    /// Append every option from `other`, replacing keys that already exist.
    pub fn extend(&mut self, other: Schema) {
        for (key, option) in other.entries {
            self.insert(key, option);
        }
    }

    pub fn get(&self, key: &str) -> Option<&CliOption> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, option)| option)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CliOption)> {
        self.entries
            .iter()
            .map(|(key, option)| (key.as_str(), option))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a schema from a JSON object of `key -> option`, keeping the document's key order.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Read and parse a JSON schema file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SchemaRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| ConfigError::SchemaParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(SchemaVisitor)
    }
}

struct SchemaVisitor;

impl<'de> Visitor<'de> for SchemaVisitor {
    type Value = Schema;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of option names to option declarations")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut schema = Schema::new();
        while let Some((key, option)) = access.next_entry::<String, CliOption>()? {
            schema.insert(key, option);
        }
        Ok(schema)
    }
}

impl<K: Into<String>> FromIterator<(K, CliOption)> for Schema {
    fn from_iter<T: IntoIterator<Item = (K, CliOption)>>(iter: T) -> Self {
        let mut schema = Schema::new();
        for (key, option) in iter {
            schema.insert(key, option);
        }
        schema
    }
}
