//! Schema-to-environment transform builder.
//!
//! Responsibilities:
//! - Derive the environment whitelist from the schema.
//! - Build the rename table from environment variable name to schema key.
//! - Produce help descriptions annotated with backing variables.
//! - Collect the defaults map.
//!
//! Does NOT handle:
//! - Reading the environment (see `env.rs`).
//!
//! Invariants:
//! - Each declared variable appears in the whitelist exactly once, in first-declaration order.
//! - If two options declare the same variable, the later option owns the rename.
//! - Renames pass values through unchanged.
//! - Options without a default are absent from the defaults map; falsy defaults are kept.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::schema::Schema;

/// Environment whitelist, rename table, descriptions and defaults derived from a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvTransforms {
    whitelist: Vec<String>,
    renames: BTreeMap<String, String>,
    descriptions: BTreeMap<String, String>,
    defaults: Map<String, Value>,
}

impl EnvTransforms {
    /// Build the transforms for one resolution call.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut transforms = Self::default();

        for (key, option) in schema.iter() {
            for name in &option.env {
                if !transforms.renames.contains_key(name) {
                    transforms.whitelist.push(name.clone());
                }
                transforms.renames.insert(name.clone(), key.to_string());
            }

            transforms
                .descriptions
                .insert(key.to_string(), option.annotated_description());

            if let Some(default) = &option.default {
                transforms.defaults.insert(key.to_string(), default.clone());
            }
        }

        transforms
    }

    /// Environment variable names eligible for the environment layer.
    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    pub fn is_whitelisted(&self, name: &str) -> bool {
        self.renames.contains_key(name)
    }

    /// Schema key a variable is renamed to.
    pub fn key_for(&self, name: &str) -> Option<&str> {
        self.renames.get(name).map(String::as_str)
    }

    /// Rename a variable/value pair to its schema key. Non-whitelisted names yield `None`.
    pub fn apply(&self, name: &str, value: Value) -> Option<(String, Value)> {
        self.key_for(name).map(|key| (key.to_string(), value))
    }

    /// Help text for a key, including its backing variables.
    pub fn description(&self, key: &str) -> Option<&str> {
        self.descriptions.get(key).map(String::as_str)
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }
}
