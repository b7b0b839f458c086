//! Layered, read-only configuration store.
//!
//! Responsibilities:
//! - Hold resolved layers in precedence order (highest first).
//! - Answer key queries by scanning layers and returning the first definition.
//! - Provide typed accessors and a merged snapshot for display.
//!
//! Does NOT handle:
//! - Building layers (see `loader::resolve`).
//!
//! Invariants:
//! - The store is immutable once returned to the caller.
//! - Nested values are addressed with `:` separated paths (`cfenv:isLocal`, `servers:0`).
//! - Missing keys resolve to `None`; queries never fail.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::common::IS_LOCAL;
use crate::constants::KEY_SEPARATOR;

/// Source of a layer, listed from highest to lowest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Overrides,
    Argv,
    Env,
    File,
    Defaults,
    /// Read-only data such as the platform discovery result.
    Literal,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overrides => "overrides",
            Self::Argv => "argv",
            Self::Env => "env",
            Self::File => "file",
            Self::Defaults => "defaults",
            Self::Literal => "literal",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named source of configuration values.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    kind: LayerKind,
    values: Map<String, Value>,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind, values: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Look up a `:` separated path within this layer.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split(KEY_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.values.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Resolved configuration: a precedence-ordered stack of layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    layers: Vec<Layer>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer below every existing layer.
    pub(crate) fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Layers from highest to lowest precedence.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Resolve a key, returning the first definition from the highest layer.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }

    /// The layer that supplied the resolved value for `key`.
    pub fn source_of(&self, key: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.get(key).is_some())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Deserialize the resolved value for `key`.
    ///
    /// Returns `Ok(None)` when the key is absent and an error when it has the wrong shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        self.get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
    }

    /// Whether discovery (or an override) marked this process as running locally.
    pub fn is_local(&self) -> bool {
        self.get_bool(IS_LOCAL).unwrap_or(false)
    }

    /// Merge every layer into one object. Objects merge recursively; higher layers win.
    pub fn to_merged(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for layer in self.layers.iter().rev() {
            merge_into(&mut merged, &layer.values);
        }
        merged
    }
}

fn merge_into(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_into(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
