//! Output formatters for CLI commands.
//!
//! Provides JSON and table renderings of resolved values and schema descriptions.

use anyhow::Result;
use appenv_config::{EnvTransforms, Schema, Store};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::args::OutputFormat;

/// One resolved key with the layer that supplied it.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRow {
    pub key: String,
    pub value: Option<Value>,
    pub source: Option<String>,
}

/// One schema option as shown by `describe`.
#[derive(Debug, Clone, Serialize)]
pub struct OptionRow {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub env: Vec<String>,
    pub default: Option<Value>,
    pub description: String,
}

/// Formatter trait for different output types.
pub trait Formatter {
    fn format_resolved(&self, rows: &[ResolvedRow]) -> Result<String>;

    fn format_merged(&self, merged: &Map<String, Value>) -> Result<String>;

    fn format_value(&self, value: &Value) -> Result<String>;

    fn format_options(&self, rows: &[OptionRow]) -> Result<String>;
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Table => Box::new(TableFormatter),
    }
}

/// Rows for every key in `keys`, in order.
pub fn resolved_rows<'a>(store: &Store, keys: impl IntoIterator<Item = &'a str>) -> Vec<ResolvedRow> {
    keys.into_iter()
        .map(|key| ResolvedRow {
            key: key.to_string(),
            value: store.get(key).cloned(),
            source: store.source_of(key).map(|layer| layer.name().to_string()),
        })
        .collect()
}

pub fn option_rows(schema: &Schema) -> Vec<OptionRow> {
    let transforms = EnvTransforms::from_schema(schema);
    schema
        .iter()
        .map(|(key, option)| OptionRow {
            key: key.to_string(),
            kind: option.kind.as_str().to_string(),
            env: option.env.clone(),
            default: transforms.defaults().get(key).cloned(),
            description: transforms
                .description(key)
                .unwrap_or(&option.description)
                .to_string(),
        })
        .collect()
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_resolved(&self, rows: &[ResolvedRow]) -> Result<String> {
        let object: Map<String, Value> = rows
            .iter()
            .filter_map(|row| row.value.clone().map(|value| (row.key.clone(), value)))
            .collect();
        Ok(serde_json::to_string_pretty(&object)?)
    }

    fn format_merged(&self, merged: &Map<String, Value>) -> Result<String> {
        Ok(serde_json::to_string_pretty(merged)?)
    }

    fn format_value(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    fn format_options(&self, rows: &[OptionRow]) -> Result<String> {
        Ok(serde_json::to_string_pretty(rows)?)
    }
}

pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_resolved(&self, rows: &[ResolvedRow]) -> Result<String> {
        let body: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                vec![
                    row.key.clone(),
                    row.value.as_ref().map(display_value).unwrap_or_default(),
                    row.source.clone().unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        Ok(render_table(&["KEY", "VALUE", "SOURCE"], &body))
    }

    fn format_merged(&self, merged: &Map<String, Value>) -> Result<String> {
        let body: Vec<Vec<String>> = merged
            .iter()
            .map(|(key, value)| vec![key.clone(), display_value(value)])
            .collect();
        Ok(render_table(&["KEY", "VALUE"], &body))
    }

    fn format_value(&self, value: &Value) -> Result<String> {
        Ok(display_value(value))
    }

    fn format_options(&self, rows: &[OptionRow]) -> Result<String> {
        let body: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                vec![
                    row.key.clone(),
                    row.kind.clone(),
                    row.env.join(", "),
                    row.default.as_ref().map(display_value).unwrap_or_default(),
                    row.description.clone(),
                ]
            })
            .collect();
        Ok(render_table(
            &["OPTION", "TYPE", "ENV", "DEFAULT", "DESCRIPTION"],
            &body,
        ))
    }
}

/// Strings print bare; everything else prints as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut output, &header, &widths);
    for row in rows {
        push_row(&mut output, row, &widths);
    }
    output
}

fn push_row(output: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (idx, cell) in cells.iter().enumerate() {
        if idx == last {
            output.push_str(cell);
        } else {
            let pad = widths[idx] - cell.chars().count();
            output.push_str(cell);
            output.push_str(&" ".repeat(pad + 2));
        }
    }
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use appenv_config::CliOption;
    use serde_json::json;

    fn rows() -> Vec<ResolvedRow> {
        vec![
            ResolvedRow {
                key: "port".to_string(),
                value: Some(json!(8080)),
                source: Some("argv".to_string()),
            },
            ResolvedRow {
                key: "bind".to_string(),
                value: None,
                source: None,
            },
        ]
    }

    #[test]
    fn test_json_resolved_skips_missing_values() {
        let output = JsonFormatter.format_resolved(&rows()).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!({"port": 8080}));
    }

    #[test]
    fn test_table_resolved_aligns_columns() {
        let output = TableFormatter.format_resolved(&rows()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "KEY   VALUE  SOURCE");
        assert_eq!(lines[1], "port  8080   argv");
        assert_eq!(lines[2], "bind         -");
    }

    #[test]
    fn test_option_rows_include_annotated_description() {
        let schema = Schema::new().with(
            "port",
            CliOption::number("Port to bind to")
                .with_env("PORT")
                .with_default(3000),
        );
        let rows = option_rows(&schema);
        assert_eq!(rows[0].kind, "number");
        assert_eq!(rows[0].description, "Port to bind to (env:PORT)");
        assert_eq!(rows[0].default, Some(json!(3000)));

        let output = JsonFormatter.format_options(&rows).unwrap();
        assert!(output.contains("\"type\": \"number\""));
    }

    #[test]
    fn test_display_value_prints_strings_bare() {
        assert_eq!(display_value(&json!("x")), "x");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
