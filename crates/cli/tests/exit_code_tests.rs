//! Integration tests for structured exit codes.
//!
//! These tests verify that appenv returns the correct exit codes
//! for different error scenarios, enabling reliable shell scripting.

mod common;

use common::appenv_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_success_returns_exit_code_0() {
    let temp_dir = TempDir::new().unwrap();
    appenv_cmd(temp_dir.path()).arg("describe").assert().code(0);
}

#[test]
fn test_invalid_choice_returns_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    appenv_cmd(temp_dir.path())
        .args(["resolve", "--", "--env", "staging"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_app_help_lists_env_annotations() {
    let temp_dir = TempDir::new().unwrap();
    appenv_cmd(temp_dir.path())
        .args(["resolve", "--", "--help"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Port to bind to (env:PORT)"));
}

#[test]
fn test_malformed_override_returns_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    appenv_cmd(temp_dir.path())
        .args(["--override", "novalue", "resolve"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_malformed_schema_returns_input_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("schema.json"), "{ not json").unwrap();

    appenv_cmd(temp_dir.path())
        .args(["--schema", "schema.json", "describe"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("schema.json"));
}

#[test]
fn test_missing_key_returns_not_found() {
    let temp_dir = TempDir::new().unwrap();
    appenv_cmd(temp_dir.path())
        .args(["get", "dbUrl"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("dbUrl"));
}

#[test]
fn test_conflicting_schema_returns_input_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("schema.json"),
        r#"{"host": {"short": "x"}, "hops": {"type": "number", "short": "x"}}"#,
    )
    .unwrap();

    appenv_cmd(temp_dir.path())
        .args(["--schema", "schema.json", "resolve"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("'-x'"));
}
