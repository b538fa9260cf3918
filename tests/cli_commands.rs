//! CLI Command Tests
//!
//! `check`, `query` and `explain` against configuration and data files on
//! disk. Commands return the JSON payload written to stdout.

use std::fs;
use std::path::{Path, PathBuf};

use rqlfilter::cli::{self, Command};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let config = write(
        tmp.path(),
        "rqlfilter.json",
        &json!({
            "model": "city",
            "models": [{
                "name": "city",
                "fields": [
                    {"name": "id", "type": "integer", "primary_key": true},
                    {"name": "name", "type": "string"},
                    {"name": "population", "type": "integer"},
                    {"name": "founded", "type": "date", "null": true}
                ]
            }],
            "filters": [
                "id",
                {"filter": "name", "search": true, "ordering": true},
                {"filter": "population", "ordering": true},
                "founded"
            ],
            "select": true,
            "max_limit": 2
        }),
    );
    let data = write(
        tmp.path(),
        "cities.json",
        &json!([
            {"id": 1, "name": "Lisbon", "population": 545000, "founded": null},
            {"id": 2, "name": "Oslo", "population": 709000, "founded": "1040-01-01"},
            {"id": 3, "name": "Lyon", "population": 522000, "founded": null}
        ]),
    );
    (tmp, config, data)
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_check_summarizes_schema() {
    let (_tmp, config, _) = setup();
    let summary = cli::check(&config).unwrap();
    assert_eq!(summary["model"], "city");
    assert_eq!(summary["ordering"], json!(["name", "population"]));
    assert_eq!(summary["search"], json!(["name"]));
    assert_eq!(summary["select"], true);
    assert!(summary["filters"]["founded"]["lookups"]
        .as_array()
        .unwrap()
        .contains(&json!("null")));
}

#[test]
fn test_query_filters_orders_and_caps_limit() {
    let (_tmp, config, data) = setup();
    let result = cli::query(&config, &data, "name=like=L*&ordering(-population)").unwrap();
    assert_eq!(result["count"], 2);
    let names: Vec<_> = result["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Lisbon", "Lyon"]);

    let result = cli::query(&config, &data, "limit=50").unwrap();
    assert_eq!(result["pagination"]["limit"], 2);
    assert_eq!(result["count"], 2);
}

#[test]
fn test_query_null_sentinel() {
    let (_tmp, config, data) = setup();
    let result = cli::query(&config, &data, "founded=ne=null()").unwrap();
    assert_eq!(result["documents"][0]["id"], 2);
    assert_eq!(result["count"], 1);
}

#[test]
fn test_query_search() {
    let (_tmp, config, data) = setup();
    let result = cli::query(&config, &data, "search=ly").unwrap();
    assert_eq!(result["count"], 1);
    assert_eq!(result["documents"][0]["name"], "Lyon");
}

#[test]
fn test_query_errors_carry_codes() {
    let (_tmp, config, data) = setup();
    let err = cli::query(&config, &data, "population=like=5").unwrap_err();
    assert_eq!(err.code(), "RQL_LOOKUP_ERROR");
    assert_eq!(err.exit_code(), 1);

    let err = cli::query(&config, &data, "ordering(id)").unwrap_err();
    assert_eq!(err.code(), "RQL_PARSING_ERROR");
}

#[test]
fn test_explain_shows_predicate() {
    let (_tmp, config, _) = setup();
    let explained = cli::explain(&config, "population=gt=600000|id=1").unwrap();
    assert_eq!(
        explained["predicate"],
        "(population__gt=600000 OR id__exact=1)"
    );
    assert_eq!(explained["tree"]["type"], "logical");
    assert_eq!(explained["distinct"], false);

    let explained = cli::explain(&config, "ordering(-population,name)").unwrap();
    assert_eq!(explained["ordering"], json!(["-population", "name"]));
    assert_eq!(explained["predicate"], "TRUE");

    let explained = cli::explain(&config, "").unwrap();
    assert!(explained["tree"].is_null());
}

#[test]
fn test_missing_config_is_config_error() {
    let tmp = TempDir::new().unwrap();
    let err = cli::run_command(Command::Check {
        config: tmp.path().join("absent.json"),
    })
    .unwrap_err();
    assert_eq!(err.code(), "RQL_CLI_CONFIG_ERROR");
}

#[test]
fn test_data_must_be_array() {
    let (tmp, config, _) = setup();
    let data = write(tmp.path(), "object.json", &json!({"id": 1}));
    let err = cli::query(&config, &data, "id=1").unwrap_err();
    assert_eq!(err.code(), "RQL_CLI_CONFIG_ERROR");
}
