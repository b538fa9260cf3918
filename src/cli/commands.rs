//! CLI command implementations
//!
//! Each command loads the filter configuration, compiles the schema and
//! writes one JSON response to stdout. Errors bubble up to [`run`], which
//! reports them and maps them to the process exit code.

use std::path::Path;

use serde_json::{json, Value};

use crate::filter::FilterClass;
use crate::observability::Logger;
use crate::store::{MemoryResultSet, SortSpec};

use super::args::{Cli, Command};
use super::config::FilterConfig;
use super::errors::CliResult;
use super::io::{read_documents, write_error, write_response};

/// Parses arguments, installs logging and runs the command.
///
/// Returns the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse_args();
    Logger::init(&cli.log_level, cli.json_logs);

    match run_command(cli.command) {
        Ok(()) => 0,
        Err(err) => {
            if write_error(&err).is_err() {
                eprintln!("{}", err);
            }
            err.exit_code()
        }
    }
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    let data = match cmd {
        Command::Check { config } => check(&config)?,
        Command::Query {
            config,
            data,
            query: q,
        } => query(&config, &data, &q)?,
        Command::Explain { config, query } => explain(&config, &query)?,
    };
    write_response(data)
}

fn load_class(config_path: &Path) -> CliResult<FilterClass> {
    FilterConfig::load(config_path)?.build_filter_class()
}

/// Compiles the configuration and summarizes the schema.
pub fn check(config_path: &Path) -> CliResult<Value> {
    let class = load_class(config_path)?;
    let schema = class.schema();
    Ok(json!({
        "model": schema.model(),
        "filters": schema.filters(),
        "ordering": schema.ordering_filters(),
        "search": schema.search_filters(),
        "extended_search": schema.extended_search(),
        "hidden": schema.select_tree().hidden_paths(),
        "distinct": schema.is_distinct(),
        "select": class.select_enabled(),
    }))
}

/// Applies `query` to the documents stored at `data_path`.
pub fn query(config_path: &Path, data_path: &Path, query: &str) -> CliResult<Value> {
    let class = load_class(config_path)?;
    let documents = read_documents(data_path)?;
    let applied = class.apply(query, MemoryResultSet::new(documents))?;

    let hints: Vec<Value> = applied
        .result
        .applied_hints()
        .iter()
        .map(|h| json!({"kind": h.kind, "relations": h.relations()}))
        .collect();
    Ok(json!({
        "count": applied.result.len(),
        "pagination": applied.pagination,
        "select": applied.select,
        "hints": hints,
        "documents": applied.result.into_documents(),
    }))
}

/// Describes how `query` compiles without running it.
pub fn explain(config_path: &Path, query: &str) -> CliResult<Value> {
    let class = load_class(config_path)?;
    let (tree, transformed) = match class.transform(query, None)? {
        Some(parts) => parts,
        None => return Ok(json!({ "tree": null, "predicate": null })),
    };

    let resolved = class.resolve_ordering(&transformed.ordering)?;
    let ordering: Vec<String> = resolved.keys.iter().map(SortSpec::to_token).collect();

    Ok(json!({
        "tree": tree,
        "predicate": transformed.predicate.to_string(),
        "predicate_tree": transformed.predicate,
        "ordering": ordering,
        "select": transformed.select,
        "limit": transformed.limit,
        "offset": transformed.offset,
        "distinct": transformed.distinct || resolved.distinct || class.schema().is_distinct(),
    }))
}
