//! JSON I/O handling for the CLI
//!
//! Output is a single JSON object per command on stdout, UTF-8 only.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Reads a JSON array of documents.
pub fn read_documents(path: &Path) -> CliResult<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    match serde_json::from_str(&content)? {
        Value::Array(documents) => Ok(documents),
        _ => Err(CliError::config_error(format!(
            "{}: expected a JSON array of documents",
            path.display()
        ))),
    }
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_json(&json!({
        "status": "ok",
        "data": data
    }))
}

/// Write an error response to stdout
pub fn write_error(err: &CliError) -> CliResult<()> {
    let mut response = json!({
        "status": "error",
        "code": err.code(),
        "message": err.to_string(),
    });
    if let CliError::Filter(filter_err) = err {
        response["details"] = filter_err.details();
    }
    write_json(&response)
}

fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
