//! CLI module for rqlfilter
//!
//! Provides command-line interface for:
//! - check: compile a filter configuration
//! - query: filter a JSON document set
//! - explain: show how a query compiles

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, explain, query, run, run_command};
pub use config::FilterConfig;
pub use errors::{CliError, CliResult};
pub use io::{read_documents, write_error, write_response};
