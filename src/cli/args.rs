//! CLI argument definitions using clap
//!
//! Commands:
//! - rqlfilter check --config <path>
//! - rqlfilter query --config <path> --data <path> <query>
//! - rqlfilter explain --config <path> <query>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rqlfilter - compile RQL queries against declarative filter schemas
#[derive(Parser, Debug)]
#[command(name = "rqlfilter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Default log directive when RQLFILTER_LOG and RUST_LOG are unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and compile a filter configuration
    Check {
        /// Path to filter configuration file
        #[arg(long, default_value = "./rqlfilter.json")]
        config: PathBuf,
    },

    /// Apply a query to a JSON array of documents
    Query {
        /// Path to filter configuration file
        #[arg(long, default_value = "./rqlfilter.json")]
        config: PathBuf,

        /// Path to a JSON file holding an array of documents
        #[arg(long)]
        data: PathBuf,

        /// RQL query string
        query: String,
    },

    /// Show the parse tree, predicate, ordering and selection of a query
    Explain {
        /// Path to filter configuration file
        #[arg(long, default_value = "./rqlfilter.json")]
        config: PathBuf,

        /// RQL query string
        query: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
