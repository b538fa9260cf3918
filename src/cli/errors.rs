//! CLI-specific error types
//!
//! Every CLI error ends the process with exit code 1.

use std::io;

use thiserror::Error;

use crate::filter::FilterError;
use crate::schema::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Schema(#[from] ConfigError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "RQL_CLI_CONFIG_ERROR",
            Self::Schema(e) => e.code(),
            Self::Filter(e) => e.code(),
            Self::Io(_) | Self::Json(_) => "RQL_CLI_IO_ERROR",
        }
    }

    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CliError::config_error("x").code(), "RQL_CLI_CONFIG_ERROR");
        let err: CliError = FilterError::parsing("bad").into();
        assert_eq!(err.code(), "RQL_PARSING_ERROR");
        let err: CliError = ConfigError::UnknownModel("book".into()).into();
        assert_eq!(err.exit_code(), 1);
        assert!(err.code().starts_with("RQL_"));
    }
}
