//! Schema compilation errors
//!
//! Error codes:
//! - RQL_UNKNOWN_MODEL (FATAL)
//! - RQL_UNKNOWN_FIELD (FATAL)
//! - RQL_UNSUPPORTED_FIELD (FATAL)
//! - RQL_NOT_A_RELATION (FATAL)
//! - RQL_RESERVED_FILTER_NAME (FATAL)
//! - RQL_DUPLICATE_FILTER (FATAL)
//! - RQL_INVALID_DECLARATION (FATAL)
//! - RQL_INVALID_LOOKUP (FATAL)
//! - RQL_MODEL_IMMUTABLE (FATAL)
//!
//! A schema is compiled once at startup; every violation is a programming
//! error and must stop the process instead of being retried.

use std::fmt;

use thiserror::Error;

use crate::constants::FilterLookup;

/// Severity levels shared by schema and query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected, the process stays healthy
    Reject,
    /// Configuration is unusable, the process must not start
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Errors raised while compiling a filter declaration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("model '{0}' is not registered")]
    UnknownModel(String),

    #[error("model '{model}' has no field '{field}'")]
    UnknownField { model: String, field: String },

    #[error("unsupported field type: {0}")]
    UnsupportedField(String),

    #[error("field '{0}' is not a relation")]
    NotARelation(String),

    #[error("filter name '{0}' is reserved")]
    ReservedName(String),

    #[error("filter '{0}' is declared more than once")]
    DuplicateFilter(String),

    #[error("invalid declaration for '{name}': {reason}")]
    InvalidDeclaration { name: String, reason: String },

    #[error("lookup '{lookup}' is not valid for filter '{name}'")]
    InvalidLookup { name: String, lookup: FilterLookup },

    #[error("model '{0}' is already registered")]
    ModelImmutable(String),

    #[error("malformed configuration '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

impl ConfigError {
    /// Create an invalid declaration error
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidDeclaration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns the string error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::UnknownModel(_) => "RQL_UNKNOWN_MODEL",
            ConfigError::UnknownField { .. } => "RQL_UNKNOWN_FIELD",
            ConfigError::UnsupportedField(_) => "RQL_UNSUPPORTED_FIELD",
            ConfigError::NotARelation(_) => "RQL_NOT_A_RELATION",
            ConfigError::ReservedName(_) => "RQL_RESERVED_FILTER_NAME",
            ConfigError::DuplicateFilter(_) => "RQL_DUPLICATE_FILTER",
            ConfigError::InvalidDeclaration { .. } => "RQL_INVALID_DECLARATION",
            ConfigError::InvalidLookup { .. } => "RQL_INVALID_LOOKUP",
            ConfigError::ModelImmutable(_) => "RQL_MODEL_IMMUTABLE",
            ConfigError::Malformed { .. } => "RQL_MALFORMED_CONFIG",
        }
    }

    /// Configuration errors are always fatal
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

/// Result type for schema operations
pub type ConfigResult<T> = Result<T, ConfigError>;
