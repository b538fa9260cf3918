//! Query-time errors
//!
//! Error codes:
//! - RQL_CONFIGURATION_ERROR (FATAL)
//! - RQL_* from the schema compiler (FATAL)
//! - RQL_PARSING_ERROR (REJECT)
//! - RQL_LOOKUP_ERROR (REJECT)
//! - RQL_VALUE_ERROR (REJECT)
//!
//! Rejections are per request and never retried; the caller turns them
//! into a client-facing response using [`FilterError::details`].

use serde_json::{json, Value};
use thiserror::Error;

use crate::constants::FilterLookup;
use crate::schema::{ConfigError, Severity};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Hook or class misconfiguration detected while serving a query
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Schema(#[from] ConfigError),

    #[error("parsing error: {details}")]
    Parsing { details: String },

    #[error("lookup '{lookup}' is not allowed for filter '{filter}' (value: '{value}')")]
    Lookup {
        filter: String,
        lookup: FilterLookup,
        value: String,
    },

    #[error("value '{value}' is invalid for filter '{filter}' (lookup: {lookup})")]
    Value {
        filter: String,
        lookup: FilterLookup,
        value: String,
    },
}

impl FilterError {
    pub fn parsing(details: impl Into<String>) -> Self {
        FilterError::Parsing {
            details: details.into(),
        }
    }

    pub fn lookup(filter: &str, lookup: FilterLookup, value: &str) -> Self {
        FilterError::Lookup {
            filter: filter.to_string(),
            lookup,
            value: value.to_string(),
        }
    }

    pub fn value(filter: &str, lookup: FilterLookup, value: &str) -> Self {
        FilterError::Value {
            filter: filter.to_string(),
            lookup,
            value: value.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FilterError::Configuration(_) => "RQL_CONFIGURATION_ERROR",
            FilterError::Schema(e) => e.code(),
            FilterError::Parsing { .. } => "RQL_PARSING_ERROR",
            FilterError::Lookup { .. } => "RQL_LOOKUP_ERROR",
            FilterError::Value { .. } => "RQL_VALUE_ERROR",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FilterError::Configuration(_) | FilterError::Schema(_) => Severity::Fatal,
            _ => Severity::Reject,
        }
    }

    /// Client-facing detail object
    pub fn details(&self) -> Value {
        match self {
            FilterError::Lookup {
                filter,
                lookup,
                value,
            }
            | FilterError::Value {
                filter,
                lookup,
                value,
            } => json!({
                "filter": filter,
                "lookup": lookup.as_str(),
                "value": value,
            }),
            FilterError::Parsing { details } => json!({ "error": details }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
