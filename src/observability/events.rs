//! Observable events of the filter engine
//!
//! Events are explicit and typed. Library code emits them through
//! [`Logger`](super::Logger); the hosting binary decides where they go.

use std::fmt;

use super::logger::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Filter declaration compiled into a registry
    SchemaCompiled,
    /// Filter configuration file loaded
    ConfigLoaded,
    /// Query string received by a filter class
    QueryReceived,
    /// Predicate, ordering and selection applied
    QueryApplied,
    /// Query failed with a parsing, lookup or value error
    QueryRejected,
    /// Query referenced a name the schema does not declare
    UnknownFilterIgnored,
    /// Predicate or ordering handed to the custom hooks
    CustomFilterDelegated,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaCompiled => "SCHEMA_COMPILED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::QueryReceived => "QUERY_BEGIN",
            Event::QueryApplied => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::UnknownFilterIgnored => "UNKNOWN_FILTER_IGNORED",
            Event::CustomFilterDelegated => "CUSTOM_FILTER_DELEGATED",
        }
    }

    /// Level the event is logged at
    pub fn level(&self) -> Level {
        match self {
            Event::QueryReceived | Event::CustomFilterDelegated => Level::Debug,
            Event::UnknownFilterIgnored | Event::QueryRejected => Level::Warn,
            Event::SchemaCompiled | Event::ConfigLoaded | Event::QueryApplied => Level::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
