//! Structured event logging on top of `tracing`
//!
//! - One log line = one event
//! - Known keys ([`STRUCTURED_FIELDS`]) are recorded as individual tracing
//!   fields; any other keys are rendered, sorted, into a single `extra` field
//! - Subscriber installed once by the binary; library code only emits

use std::fmt;

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`
pub const LOG_ENV: &str = "RQLFILTER_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys recorded as first-class tracing fields
pub const STRUCTURED_FIELDS: [&str; 11] = [
    "model", "filter", "filters", "lookup", "path", "query", "stage", "code", "details", "limit",
    "distinct",
];

macro_rules! emit {
    ($level:ident, $event:expr, $get:ident, $extra:expr) => {
        tracing::$level!(
            event = $event,
            model = $get("model"),
            filter = $get("filter"),
            filters = $get("filters"),
            lookup = $get("lookup"),
            path = $get("path"),
            query = $get("query"),
            stage = $get("stage"),
            code = $get("code"),
            details = $get("details"),
            limit = $get("limit"),
            distinct = $get("distinct"),
            extra = $extra,
        )
    };
}

pub struct Logger;

impl Logger {
    /// Emits `event` at its own level.
    pub fn log(event: super::Event, fields: &[(&str, &str)]) {
        Self::log_at(event.level(), event.as_str(), fields);
    }

    pub fn log_at(level: Level, event: &str, fields: &[(&str, &str)]) {
        let get = |key: &str| fields.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
        let unknown: Vec<(&str, &str)> = fields
            .iter()
            .filter(|(k, _)| !STRUCTURED_FIELDS.contains(k))
            .copied()
            .collect();
        let extra = if unknown.is_empty() {
            None
        } else {
            Some(render_fields(&unknown))
        };
        let extra = extra.as_deref();

        match level {
            Level::Debug => emit!(debug, event, get, extra),
            Level::Info => emit!(info, event, get, extra),
            Level::Warn => emit!(warn, event, get, extra),
            Level::Error => emit!(error, event, get, extra),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Filter directives come from `RQLFILTER_LOG`, then `RUST_LOG`, then
    /// `default_directive`. Calling this twice is a no-op.
    pub fn init(default_directive: &str, json: bool) {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false);

        let _ = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
    }
}

/// Renders `key=value` pairs sorted by key, space separated.
pub fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    sorted
        .iter()
        .map(|(k, v)| {
            if v.is_empty() || v.contains(char::is_whitespace) || v.contains('"') {
                format!("{}={:?}", k, v)
            } else {
                format!("{}={}", k, v)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
