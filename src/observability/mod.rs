//! Observability subsystem
//!
//! Typed events rendered as structured `tracing` records.
//!
//! # Usage
//!
//! ```ignore
//! use rqlfilter::observability::{Event, Logger};
//!
//! Logger::log(Event::QueryApplied, &[("query", "id=1"), ("distinct", "false")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{render_fields, Level, Logger, LOG_ENV, STRUCTURED_FIELDS};
