//! rqlfilter - compile Resource Query Language queries into typed
//! predicates against declarative filter schemas
//!
//! A schema is compiled once from a nested declaration; each query is
//! parsed, checked against the schema, coerced to typed values and turned
//! into a predicate, an ordering and a selection plan for a [`store::ResultSet`].

pub mod cli;
pub mod constants;
pub mod filter;
pub mod observability;
pub mod parser;
pub mod schema;
pub mod store;

pub use filter::{AppliedQuery, FilterClass, FilterError, FilterResult, Predicate};
pub use schema::{CompiledSchema, ConfigError, FilterDecl, SchemaCompiler};
