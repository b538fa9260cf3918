//! Query-time filtering
//!
//! Turns a parse tree into a store predicate, ordering keys and a
//! selection plan against a [`CompiledSchema`](crate::schema::CompiledSchema).

mod builder;
mod coercion;
mod errors;
mod filter_class;
mod hooks;
mod ordering;
mod pattern;
mod predicate;
mod search;
mod select;
mod transformer;

pub use builder::PredicateBuilder;
pub use coercion::{coerce_value, parse_date, parse_datetime, strip_quotes};
pub use errors::{FilterError, FilterResult};
pub use filter_class::{AppliedQuery, FilterClass, Pagination};
pub use hooks::{CustomFilterContext, CustomFilterHooks, NoCustomFilters, RequestContext};
pub use ordering::{OrderingResolver, ResolvedOrdering};
pub use pattern::{translate, Pattern};
pub use predicate::{Condition, Predicate, StoreLookup, TypedValue};
pub use search::normalize_search_value;
pub use select::{apply_hints, SelectResolver, SelectionPlan};
pub use transformer::{QueryTransformer, TransformedQuery};
