//! Result-set abstraction
//!
//! The filter engine never touches data directly. It drives a
//! [`ResultSet`] through filtering, deduplication, ordering, relation
//! hints and pagination; [`MemoryResultSet`] is the in-process adapter
//! over JSON documents used by the CLI and tests.

mod matcher;
mod memory;
mod sorter;

pub use matcher::{first_value, resolve_path, PredicateMatcher};
pub use memory::MemoryResultSet;
pub use sorter::{ResultSorter, SortDirection, SortSpec};

use crate::filter::Predicate;
use crate::schema::QueryHint;

/// Target of a filter class. Every step consumes and returns the set.
pub trait ResultSet: Sized {
    fn filter(self, predicate: &Predicate) -> Self;

    /// Drops duplicate rows, keeping the first occurrence.
    fn distinct(self) -> Self;

    fn order_by(self, keys: &[SortSpec]) -> Self;

    /// Applies a relation-loading hint. Stores without relation loading
    /// may ignore it.
    fn optimize(self, hint: &QueryHint) -> Self;

    fn paginate(self, offset: u64, limit: Option<u64>) -> Self;
}
