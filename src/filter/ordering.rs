//! Ordering resolution
//!
//! `ordering(-age,name)` becomes a list of sort keys. A name must be
//! declared orderable; fan-out filters contribute one key per source, in
//! declaration order, all with the same direction.

use crate::observability::{Event, Logger};
use crate::schema::CompiledSchema;
use crate::store::{ResultSet, SortDirection, SortSpec};

use super::errors::{FilterError, FilterResult};
use super::hooks::CustomFilterHooks;

/// Sort keys plus whether any contributing filter forces deduplication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOrdering {
    pub keys: Vec<SortSpec>,
    pub distinct: bool,
}

pub struct OrderingResolver<'a> {
    schema: &'a CompiledSchema,
    hooks: &'a dyn CustomFilterHooks,
}

impl<'a> OrderingResolver<'a> {
    pub fn new(schema: &'a CompiledSchema, hooks: &'a dyn CustomFilterHooks) -> Self {
        Self { schema, hooks }
    }

    /// Resolves the ordering groups of one query. At most one group is
    /// allowed.
    pub fn resolve(&self, groups: &[Vec<String>]) -> FilterResult<ResolvedOrdering> {
        let group = match groups {
            [] => return Ok(ResolvedOrdering::default()),
            [group] => group,
            _ => {
                return Err(FilterError::parsing(
                    "only one ordering operation is allowed",
                ))
            }
        };

        let mut resolved = ResolvedOrdering::default();
        for token in group {
            let (name, direction) = split_direction(token);
            if name.is_empty() || !self.schema.ordering_filters().contains(name) {
                return Err(FilterError::parsing(format!(
                    "bad ordering filter: {}",
                    token
                )));
            }
            let entry = self
                .schema
                .get(name)
                .ok_or_else(|| FilterError::parsing(format!("bad ordering filter: {}", token)))?;

            for descriptor in entry.descriptors() {
                let field = if descriptor.custom {
                    Logger::log(
                        Event::CustomFilterDelegated,
                        &[("filter", name), ("stage", "ordering")],
                    );
                    self.hooks.custom_ordering_path(name, descriptor)?
                } else {
                    descriptor.path.clone()
                };
                resolved.distinct |= descriptor.distinct;
                resolved.keys.push(SortSpec { field, direction });
            }
        }
        Ok(resolved)
    }

    /// Resolves `groups` and sorts `rs`, deduplicating first when a
    /// contributing filter requires it.
    pub fn apply_ordering<R: ResultSet>(&self, rs: R, groups: &[Vec<String>]) -> FilterResult<R> {
        let resolved = self.resolve(groups)?;
        let rs = if resolved.distinct { rs.distinct() } else { rs };
        if resolved.keys.is_empty() {
            return Ok(rs);
        }
        Ok(rs.order_by(&resolved.keys))
    }
}

fn split_direction(token: &str) -> (&str, SortDirection) {
    if let Some(name) = token.strip_prefix('-') {
        (name, SortDirection::Desc)
    } else if let Some(name) = token.strip_prefix('+') {
        (name, SortDirection::Asc)
    } else {
        (token, SortDirection::Asc)
    }
}
