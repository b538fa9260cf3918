//! Predicate builder
//!
//! Resolves one `(filter, operator, raw value)` triple against the compiled
//! schema:
//!
//! 1. the search pseudo-filter is handed to the search resolver
//! 2. unknown names yield a neutral predicate
//! 3. the lookup must be permitted by the filter
//! 4. null and empty sentinels are resolved, other literals are coerced
//! 5. custom filters are delegated to the hooks
//! 6. one condition per source; fan-out combines with OR, or AND for `ne`

use crate::constants::{
    ComparisonOperator, FilterLookup, ListOperator, RQL_EMPTY, RQL_SEARCH_PARAM,
};
use crate::observability::{Event, Logger};
use crate::schema::{CompiledSchema, FieldDescriptor};

use super::coercion::coerce_value;
use super::errors::{FilterError, FilterResult};
use super::hooks::{CustomFilterContext, CustomFilterHooks, RequestContext};
use super::pattern::translate;
use super::predicate::{Predicate, StoreLookup, TypedValue};

/// Per-query predicate builder.
///
/// Holds the only mutable per-query state: whether any visited filter
/// requires deduplication.
pub struct PredicateBuilder<'a> {
    pub(crate) schema: &'a CompiledSchema,
    hooks: &'a dyn CustomFilterHooks,
    request: Option<&'a RequestContext>,
    distinct: bool,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(schema: &'a CompiledSchema, hooks: &'a dyn CustomFilterHooks) -> Self {
        Self {
            schema,
            hooks,
            request: None,
            distinct: false,
        }
    }

    pub fn with_request(mut self, request: Option<&'a RequestContext>) -> Self {
        self.request = request;
        self
    }

    /// True once any visited filter was flagged `distinct`
    pub fn requires_distinct(&self) -> bool {
        self.distinct
    }

    pub fn build_predicate(
        &mut self,
        filter: &str,
        operator: ComparisonOperator,
        raw: &str,
        list: Option<ListOperator>,
    ) -> FilterResult<Predicate> {
        if filter == RQL_SEARCH_PARAM {
            return self.build_search_predicate(operator, raw);
        }

        let entry = match self.schema.get(filter) {
            Some(entry) => entry,
            None => {
                Logger::log(Event::UnknownFilterIgnored, &[("filter", filter)]);
                return Ok(Predicate::Neutral);
            }
        };
        if entry.is_distinct() {
            self.distinct = true;
        }

        let base = entry.base().ok_or_else(|| {
            FilterError::Configuration(format!("filter '{}' has no sources", filter))
        })?;
        let lookup = FilterLookup::from(operator);
        let permitted = list.map(FilterLookup::from).unwrap_or(lookup);
        if !base.permits(permitted) {
            return Err(FilterError::lookup(filter, permitted, raw));
        }

        let negated = operator == ComparisonOperator::Ne;
        let equality = matches!(operator, ComparisonOperator::Eq | ComparisonOperator::Ne);

        let (store_lookup, value) = if base.is_null_value(raw) {
            if !equality {
                return Err(FilterError::lookup(filter, lookup, raw));
            }
            if !base.permits(FilterLookup::Null) {
                return Err(FilterError::lookup(filter, FilterLookup::Null, raw));
            }
            (StoreLookup::IsNull, TypedValue::Bool(true))
        } else {
            if raw == RQL_EMPTY && !equality {
                return Err(FilterError::lookup(filter, lookup, raw));
            }
            let typed = coerce_value(&base.field, base.use_repr, raw)
                .ok_or_else(|| FilterError::value(filter, lookup, raw))?;
            (comparison_lookup(operator), typed)
        };

        if base.custom {
            return self.delegate(filter, lookup, store_lookup, negated, &value, raw, base);
        }

        let mut leaves = Vec::with_capacity(entry.descriptors().len());
        for descriptor in entry.descriptors() {
            let leaf = leaf_predicate(descriptor, operator, store_lookup, &value)
                .ok_or_else(|| FilterError::value(filter, lookup, raw))?;
            leaves.push(if negated { leaf.negate() } else { leaf });
        }

        Ok(if negated {
            Predicate::all(leaves)
        } else {
            Predicate::any(leaves)
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn delegate(
        &self,
        filter: &str,
        lookup: FilterLookup,
        store_lookup: StoreLookup,
        negated: bool,
        value: &TypedValue,
        raw: &str,
        descriptor: &FieldDescriptor,
    ) -> FilterResult<Predicate> {
        Logger::log(
            Event::CustomFilterDelegated,
            &[("filter", filter), ("lookup", lookup.as_str())],
        );
        let ctx = CustomFilterContext {
            filter,
            lookup,
            store_lookup,
            negated,
            value,
            raw_value: raw,
            descriptor,
            request: self.request,
        };
        self.hooks.build_custom_predicate(&ctx)
    }
}

fn comparison_lookup(operator: ComparisonOperator) -> StoreLookup {
    match operator {
        ComparisonOperator::Eq | ComparisonOperator::Ne => StoreLookup::Exact,
        ComparisonOperator::Lt => StoreLookup::Lt,
        ComparisonOperator::Le => StoreLookup::Lte,
        ComparisonOperator::Gt => StoreLookup::Gt,
        ComparisonOperator::Ge => StoreLookup::Gte,
        ComparisonOperator::Like => StoreLookup::Exact,
        ComparisonOperator::ILike => StoreLookup::IExact,
    }
}

/// Condition for one source, before negation. `None` if a pattern
/// operand is not a usable string.
fn leaf_predicate(
    descriptor: &FieldDescriptor,
    operator: ComparisonOperator,
    store_lookup: StoreLookup,
    value: &TypedValue,
) -> Option<Predicate> {
    if store_lookup == StoreLookup::IsNull {
        return Some(Predicate::condition(
            descriptor.path.clone(),
            StoreLookup::IsNull,
            value.clone(),
        ));
    }

    match operator {
        ComparisonOperator::Like | ComparisonOperator::ILike => {
            let text = match value {
                TypedValue::String(s) => s,
                _ => return None,
            };
            let pattern = translate(text, operator == ComparisonOperator::ILike)?;
            Some(Predicate::condition(
                descriptor.path.clone(),
                pattern.lookup,
                TypedValue::String(pattern.value),
            ))
        }
        _ => Some(Predicate::condition(
            descriptor.path.clone(),
            store_lookup,
            value.clone(),
        )),
    }
}
