//! Free-text search
//!
//! `search=term` matches `*term*` case-insensitively against every filter
//! declared with `search: true` and every extended search path. Explicit
//! wildcards in the term are kept.

use crate::constants::{ComparisonOperator, RQL_ANY_SYMBOL, RQL_SEARCH_PARAM};

use super::builder::PredicateBuilder;
use super::coercion::strip_quotes;
use super::errors::{FilterError, FilterResult};
use super::pattern::translate;
use super::predicate::{Predicate, TypedValue};

/// Wraps a bare term in wildcards.
pub fn normalize_search_value(raw: &str) -> String {
    let mut value = strip_quotes(raw).to_string();
    if !value.starts_with(RQL_ANY_SYMBOL) {
        value.insert(0, RQL_ANY_SYMBOL);
    }
    if !value.ends_with(RQL_ANY_SYMBOL) {
        value.push(RQL_ANY_SYMBOL);
    }
    value
}

impl<'a> PredicateBuilder<'a> {
    pub fn build_search_predicate(
        &mut self,
        operator: ComparisonOperator,
        raw: &str,
    ) -> FilterResult<Predicate> {
        if operator != ComparisonOperator::Eq {
            return Err(FilterError::parsing(format!(
                "'{}' only supports the eq operator",
                RQL_SEARCH_PARAM
            )));
        }

        let value = normalize_search_value(raw);
        let schema = self.schema;
        let mut parts = Vec::new();

        for path in schema.extended_search() {
            let pattern = translate(&value, true).ok_or_else(|| {
                FilterError::value(RQL_SEARCH_PARAM, ComparisonOperator::ILike.into(), raw)
            })?;
            parts.push(Predicate::condition(
                path.clone(),
                pattern.lookup,
                TypedValue::String(pattern.value),
            ));
        }

        for name in schema.search_filters() {
            parts.push(self.build_predicate(name, ComparisonOperator::ILike, &value, None)?);
        }

        Ok(Predicate::any(parts))
    }
}
