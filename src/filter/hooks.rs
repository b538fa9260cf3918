//! Extension points for custom filters
//!
//! Filters declared with `custom: true` hand predicate construction and
//! ordering resolution to a [`CustomFilterHooks`] implementation supplied
//! by the hosting application.

use std::collections::BTreeMap;

use crate::constants::FilterLookup;
use crate::schema::FieldDescriptor;

use super::errors::{FilterError, FilterResult};
use super::predicate::{Predicate, StoreLookup, TypedValue};

/// Per-request data forwarded to custom hooks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub attributes: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Everything resolved for a custom filter before delegation
#[derive(Debug)]
pub struct CustomFilterContext<'a> {
    pub filter: &'a str,
    /// Lookup resolved from the grammar operator
    pub lookup: FilterLookup,
    /// Store comparison the built-in builder would have used
    pub store_lookup: StoreLookup,
    /// `true` when the operator negates the comparison (`ne`, `out`)
    pub negated: bool,
    pub value: &'a TypedValue,
    pub raw_value: &'a str,
    pub descriptor: &'a FieldDescriptor,
    pub request: Option<&'a RequestContext>,
}

pub trait CustomFilterHooks: Send + Sync {
    /// Predicate for a filter declared `custom`.
    fn build_custom_predicate(&self, ctx: &CustomFilterContext<'_>) -> FilterResult<Predicate> {
        Err(FilterError::Configuration(format!(
            "custom filter '{}' is not implemented",
            ctx.filter
        )))
    }

    /// Sortable attribute path for a custom filter listed in `ordering`.
    fn custom_ordering_path(
        &self,
        filter: &str,
        _descriptor: &FieldDescriptor,
    ) -> FilterResult<String> {
        Err(FilterError::Configuration(format!(
            "custom ordering for '{}' is not implemented",
            filter
        )))
    }
}

/// Hooks for schemas without custom filters
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomFilters;

impl CustomFilterHooks for NoCustomFilters {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ModelField;

    #[test]
    fn test_default_hooks_report_configuration_error() {
        let descriptor = FieldDescriptor::new("score", ModelField::integer("score"));
        let value = TypedValue::Int(1);
        let ctx = CustomFilterContext {
            filter: "score",
            lookup: FilterLookup::Eq,
            store_lookup: StoreLookup::Exact,
            negated: false,
            value: &value,
            raw_value: "1",
            descriptor: &descriptor,
            request: None,
        };

        let err = NoCustomFilters.build_custom_predicate(&ctx).unwrap_err();
        assert_eq!(err.code(), "RQL_CONFIGURATION_ERROR");

        let err = NoCustomFilters.custom_ordering_path("score", &descriptor).unwrap_err();
        assert!(err.to_string().contains("score"));
    }

    #[test]
    fn test_request_context() {
        let ctx = RequestContext::new().with("account", "acme");
        assert_eq!(ctx.get("account"), Some("acme"));
        assert_eq!(ctx.get("user"), None);
    }
}
