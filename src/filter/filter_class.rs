//! Filter class: the public entry point
//!
//! A `FilterClass` owns one compiled schema and applies query strings to
//! result sets:
//!
//! ```text
//! parse -> transform -> filter -> dedup -> ordering -> selection -> paging
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::observability::{Event, Logger};
use crate::parser::{self, Node};
use crate::schema::CompiledSchema;
use crate::store::ResultSet;

use super::builder::PredicateBuilder;
use super::coercion::strip_quotes;
use super::errors::{FilterError, FilterResult};
use super::hooks::{CustomFilterHooks, NoCustomFilters, RequestContext};
use super::ordering::{OrderingResolver, ResolvedOrdering};
use super::select::{apply_hints, SelectResolver, SelectionPlan};
use super::transformer::{QueryTransformer, TransformedQuery};

/// Applied `limit`/`offset`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: u64,
}

#[derive(Debug)]
pub struct AppliedQuery<R> {
    /// Parse tree, `None` for a blank query
    pub tree: Option<Node>,
    pub result: R,
    /// Present when selection is enabled
    pub select: Option<SelectionPlan>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct FilterClass {
    schema: Arc<CompiledSchema>,
    hooks: Arc<dyn CustomFilterHooks>,
    select: bool,
    max_limit: Option<u64>,
    default_limit: Option<u64>,
}

impl std::fmt::Debug for FilterClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterClass")
            .field("schema", &self.schema)
            .field("select", &self.select)
            .field("max_limit", &self.max_limit)
            .field("default_limit", &self.default_limit)
            .finish_non_exhaustive()
    }
}

impl FilterClass {
    pub fn new(schema: CompiledSchema) -> Self {
        Self {
            schema: Arc::new(schema),
            hooks: Arc::new(NoCustomFilters),
            select: false,
            max_limit: None,
            default_limit: None,
        }
    }

    pub fn with_hooks(mut self, hooks: impl CustomFilterHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Enables `select(...)` and the selection plan.
    pub fn with_select(mut self, enabled: bool) -> Self {
        self.select = enabled;
        self
    }

    pub fn with_limits(mut self, max_limit: Option<u64>, default_limit: Option<u64>) -> Self {
        self.max_limit = max_limit;
        self.default_limit = default_limit;
        self
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub fn select_enabled(&self) -> bool {
        self.select
    }

    pub fn apply<R: ResultSet>(&self, query: &str, rs: R) -> FilterResult<AppliedQuery<R>> {
        self.apply_with_request(query, None, rs)
    }

    pub fn apply_with_request<R: ResultSet>(
        &self,
        query: &str,
        request: Option<&RequestContext>,
        rs: R,
    ) -> FilterResult<AppliedQuery<R>> {
        Logger::log(
            Event::QueryReceived,
            &[("model", self.schema.model()), ("query", query)],
        );

        match self.run(query, request, rs) {
            Ok(applied) => {
                let limit = applied
                    .pagination
                    .limit
                    .map_or_else(|| "none".to_string(), |l| l.to_string());
                Logger::log(
                    Event::QueryApplied,
                    &[("model", self.schema.model()), ("limit", limit.as_str())],
                );
                Ok(applied)
            }
            Err(err) => {
                let details = err.details().to_string();
                Logger::log(
                    Event::QueryRejected,
                    &[
                        ("model", self.schema.model()),
                        ("code", err.code()),
                        ("details", details.as_str()),
                    ],
                );
                Err(err)
            }
        }
    }

    /// Parses and transforms `query` without touching a result set.
    pub fn transform(
        &self,
        query: &str,
        request: Option<&RequestContext>,
    ) -> FilterResult<Option<(Node, TransformedQuery)>> {
        let tree = match parser::parse(query)? {
            Some(tree) => tree,
            None => return Ok(None),
        };
        let mut builder = PredicateBuilder::new(&self.schema, self.hooks.as_ref()).with_request(request);
        let transformed = QueryTransformer::new(&mut builder).transform(&tree)?;
        Ok(Some((tree, transformed)))
    }

    /// Resolves ordering groups to sort keys without sorting anything.
    pub fn resolve_ordering(&self, groups: &[Vec<String>]) -> FilterResult<ResolvedOrdering> {
        OrderingResolver::new(&self.schema, self.hooks.as_ref()).resolve(groups)
    }

    fn run<R: ResultSet>(
        &self,
        query: &str,
        request: Option<&RequestContext>,
        rs: R,
    ) -> FilterResult<AppliedQuery<R>> {
        let (tree, transformed) = match self.transform(query, request)? {
            Some((tree, transformed)) => (Some(tree), transformed),
            None => {
                let (rs, select) = self.apply_selection(&[], rs)?;
                let pagination = self.pagination(&[], &[])?;
                return Ok(AppliedQuery {
                    tree: None,
                    result: rs.paginate(pagination.offset, pagination.limit),
                    select,
                    pagination,
                });
            }
        };

        let mut rs = rs.filter(&transformed.predicate);
        if transformed.distinct || self.schema.is_distinct() {
            rs = rs.distinct();
        }

        let rs = OrderingResolver::new(&self.schema, self.hooks.as_ref())
            .apply_ordering(rs, &transformed.ordering)?;

        if !self.select && !transformed.select.is_empty() {
            return Err(FilterError::parsing("select is not enabled"));
        }
        let (rs, select) = self.apply_selection(&transformed.select, rs)?;

        let pagination = self.pagination(&transformed.limit, &transformed.offset)?;
        Ok(AppliedQuery {
            tree,
            result: rs.paginate(pagination.offset, pagination.limit),
            select,
            pagination,
        })
    }

    fn apply_selection<R: ResultSet>(
        &self,
        tokens: &[String],
        rs: R,
    ) -> FilterResult<(R, Option<SelectionPlan>)> {
        if !self.select {
            return Ok((rs, None));
        }
        let tree = self.schema.select_tree();
        let plan = SelectionPlan::new(SelectResolver::new(tree).resolve(tokens)?);
        let rs = apply_hints(tree, &plan, rs);
        Ok((rs, Some(plan)))
    }

    fn pagination(&self, limit: &[String], offset: &[String]) -> FilterResult<Pagination> {
        let limit = match single_number("limit", limit)? {
            Some(limit) => Some(limit),
            None => self.default_limit,
        };
        let limit = match (limit, self.max_limit) {
            (Some(limit), Some(max)) => Some(limit.min(max)),
            (limit, _) => limit,
        };
        Ok(Pagination {
            limit,
            offset: single_number("offset", offset)?.unwrap_or(0),
        })
    }
}

fn single_number(name: &str, raw: &[String]) -> FilterResult<Option<u64>> {
    match raw {
        [] => Ok(None),
        [value] => strip_quotes(value)
            .parse::<u64>()
            .map(Some)
            .map_err(|_| FilterError::parsing(format!("invalid {} value: {}", name, value))),
        _ => Err(FilterError::parsing(format!("{} is given more than once", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ExtendedFilterDecl, FilterDecl, Model, ModelField, ModelRegistry, SchemaCompiler};
    use crate::store::MemoryResultSet;
    use serde_json::json;

    fn class() -> FilterClass {
        let registry = ModelRegistry::from_models(vec![Model::new(
            "user",
            vec![ModelField::integer("id").primary(), ModelField::integer("age")],
        )])
        .unwrap();
        let schema = SchemaCompiler::new(&registry, "user")
            .compile(&[
                FilterDecl::attr("id"),
                FilterDecl::from(ExtendedFilterDecl::new("age").ordering()),
            ])
            .unwrap();
        FilterClass::new(schema).with_limits(Some(3), Some(2))
    }

    fn users() -> MemoryResultSet {
        MemoryResultSet::new((1..=5).map(|i| json!({"id": i, "age": 50 - i * 5})).collect())
    }

    fn ids(rs: &MemoryResultSet) -> Vec<i64> {
        rs.documents().iter().map(|d| d["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_blank_query_applies_default_limit() {
        let applied = class().apply("", users()).unwrap();
        assert!(applied.tree.is_none());
        assert_eq!(ids(&applied.result), vec![1, 2]);
        assert!(applied.select.is_none());
    }

    #[test]
    fn test_limit_capped() {
        let applied = class().apply("ordering(age)&limit=10&offset=1", users()).unwrap();
        assert_eq!(applied.pagination, Pagination { limit: Some(3), offset: 1 });
        assert_eq!(ids(&applied.result), vec![4, 3, 2]);
    }

    #[test]
    fn test_pagination_errors() {
        for query in ["limit=-1", "limit=abc", "limit=1&limit=2", "offset=1&offset=1"] {
            let err = class().apply(query, users()).unwrap_err();
            assert_eq!(err.code(), "RQL_PARSING_ERROR", "{}", query);
        }
    }

    #[test]
    fn test_select_disabled() {
        let err = class().apply("select(id)", users()).unwrap_err();
        assert!(err.to_string().contains("select"));
        let plan = class()
            .with_select(true)
            .apply("select(id)", users())
            .unwrap()
            .select
            .unwrap();
        assert_eq!(plan.depth, 0);
        assert_eq!(plan.select.get("id"), Some(&true));
    }
}
