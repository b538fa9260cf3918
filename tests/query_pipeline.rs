//! Query Pipeline Tests
//!
//! End-to-end behaviour of `FilterClass::apply` over an in-memory book
//! catalogue:
//! - comparisons, sentinels and typed coercion
//! - search, wildcard patterns and list operators
//! - multi-source fan-out and namespaces
//! - ordering, pagination and selection hints
//! - custom filter hooks

use rqlfilter::filter::{
    CustomFilterContext, CustomFilterHooks, FilterClass, FilterResult, Predicate,
    RequestContext, StoreLookup, TypedValue,
};
use rqlfilter::schema::{
    Choice, FilterDecl, HintKind, Model, ModelField, ModelRegistry, SchemaCompiler,
};
use rqlfilter::store::MemoryResultSet;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn registry() -> ModelRegistry {
    ModelRegistry::from_models(vec![
        Model::new(
            "book",
            vec![
                ModelField::integer("id").primary(),
                ModelField::string("title"),
                ModelField::integer("status").with_choices(vec![
                    Choice::new(0, "draft"),
                    Choice::new(1, "published"),
                ]),
                ModelField::decimal("price", 2),
                ModelField::date("published_at").nullable(),
                ModelField::float("rating").nullable(),
                ModelField::relation("author", "author"),
                ModelField::relation("tags", "tag"),
            ],
        ),
        Model::new(
            "author",
            vec![
                ModelField::integer("id").primary(),
                ModelField::string("name"),
                ModelField::string("email").allow_blank(),
                ModelField::string("country"),
            ],
        ),
        Model::new("tag", vec![ModelField::string("name")]),
    ])
    .unwrap()
}

fn declarations() -> Vec<FilterDecl> {
    serde_json::from_value(json!([
        "id",
        {"filter": "title", "search": true, "ordering": true},
        {"filter": "status", "use_repr": true},
        {"filter": "price", "ordering": true},
        {"filter": "published", "source": "published_at", "ordering": true},
        "rating",
        {
            "namespace": "author",
            "qs": {"select_related": ["author"]},
            "filters": ["name", {"filter": "email", "hidden": true}, "country"]
        },
        {
            "namespace": "tags",
            "qs": {"prefetch_related": ["tags"]},
            "hidden": true,
            "distinct": true,
            "filters": ["name"]
        },
        {"filter": "who", "sources": ["author.name", "title"]},
        {"filter": "has_tag", "custom": true, "field": {"name": "has_tag", "type": "string"}},
        {"filter": "mine", "custom": true, "field": {"name": "mine", "type": "boolean"}}
    ]))
    .unwrap()
}

/// Custom filters backed by the tag list and the requesting author
struct CatalogueHooks;

impl CustomFilterHooks for CatalogueHooks {
    fn build_custom_predicate(&self, ctx: &CustomFilterContext<'_>) -> FilterResult<Predicate> {
        let leaf = match ctx.filter {
            "has_tag" => Predicate::condition("tags.name", StoreLookup::Exact, ctx.value.clone()),
            _ => {
                let author = ctx
                    .request
                    .and_then(|r| r.get("author"))
                    .ok_or_else(|| rqlfilter::FilterError::Configuration("no author".into()))?;
                Predicate::condition(
                    "author.name",
                    StoreLookup::Exact,
                    TypedValue::String(author.to_string()),
                )
            }
        };
        Ok(if ctx.negated { leaf.negate() } else { leaf })
    }
}

fn filter_class() -> FilterClass {
    let schema = SchemaCompiler::new(&registry(), "book")
        .compile(&declarations())
        .unwrap();
    FilterClass::new(schema).with_hooks(CatalogueHooks)
}

fn books() -> MemoryResultSet {
    MemoryResultSet::new(vec![
        json!({
            "id": 1, "title": "Rust in Action", "status": 1, "price": 39.99,
            "published_at": "2021-08-10", "rating": 4.5,
            "author": {"id": 1, "name": "Tim", "email": "tim@example.com", "country": "NZ"},
            "tags": [{"name": "rust"}, {"name": "systems"}]
        }),
        json!({
            "id": 2, "title": "The Rust Book", "status": 1, "price": 0.0,
            "published_at": "2018-06-01", "rating": 4.8,
            "author": {"id": 2, "name": "Steve", "email": "", "country": "US"},
            "tags": [{"name": "rust"}]
        }),
        json!({
            "id": 3, "title": "Draft Notes", "status": 0, "price": 10.5,
            "published_at": null, "rating": null,
            "author": {"id": 1, "name": "Tim", "email": "tim@example.com", "country": "NZ"},
            "tags": []
        }),
        json!({
            "id": 4, "title": "Go Programming", "status": 1, "price": 25.0,
            "published_at": "2015-10-26", "rating": 4.1,
            "author": {"id": 3, "name": "Alan", "email": "alan@example.com", "country": "US"},
            "tags": [{"name": "go"}, {"name": "systems"}]
        }),
    ])
}

fn ids(documents: &[Value]) -> Vec<i64> {
    documents.iter().filter_map(|d| d["id"].as_i64()).collect()
}

fn run(query: &str) -> Vec<i64> {
    let applied = filter_class().apply(query, books()).unwrap();
    ids(applied.result.documents())
}

fn error_code(query: &str) -> &'static str {
    filter_class().apply(query, books()).unwrap_err().code()
}

// =============================================================================
// Comparison Tests
// =============================================================================

#[test]
fn test_blank_query_returns_everything() {
    let applied = filter_class().apply("", books()).unwrap();
    assert!(applied.tree.is_none());
    assert_eq!(ids(applied.result.documents()), vec![1, 2, 3, 4]);
}

#[test]
fn test_comparison_forms_agree() {
    assert_eq!(run("price=gt=20"), vec![1, 4]);
    assert_eq!(run("gt(price,20)"), vec![1, 4]);
    assert_eq!(run("price=le=10.5"), vec![2, 3]);
    assert_eq!(run("id!=2"), vec![1, 3, 4]);
}

#[test]
fn test_null_sentinel() {
    assert_eq!(run("published=null()"), vec![3]);
    assert_eq!(run("published=ne=null()"), vec![1, 2, 4]);
    assert_eq!(error_code("published=lt=null()"), "RQL_LOOKUP_ERROR");
}

#[test]
fn test_date_comparison() {
    assert_eq!(run("published=ge=2018-01-01"), vec![1, 2]);
    assert_eq!(error_code("published=ge=2018-13-01"), "RQL_VALUE_ERROR");
}

#[test]
fn test_choice_representation() {
    assert_eq!(run("status=published"), vec![1, 2, 4]);
    assert_eq!(run("status=draft"), vec![3]);
    assert_eq!(error_code("status=1"), "RQL_VALUE_ERROR");
}

#[test]
fn test_logical_combinators() {
    assert_eq!(run("or(id=1,id=4)"), vec![1, 4]);
    assert_eq!(run("(id=1|id=4)&price=lt=30"), vec![4]);
    assert_eq!(run("not(author.country=US)"), vec![1, 3]);
    assert_eq!(run("and(rating=gt=4.2,status=published)"), vec![1, 2]);
}

// =============================================================================
// Search, Pattern and List Tests
// =============================================================================

#[test]
fn test_search_is_case_insensitive_contains() {
    assert_eq!(run("search=rust"), vec![1, 2]);
    assert_eq!(run("search='rust book'"), vec![2]);
}

#[test]
fn test_like_patterns() {
    assert_eq!(run("title=like=*Rust*"), vec![1, 2]);
    assert_eq!(run("title=like=*rust*"), Vec::<i64>::new());
    assert_eq!(run("title=ilike=*rust*"), vec![1, 2]);
    assert_eq!(run("title=like=The*"), vec![2]);
    assert_eq!(run("title=like=R*n"), vec![1]);
    assert_eq!(error_code("title=like=**"), "RQL_VALUE_ERROR");
}

#[test]
fn test_list_operators() {
    assert_eq!(run("in(author.name,(Tim,Alan))"), vec![1, 3, 4]);
    assert_eq!(run("author.name=in=(Steve)"), vec![2]);
    assert_eq!(run("out(id,(1,2))"), vec![3, 4]);
}

// =============================================================================
// Schema Shape Tests
// =============================================================================

#[test]
fn test_fan_out_or_for_eq_and_for_ne() {
    assert_eq!(run("who=Tim"), vec![1, 3]);
    assert_eq!(run("who=ne=Tim"), vec![2, 4]);
}

#[test]
fn test_namespaced_filters_reach_through_relations() {
    assert_eq!(run("author.country=US"), vec![2, 4]);
    assert_eq!(run("tags.name=systems"), vec![1, 4]);
    assert_eq!(run("author.email=empty()"), vec![2]);
}

#[test]
fn test_distinct_namespace_marks_query() {
    let class = filter_class();
    let (_, transformed) = class.transform("tags.name=rust", None).unwrap().unwrap();
    assert!(transformed.distinct);
    let (_, transformed) = class.transform("title=Go", None).unwrap().unwrap();
    assert!(!transformed.distinct);
}

#[test]
fn test_unknown_filters_are_ignored() {
    assert_eq!(run("unknown=5&id=1"), vec![1]);
    assert_eq!(run("or(unknown=1,id=2)"), vec![2]);
    assert_eq!(run("unknown=1"), vec![1, 2, 3, 4]);
}

#[test]
fn test_rejections() {
    assert_eq!(error_code("price=like=1"), "RQL_LOOKUP_ERROR");
    assert_eq!(error_code("id=abc"), "RQL_VALUE_ERROR");
    assert_eq!(error_code("ordering(title)&ordering(price)"), "RQL_PARSING_ERROR");
    assert_eq!(error_code("ordering(rating)"), "RQL_PARSING_ERROR");
    assert_eq!(error_code("and(id=1"), "RQL_PARSING_ERROR");
}

// =============================================================================
// Ordering and Pagination Tests
// =============================================================================

#[test]
fn test_ordering() {
    assert_eq!(run("ordering(-price)"), vec![1, 4, 3, 2]);
    assert_eq!(run("ordering(published)"), vec![3, 4, 2, 1]);
    assert_eq!(run("price=gt=5&ordering(title)"), vec![3, 4, 1]);
}

#[test]
fn test_pagination() {
    let applied = filter_class()
        .apply("ordering(-price)&limit=2&offset=1", books())
        .unwrap();
    assert_eq!(ids(applied.result.documents()), vec![4, 3]);
    assert_eq!(applied.pagination.limit, Some(2));
    assert_eq!(applied.pagination.offset, 1);
}

// =============================================================================
// Selection Tests
// =============================================================================

#[test]
fn test_selection_plan_and_hints() {
    let class = filter_class().with_select(true);

    let applied = class.apply("select(author.name)", books()).unwrap();
    let plan = applied.select.unwrap();
    assert_eq!(plan.select.get("author"), Some(&true));
    assert_eq!(plan.select.get("author.name"), Some(&true));
    assert_eq!(plan.select.get("author.country"), Some(&false));
    assert_eq!(plan.select.get("author.email"), Some(&false));
    assert_eq!(plan.select.get("tags"), Some(&false));
    let hints = applied.result.applied_hints();
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].kind, HintKind::SelectRelated);

    let applied = class.apply("select(tags)", books()).unwrap();
    assert_eq!(applied.select.unwrap().select.get("tags"), Some(&true));
    let kinds: Vec<_> = applied.result.applied_hints().iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec![HintKind::SelectRelated, HintKind::PrefetchRelated]);
}

#[test]
fn test_selection_conflicts() {
    let class = filter_class().with_select(true);
    for query in ["select(-author,author.name)", "select(author.name,-author)", "select(nope)"] {
        let err = class.apply(query, books()).unwrap_err();
        assert_eq!(err.code(), "RQL_PARSING_ERROR", "{}", query);
    }
}

// =============================================================================
// Custom Filter Tests
// =============================================================================

#[test]
fn test_custom_filter_delegates_to_hooks() {
    assert_eq!(run("has_tag=go"), vec![4]);
    assert_eq!(run("has_tag=ne=rust"), vec![3, 4]);
}

#[test]
fn test_custom_filter_receives_request() {
    let class = filter_class();
    let request = RequestContext::new().with("author", "Tim");
    let applied = class
        .apply_with_request("mine=true", Some(&request), books())
        .unwrap();
    assert_eq!(ids(applied.result.documents()), vec![1, 3]);

    let err = class.apply("mine=true", books()).unwrap_err();
    assert_eq!(err.code(), "RQL_CONFIGURATION_ERROR");
}

#[test]
fn test_custom_filter_without_hooks_is_configuration_error() {
    let schema = SchemaCompiler::new(&registry(), "book")
        .compile(&declarations())
        .unwrap();
    let err = FilterClass::new(schema).apply("has_tag=go", books()).unwrap_err();
    assert_eq!(err.code(), "RQL_CONFIGURATION_ERROR");
}
