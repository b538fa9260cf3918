//! Filter declaration format
//!
//! A declaration is a list of nodes, each of which is one of:
//!
//! ```json
//! "id"
//! {"namespace": "author", "source": "writer", "qs": {"select_related": ["writer"]},
//!  "filters": ["name"]}
//! {"filter": "title", "search": true, "ordering": true}
//! ```
//!
//! Nodes are parsed strictly (unknown keys are rejected) and validated into
//! descriptors by the compiler.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::FilterLookup;

use super::hints::HintDecl;
use super::types::ModelField;

/// One node of a nested filter declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterDecl {
    /// Bare attribute name, public name equals the attribute name
    Attribute(String),
    /// Group of nested filters under a relation
    Namespace(NamespaceDecl),
    /// Filter with explicit options
    Filter(ExtendedFilterDecl),
}

impl FilterDecl {
    pub fn attr(name: impl Into<String>) -> Self {
        FilterDecl::Attribute(name.into())
    }
}

impl From<NamespaceDecl> for FilterDecl {
    fn from(decl: NamespaceDecl) -> Self {
        FilterDecl::Namespace(decl)
    }
}

impl From<ExtendedFilterDecl> for FilterDecl {
    fn from(decl: ExtendedFilterDecl) -> Self {
        FilterDecl::Filter(decl)
    }
}

impl From<&str> for FilterDecl {
    fn from(name: &str) -> Self {
        FilterDecl::Attribute(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceDecl {
    pub namespace: String,
    /// Relation name on the model, defaults to `namespace`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qs: Option<HintDecl>,
    #[serde(default)]
    pub filters: Vec<FilterDecl>,
    #[serde(default)]
    pub hidden: bool,
    /// Every nested filter forces deduplication
    #[serde(default)]
    pub distinct: bool,

    // Only accepted so that the compiler can reject them with a clear message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dynamic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub custom: bool,
}

impl NamespaceDecl {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            source: None,
            qs: None,
            filters: Vec::new(),
            hidden: false,
            distinct: false,
            filter: None,
            dynamic: false,
            custom: false,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn hint(mut self, hint: HintDecl) -> Self {
        self.qs = Some(hint);
        self
    }

    pub fn filters(mut self, filters: Vec<FilterDecl>) -> Self {
        self.filters = filters;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtendedFilterDecl {
    pub filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Fan-out: one public name over several attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookups: Option<BTreeSet<FilterLookup>>,
    /// Match choice labels instead of stored values
    #[serde(default)]
    pub use_repr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_values: Option<BTreeSet<String>>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub dynamic: bool,
    /// Explicit attribute metadata for dynamic and custom filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<ModelField>,
    #[serde(default)]
    pub ordering: bool,
    #[serde(default)]
    pub search: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qs: Option<HintDecl>,
}

impl ExtendedFilterDecl {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            source: None,
            sources: None,
            lookups: None,
            use_repr: false,
            null_values: None,
            distinct: false,
            custom: false,
            dynamic: false,
            field: None,
            ordering: false,
            search: false,
            hidden: false,
            qs: None,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    pub fn lookups(mut self, lookups: impl IntoIterator<Item = FilterLookup>) -> Self {
        self.lookups = Some(lookups.into_iter().collect());
        self
    }

    pub fn null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn use_repr(mut self) -> Self {
        self.use_repr = true;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn custom(mut self) -> Self {
        self.custom = true;
        self
    }

    pub fn dynamic(mut self, field: ModelField) -> Self {
        self.dynamic = true;
        self.field = Some(field);
        self
    }

    pub fn field(mut self, field: ModelField) -> Self {
        self.field = Some(field);
        self
    }

    pub fn ordering(mut self) -> Self {
        self.ordering = true;
        self
    }

    pub fn search(mut self) -> Self {
        self.search = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn hint(mut self, hint: HintDecl) -> Self {
        self.qs = Some(hint);
        self
    }
}
