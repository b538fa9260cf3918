//! Schema compiler
//!
//! Walks a nested filter declaration once and produces a [`CompiledSchema`]:
//! a flat registry from public filter name to field descriptors, the
//! ordering and search registries, and the selection tree.
//!
//! Recursion threads an explicit [`Scope`] (public prefix, attribute
//! prefix, current model, enclosing hint, inherited flags) and writes into a
//! single builder passed by reference. The result is immutable.

use std::collections::{BTreeMap, BTreeSet};

use crate::observability::{Event, Logger};

use super::declaration::{ExtendedFilterDecl, FilterDecl, NamespaceDecl};
use super::descriptor::{default_null_values, FieldDescriptor, FilterEntry};
use super::errors::{ConfigError, ConfigResult};
use super::hints::QueryHint;
use super::loader::ModelRegistry;
use super::select_tree::SelectNode;
use super::types::{FieldKind, Model, ModelField};
use super::validator::DeclarationValidator;

/// Immutable result of compiling a declaration against a model
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    model: String,
    filters: BTreeMap<String, FilterEntry>,
    ordering: BTreeSet<String>,
    search: BTreeSet<String>,
    extended_search: Vec<String>,
    select_tree: SelectNode,
    distinct: bool,
}

impl CompiledSchema {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn get(&self, name: &str) -> Option<&FilterEntry> {
        self.filters.get(name)
    }

    pub fn filters(&self) -> &BTreeMap<String, FilterEntry> {
        &self.filters
    }

    pub fn ordering_filters(&self) -> &BTreeSet<String> {
        &self.ordering
    }

    pub fn search_filters(&self) -> &BTreeSet<String> {
        &self.search
    }

    /// Raw attribute paths searched in addition to the search filters
    pub fn extended_search(&self) -> &[String] {
        &self.extended_search
    }

    pub fn select_tree(&self) -> &SelectNode {
        &self.select_tree
    }

    /// Every query against this schema is deduplicated
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }
}

/// Compiles declarations against one root model of a registry.
pub struct SchemaCompiler<'a> {
    registry: &'a ModelRegistry,
    model: String,
    extended_search: Vec<String>,
    distinct: bool,
}

/// Context threaded down the declaration tree
#[derive(Clone)]
struct Scope<'a> {
    public_prefix: String,
    path_prefix: String,
    model: &'a Model,
    hint: Option<QueryHint>,
    distinct: bool,
    nested: bool,
}

impl<'a> Scope<'a> {
    fn public_name(&self, name: &str) -> String {
        format!("{}{}", self.public_prefix, name)
    }

    fn attribute_path(&self, path: &str) -> String {
        format!("{}{}", self.path_prefix, path)
    }
}

#[derive(Default)]
struct Registries {
    filters: BTreeMap<String, FilterEntry>,
    ordering: BTreeSet<String>,
    search: BTreeSet<String>,
}

impl Registries {
    fn insert(&mut self, name: String, entry: FilterEntry) -> ConfigResult<()> {
        if self.filters.contains_key(&name) {
            return Err(ConfigError::DuplicateFilter(name));
        }
        self.filters.insert(name, entry);
        Ok(())
    }
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(registry: &'a ModelRegistry, model: impl Into<String>) -> Self {
        Self {
            registry,
            model: model.into(),
            extended_search: Vec::new(),
            distinct: false,
        }
    }

    /// Attribute paths matched by search without a named filter.
    pub fn extended_search<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extended_search = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Deduplicate every query.
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn compile(&self, decls: &[FilterDecl]) -> ConfigResult<CompiledSchema> {
        let root = self.registry.require(&self.model)?;
        if decls.is_empty() {
            return Err(ConfigError::invalid(&self.model, "filter list is empty"));
        }

        let mut extended_search = Vec::with_capacity(self.extended_search.len());
        for raw in &self.extended_search {
            let (path, field) = self.resolve_field(root, raw)?;
            if field.kind != FieldKind::String {
                return Err(ConfigError::invalid(
                    raw,
                    format!("search requires a string field, got {}", field.kind.type_name()),
                ));
            }
            extended_search.push(path);
        }

        let scope = Scope {
            public_prefix: String::new(),
            path_prefix: String::new(),
            model: root,
            hint: None,
            distinct: false,
            nested: false,
        };
        let mut registries = Registries::default();
        let mut tree = SelectNode::root();
        self.walk(decls, &scope, &mut tree, &mut registries)?;

        let filter_count = registries.filters.len().to_string();
        Logger::log(
            Event::SchemaCompiled,
            &[("model", self.model.as_str()), ("filters", filter_count.as_str())],
        );

        Ok(CompiledSchema {
            model: self.model.clone(),
            filters: registries.filters,
            ordering: registries.ordering,
            search: registries.search,
            extended_search,
            select_tree: tree,
            distinct: self.distinct,
        })
    }

    fn walk(
        &self,
        decls: &[FilterDecl],
        scope: &Scope<'a>,
        node: &mut SelectNode,
        out: &mut Registries,
    ) -> ConfigResult<()> {
        for decl in decls {
            match decl {
                FilterDecl::Attribute(name) => self.compile_attribute(name, scope, node, out)?,
                FilterDecl::Namespace(ns) => self.compile_namespace(ns, scope, node, out)?,
                FilterDecl::Filter(f) => self.compile_filter(f, scope, node, out)?,
            }
        }
        Ok(())
    }

    fn compile_attribute(
        &self,
        name: &str,
        scope: &Scope<'a>,
        node: &mut SelectNode,
        out: &mut Registries,
    ) -> ConfigResult<()> {
        let public = scope.public_name(name);
        DeclarationValidator::validate_name(&public)?;

        let (path, field) = self.resolve_field(scope.model, name)?;
        let descriptor = FieldDescriptor {
            distinct: scope.distinct,
            ..FieldDescriptor::new(scope.attribute_path(&path), field)
        };
        out.insert(public, FilterEntry::Single(descriptor))?;
        leaf_node(node, name);
        Ok(())
    }

    fn compile_namespace(
        &self,
        ns: &NamespaceDecl,
        scope: &Scope<'a>,
        node: &mut SelectNode,
        out: &mut Registries,
    ) -> ConfigResult<()> {
        DeclarationValidator::validate_namespace(ns)?;

        let source = ns.source.as_deref().unwrap_or(&ns.namespace);
        let (path, related) = self.resolve_relation(scope.model, source)?;

        let hint = ns.qs.as_ref().map(|decl| QueryHint::from_decl(decl).rebuild(scope.hint.as_ref()));

        let child = node.child_mut(&ns.namespace);
        child.namespace = true;
        child.hidden = ns.hidden;
        child.hint = hint.clone();

        let inner = Scope {
            public_prefix: format!("{}{}.", scope.public_prefix, ns.namespace),
            path_prefix: format!("{}{}.", scope.path_prefix, path),
            model: related,
            hint: hint.or_else(|| scope.hint.clone()),
            distinct: scope.distinct || ns.distinct,
            nested: true,
        };
        self.walk(&ns.filters, &inner, child, out)
    }

    fn compile_filter(
        &self,
        decl: &ExtendedFilterDecl,
        scope: &Scope<'a>,
        node: &mut SelectNode,
        out: &mut Registries,
    ) -> ConfigResult<()> {
        DeclarationValidator::validate_filter(decl, scope.nested)?;
        let public = scope.public_name(&decl.filter);
        DeclarationValidator::validate_name(&public)?;

        let resolved: Vec<(String, ModelField)> = match (&decl.field, &decl.sources) {
            (Some(field), _) => {
                if !field.kind.is_filterable() {
                    return Err(ConfigError::UnsupportedField(format!(
                        "{}: {}",
                        public,
                        field.kind.type_name()
                    )));
                }
                let source = decl.source.as_deref().unwrap_or(&decl.filter);
                vec![(scope.attribute_path(source), field.clone())]
            }
            (None, Some(sources)) => sources
                .iter()
                .map(|s| {
                    self.resolve_field(scope.model, s)
                        .map(|(path, field)| (scope.attribute_path(&path), field))
                })
                .collect::<ConfigResult<_>>()?,
            (None, None) => {
                let source = decl.source.as_deref().unwrap_or(&decl.filter);
                let (path, field) = self.resolve_field(scope.model, source)?;
                vec![(scope.attribute_path(&path), field)]
            }
        };

        // Fan-out sources share the lookups of the first source unless overridden.
        let lookups = match &decl.lookups {
            Some(lookups) => lookups.clone(),
            None => resolved[0].1.valid_lookups(),
        };
        let null_values = decl.null_values.clone().unwrap_or_else(default_null_values);

        let mut descriptors = Vec::with_capacity(resolved.len());
        for (path, field) in resolved {
            DeclarationValidator::validate_field(&public, &field, decl)?;
            descriptors.push(FieldDescriptor {
                path,
                field,
                lookups: lookups.clone(),
                null_values: null_values.clone(),
                distinct: decl.distinct || scope.distinct,
                use_repr: decl.use_repr,
                custom: decl.custom,
            });
        }

        let entry = if decl.sources.is_some() {
            FilterEntry::FanOut(descriptors)
        } else {
            FilterEntry::Single(descriptors.remove(0))
        };

        if decl.ordering {
            out.ordering.insert(public.clone());
        }
        if decl.search {
            out.search.insert(public.clone());
        }
        out.insert(public, entry)?;

        let leaf = leaf_node(node, &decl.filter);
        leaf.hidden = decl.hidden;
        leaf.hint = decl
            .qs
            .as_ref()
            .map(|d| QueryHint::from_decl(d).rebuild(scope.hint.as_ref()));
        Ok(())
    }

    /// Resolves a dotted or `__`-joined path to its terminal field.
    ///
    /// Returns the path normalized to dots.
    fn resolve_field(&self, model: &'a Model, name: &str) -> ConfigResult<(String, ModelField)> {
        let segments = split_path(name);
        let (last, relations) = match segments.split_last() {
            Some(parts) => parts,
            None => return Err(ConfigError::invalid(name, "empty attribute path")),
        };

        let mut current = model;
        for segment in relations {
            current = self.follow_relation(current, segment)?;
        }

        let field = current.field(last).ok_or_else(|| ConfigError::UnknownField {
            model: current.name.clone(),
            field: (*last).to_string(),
        })?;
        if !field.kind.is_filterable() {
            return Err(ConfigError::UnsupportedField(format!(
                "{}: {}",
                name,
                field.kind.type_name()
            )));
        }
        Ok((segments.join("."), field.clone()))
    }

    /// Resolves a path whose every segment is a relation.
    fn resolve_relation(&self, model: &'a Model, name: &str) -> ConfigResult<(String, &'a Model)> {
        let segments = split_path(name);
        let mut current = model;
        for segment in &segments {
            current = self.follow_relation(current, segment)?;
        }
        Ok((segments.join("."), current))
    }

    fn follow_relation(&self, model: &'a Model, segment: &str) -> ConfigResult<&'a Model> {
        let field = model.field(segment).ok_or_else(|| ConfigError::UnknownField {
            model: model.name.clone(),
            field: segment.to_string(),
        })?;
        match (&field.kind, &field.related_model) {
            (FieldKind::Relation, Some(target)) => self.registry.require(target),
            _ => Err(ConfigError::NotARelation(format!("{}.{}", model.name, segment))),
        }
    }
}

fn split_path(name: &str) -> Vec<&str> {
    if name.contains('.') {
        name.split('.').collect()
    } else {
        name.split("__").collect()
    }
}

/// Inserts the selection node for a filter name relative to `node`.
fn leaf_node<'n>(node: &'n mut SelectNode, name: &str) -> &'n mut SelectNode {
    let mut segments = name.split('.').peekable();
    let mut current = node;
    while let Some(segment) = segments.next() {
        current = current.child_mut(segment);
        if segments.peek().is_some() {
            current.namespace = true;
        }
    }
    current
}
