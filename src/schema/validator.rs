//! Declaration invariants
//!
//! Checks run by the compiler before and after a declaration node is
//! resolved against the model:
//! - namespaces cannot carry `filter`, `dynamic` or `custom`
//! - `use_repr` is incompatible with `ordering` and `search`
//! - `search` is only valid on free-text string attributes that keep `ilike`
//! - `dynamic` filters need an explicit `field` and cannot be nested
//! - other filters cannot carry `field` unless they are `custom`
//! - `source` and `sources` are mutually exclusive, `sources` is non-empty
//! - a `lookups` override is a subset of the attribute's valid lookups
//!
//! Violations are configuration errors.

use std::collections::BTreeSet;

use crate::constants::{is_reserved_name, FilterLookup};

use super::declaration::{ExtendedFilterDecl, NamespaceDecl};
use super::errors::{ConfigError, ConfigResult};
use super::types::{FieldKind, ModelField};

/// Stateless checker for declaration nodes.
pub struct DeclarationValidator;

impl DeclarationValidator {
    /// Rejects public names the query language claims for itself.
    pub fn validate_name(public_name: &str) -> ConfigResult<()> {
        if public_name.is_empty() {
            return Err(ConfigError::invalid(public_name, "filter name is empty"));
        }
        if is_reserved_name(public_name) {
            return Err(ConfigError::ReservedName(public_name.to_string()));
        }
        Ok(())
    }

    pub fn validate_namespace(decl: &NamespaceDecl) -> ConfigResult<()> {
        let name = &decl.namespace;
        if decl.filter.is_some() {
            return Err(ConfigError::invalid(name, "namespace cannot carry 'filter'"));
        }
        if decl.dynamic {
            return Err(ConfigError::invalid(name, "namespace cannot be dynamic"));
        }
        if decl.custom {
            return Err(ConfigError::invalid(name, "namespace cannot be custom"));
        }
        if name.is_empty() || name.contains('.') {
            return Err(ConfigError::invalid(name, "namespace must be a single segment"));
        }
        Ok(())
    }

    /// Structural checks that do not need the resolved attribute.
    pub fn validate_filter(decl: &ExtendedFilterDecl, nested: bool) -> ConfigResult<()> {
        let name = &decl.filter;

        if decl.use_repr && (decl.ordering || decl.search) {
            return Err(ConfigError::invalid(
                name,
                "use_repr cannot be combined with ordering or search",
            ));
        }

        if decl.dynamic {
            if decl.field.is_none() {
                return Err(ConfigError::invalid(name, "dynamic filter requires 'field'"));
            }
            if nested {
                return Err(ConfigError::invalid(
                    name,
                    "dynamic filter cannot be nested in a namespace",
                ));
            }
        } else if !decl.custom && decl.field.is_some() {
            return Err(ConfigError::invalid(
                name,
                "'field' is only allowed on dynamic or custom filters",
            ));
        }

        if decl.source.is_some() && decl.sources.is_some() {
            return Err(ConfigError::invalid(
                name,
                "'source' and 'sources' are mutually exclusive",
            ));
        }
        if let Some(sources) = &decl.sources {
            if sources.is_empty() {
                return Err(ConfigError::invalid(name, "'sources' cannot be empty"));
            }
            if decl.dynamic {
                return Err(ConfigError::invalid(name, "dynamic filter cannot fan out"));
            }
        }

        Ok(())
    }

    /// Checks that depend on the resolved attribute.
    pub fn validate_field(
        name: &str,
        field: &ModelField,
        decl: &ExtendedFilterDecl,
    ) -> ConfigResult<()> {
        if decl.search && field.kind != FieldKind::String {
            return Err(ConfigError::invalid(
                name,
                format!("search requires a string field, got {}", field.kind.type_name()),
            ));
        }
        if decl.search && !field.choices.is_empty() {
            return Err(ConfigError::invalid(name, "search is not valid on a choice field"));
        }
        if decl.search {
            let has_ilike = match &decl.lookups {
                Some(lookups) => lookups.contains(&FilterLookup::ILike),
                None => field.valid_lookups().contains(&FilterLookup::ILike),
            };
            if !has_ilike {
                return Err(ConfigError::invalid(name, "search requires the ilike lookup"));
            }
        }
        if decl.use_repr && field.choices.is_empty() {
            return Err(ConfigError::invalid(name, "use_repr requires a choice field"));
        }
        if let Some(lookups) = &decl.lookups {
            Self::validate_lookups(name, lookups, &field.valid_lookups())?;
        }
        Ok(())
    }

    pub fn validate_lookups(
        name: &str,
        requested: &BTreeSet<FilterLookup>,
        valid: &BTreeSet<FilterLookup>,
    ) -> ConfigResult<()> {
        match requested.difference(valid).next() {
            Some(lookup) => Err(ConfigError::InvalidLookup {
                name: name.to_string(),
                lookup: *lookup,
            }),
            None => Ok(()),
        }
    }
}
