//! Compiled filter registry entries

use std::collections::BTreeSet;

use serde::Serialize;

use crate::constants::{FilterLookup, RQL_NULL};

use super::types::ModelField;

/// One underlying attribute a public filter name resolves to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Dotted attribute path from the root model, e.g. `author.name`
    pub path: String,
    pub field: ModelField,
    pub lookups: BTreeSet<FilterLookup>,
    pub null_values: BTreeSet<String>,
    pub distinct: bool,
    pub use_repr: bool,
    /// Predicate and ordering are delegated to the custom hooks
    pub custom: bool,
}

impl FieldDescriptor {
    /// Descriptor with the field's default lookups and null sentinel
    pub fn new(path: impl Into<String>, field: ModelField) -> Self {
        let lookups = field.valid_lookups();
        Self {
            path: path.into(),
            field,
            lookups,
            null_values: default_null_values(),
            distinct: false,
            use_repr: false,
            custom: false,
        }
    }

    pub fn permits(&self, lookup: FilterLookup) -> bool {
        self.lookups.contains(&lookup)
    }

    pub fn is_null_value(&self, raw: &str) -> bool {
        self.null_values.contains(raw)
    }
}

pub fn default_null_values() -> BTreeSet<String> {
    [RQL_NULL.to_string()].into_iter().collect()
}

/// Registry value for one public filter name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterEntry {
    Single(FieldDescriptor),
    /// Several sources sharing one public name and one lookup set
    FanOut(Vec<FieldDescriptor>),
}

impl FilterEntry {
    pub fn descriptors(&self) -> &[FieldDescriptor] {
        match self {
            FilterEntry::Single(d) => std::slice::from_ref(d),
            FilterEntry::FanOut(ds) => ds,
        }
    }

    /// Descriptor whose lookups, null values and flags govern the entry.
    /// `None` only for a hand-built fan-out with no sources.
    pub fn base(&self) -> Option<&FieldDescriptor> {
        self.descriptors().first()
    }

    pub fn is_distinct(&self) -> bool {
        self.descriptors().iter().any(|d| d.distinct)
    }
}
