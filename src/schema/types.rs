//! Model metadata consumed by the schema compiler
//!
//! Supported filter types:
//! - integer: 64-bit signed integer
//! - float: 64-bit floating point
//! - decimal: fixed-point, rounded to `decimal_places`
//! - date / datetime: ISO-8601
//! - boolean
//! - string
//!
//! `relation` fields link to another model and may only appear in the
//! middle of an attribute path. `json` and `binary` fields exist on models
//! but cannot be filtered.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::FilterLookup;

/// Declared attribute types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Float,
    Decimal,
    Date,
    DateTime,
    Boolean,
    String,
    Relation,
    Json,
    Binary,
}

impl FieldKind {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Decimal => "decimal",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Boolean => "boolean",
            FieldKind::String => "string",
            FieldKind::Relation => "relation",
            FieldKind::Json => "json",
            FieldKind::Binary => "binary",
        }
    }

    /// Returns true if a filter may terminate on this type
    pub fn is_filterable(&self) -> bool {
        !matches!(self, FieldKind::Relation | FieldKind::Json | FieldKind::Binary)
    }

    fn base_lookups(&self) -> &'static [FilterLookup] {
        use FilterLookup as L;

        match self {
            FieldKind::Integer
            | FieldKind::Float
            | FieldKind::Decimal
            | FieldKind::Date
            | FieldKind::DateTime => &[L::Eq, L::Ne, L::Lt, L::Le, L::Gt, L::Ge, L::In, L::Out],
            FieldKind::String => &[L::Eq, L::Ne, L::In, L::Out, L::Like, L::ILike],
            FieldKind::Boolean => &[L::Eq, L::Ne],
            FieldKind::Relation | FieldKind::Json | FieldKind::Binary => &[],
        }
    }
}

/// One entry of an enumerated choice set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Stored value
    pub value: Value,
    /// Display representation
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Attribute definition on a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Attribute may hold null
    #[serde(default)]
    pub null: bool,
    /// Attribute may hold the empty string
    #[serde(default)]
    pub blank: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Target model name for relation fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_model: Option<String>,
}

impl ModelField {
    /// Create a plain field of the given kind
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            null: false,
            blank: false,
            primary_key: false,
            decimal_places: None,
            choices: Vec::new(),
            related_model: None,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn decimal(name: impl Into<String>, decimal_places: u32) -> Self {
        Self {
            decimal_places: Some(decimal_places),
            ..Self::new(name, FieldKind::Decimal)
        }
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    /// Create a relation to `model`
    pub fn relation(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            related_model: Some(model.into()),
            ..Self::new(name, FieldKind::Relation)
        }
    }

    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.blank = true;
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    /// Lookups a filter over this field may use.
    ///
    /// Choice fields only compare for (in)equality; `null` is added for
    /// nullable attributes and primary keys.
    pub fn valid_lookups(&self) -> BTreeSet<FilterLookup> {
        let mut lookups: BTreeSet<FilterLookup> = if self.choices.is_empty() {
            self.kind.base_lookups().iter().copied().collect()
        } else {
            [
                FilterLookup::Eq,
                FilterLookup::Ne,
                FilterLookup::In,
                FilterLookup::Out,
            ]
            .into_iter()
            .collect()
        };

        if self.null || self.primary_key {
            lookups.insert(FilterLookup::Null);
        }
        lookups
    }
}

/// A named model: an ordered list of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub fields: Vec<ModelField>,
}

impl Model {
    pub fn new(name: impl Into<String>, fields: Vec<ModelField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
