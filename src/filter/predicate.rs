//! Store-level predicates
//!
//! A [`Predicate`] is what the result-set adapter filters by. It is built
//! bottom-up by the transformer and only combined afterwards, never
//! inspected by query logic.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

/// Coerced literal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    String(String),
}

impl From<&Value> for TypedValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => TypedValue::Null,
            Value::Bool(b) => TypedValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => TypedValue::Int(i),
                None => TypedValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => TypedValue::String(s.clone()),
            other => TypedValue::String(other.to_string()),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => write!(f, "null"),
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::Int(i) => write!(f, "{}", i),
            TypedValue::Float(v) => write!(f, "{}", v),
            TypedValue::Date(d) => write!(f, "{}", d),
            TypedValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            TypedValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Comparison the backing store evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreLookup {
    Exact,
    IExact,
    Lt,
    Lte,
    Gt,
    Gte,
    IsNull,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Regex,
    IRegex,
}

impl StoreLookup {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreLookup::Exact => "exact",
            StoreLookup::IExact => "iexact",
            StoreLookup::Lt => "lt",
            StoreLookup::Lte => "lte",
            StoreLookup::Gt => "gt",
            StoreLookup::Gte => "gte",
            StoreLookup::IsNull => "isnull",
            StoreLookup::Contains => "contains",
            StoreLookup::IContains => "icontains",
            StoreLookup::StartsWith => "startswith",
            StoreLookup::IStartsWith => "istartswith",
            StoreLookup::EndsWith => "endswith",
            StoreLookup::IEndsWith => "iendswith",
            StoreLookup::Regex => "regex",
            StoreLookup::IRegex => "iregex",
        }
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            StoreLookup::IExact
                | StoreLookup::IContains
                | StoreLookup::IStartsWith
                | StoreLookup::IEndsWith
                | StoreLookup::IRegex
        )
    }
}

impl fmt::Display for StoreLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf comparison: `path__lookup = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub path: String,
    pub lookup: StoreLookup,
    pub value: TypedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Matches everything; dropped when combined
    Neutral,
    Condition(Condition),
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn condition(path: impl Into<String>, lookup: StoreLookup, value: TypedValue) -> Self {
        Predicate::Condition(Condition {
            path: path.into(),
            lookup,
            value,
        })
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Predicate::Neutral)
    }

    /// Conjunction. Neutral operands are dropped, nested conjunctions
    /// are flattened.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut parts = Vec::new();
        for p in predicates {
            match p {
                Predicate::Neutral => {}
                Predicate::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        collapse(parts, Predicate::And)
    }

    /// Disjunction. Neutral operands are dropped, nested disjunctions
    /// are flattened.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut parts = Vec::new();
        for p in predicates {
            match p {
                Predicate::Neutral => {}
                Predicate::Or(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        collapse(parts, Predicate::Or)
    }

    pub fn negate(self) -> Predicate {
        match self {
            Predicate::Neutral => Predicate::Neutral,
            other => Predicate::Not(Box::new(other)),
        }
    }
}

fn collapse(mut parts: Vec<Predicate>, wrap: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    match parts.len() {
        0 => Predicate::Neutral,
        1 => parts.pop().unwrap_or(Predicate::Neutral),
        _ => wrap(parts),
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Neutral => write!(f, "TRUE"),
            Predicate::Condition(c) => write!(f, "{}__{}={}", c.path, c.lookup, c.value),
            Predicate::Not(inner) => write!(f, "NOT({})", inner),
            Predicate::And(parts) | Predicate::Or(parts) => {
                let sep = if matches!(self, Predicate::And(_)) { " AND " } else { " OR " };
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}
