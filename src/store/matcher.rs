//! Predicate evaluation over JSON documents
//!
//! Paths are dotted. Arrays along a path fan out: a condition holds if it
//! holds for any reached value. A missing attribute counts as null.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::filter::{parse_date, parse_datetime, Condition, Predicate, StoreLookup, TypedValue};

static NULL: Value = Value::Null;

/// Every value reached by `path`, missing attributes as `null`.
pub fn resolve_path<'v>(document: &'v Value, path: &str) -> Vec<&'v Value> {
    let mut current = vec![document];
    for segment in path.split('.') {
        let mut next = Vec::with_capacity(current.len());
        for value in current {
            collect_segment(value, segment, &mut next);
        }
        current = next;
    }
    current
}

fn collect_segment<'v>(value: &'v Value, segment: &str, out: &mut Vec<&'v Value>) {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                out.push(&NULL);
            }
            for item in items {
                collect_segment(item, segment, out);
            }
        }
        Value::Object(map) => out.push(map.get(segment).unwrap_or(&NULL)),
        _ => out.push(&NULL),
    }
}

/// First value reached by `path`, `None` if absent or null.
pub fn first_value<'v>(document: &'v Value, path: &str) -> Option<&'v Value> {
    resolve_path(document, path)
        .into_iter()
        .find(|v| !v.is_null())
}

/// Evaluates predicates, caching compiled regular expressions.
#[derive(Default)]
pub struct PredicateMatcher {
    regexes: HashMap<(String, bool), Option<Regex>>,
}

impl PredicateMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(&mut self, document: &Value, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Neutral => true,
            Predicate::Condition(c) => self.matches_condition(document, c),
            Predicate::Not(inner) => !self.matches(document, inner),
            Predicate::And(parts) => parts.iter().all(|p| self.matches(document, p)),
            Predicate::Or(parts) => parts.iter().any(|p| self.matches(document, p)),
        }
    }

    fn matches_condition(&mut self, document: &Value, condition: &Condition) -> bool {
        let values = resolve_path(document, &condition.path);

        if condition.lookup == StoreLookup::IsNull {
            let expected = matches!(condition.value, TypedValue::Bool(true));
            return values.iter().any(|v| v.is_null()) == expected;
        }

        values
            .into_iter()
            .any(|actual| self.compare(actual, condition.lookup, &condition.value))
    }

    fn compare(&mut self, actual: &Value, lookup: StoreLookup, expected: &TypedValue) -> bool {
        match lookup {
            StoreLookup::Exact => compare_typed(actual, expected) == Some(Ordering::Equal),
            StoreLookup::Lt => compare_typed(actual, expected) == Some(Ordering::Less),
            StoreLookup::Lte => matches!(
                compare_typed(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            StoreLookup::Gt => compare_typed(actual, expected) == Some(Ordering::Greater),
            StoreLookup::Gte => matches!(
                compare_typed(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            StoreLookup::IsNull => actual.is_null(),
            _ => {
                let (text, operand) = match (actual.as_str(), expected) {
                    (Some(text), TypedValue::String(operand)) => (text, operand),
                    _ => return false,
                };
                self.compare_text(text, lookup, operand)
            }
        }
    }

    fn compare_text(&mut self, text: &str, lookup: StoreLookup, operand: &str) -> bool {
        if matches!(lookup, StoreLookup::Regex | StoreLookup::IRegex) {
            let insensitive = lookup == StoreLookup::IRegex;
            return self
                .regex(operand, insensitive)
                .map(|re| re.is_match(text))
                .unwrap_or(false);
        }

        let (text, operand) = if lookup.is_case_insensitive() {
            (text.to_lowercase(), operand.to_lowercase())
        } else {
            (text.to_string(), operand.to_string())
        };
        match lookup {
            StoreLookup::IExact => text == operand,
            StoreLookup::Contains | StoreLookup::IContains => text.contains(&operand),
            StoreLookup::StartsWith | StoreLookup::IStartsWith => text.starts_with(&operand),
            StoreLookup::EndsWith | StoreLookup::IEndsWith => text.ends_with(&operand),
            _ => false,
        }
    }

    fn regex(&mut self, pattern: &str, insensitive: bool) -> Option<&Regex> {
        self.regexes
            .entry((pattern.to_string(), insensitive))
            .or_insert_with(|| {
                RegexBuilder::new(pattern)
                    .case_insensitive(insensitive)
                    .build()
                    .ok()
            })
            .as_ref()
    }
}

/// Orders a stored value against a coerced literal. `None` when the two
/// are not comparable.
fn compare_typed(actual: &Value, expected: &TypedValue) -> Option<Ordering> {
    match expected {
        TypedValue::Null => actual.is_null().then_some(Ordering::Equal),
        TypedValue::Bool(b) => actual.as_bool().map(|a| a.cmp(b)),
        TypedValue::Int(i) => match actual.as_i64() {
            Some(a) => Some(a.cmp(i)),
            None => actual.as_f64()?.partial_cmp(&(*i as f64)),
        },
        TypedValue::Float(f) => actual.as_f64()?.partial_cmp(f),
        TypedValue::String(s) => actual.as_str().map(|a| a.cmp(s.as_str())),
        TypedValue::Date(d) => {
            let text = actual.as_str()?;
            let date = parse_date(text).or_else(|| parse_datetime(text).map(|dt| dt.date()))?;
            Some(date.cmp(d))
        }
        TypedValue::DateTime(dt) => {
            let text = actual.as_str()?;
            let parsed = parse_datetime(text)
                .or_else(|| parse_date(text).and_then(|d| d.and_hms_opt(0, 0, 0)))?;
            Some(parsed.cmp(dt))
        }
    }
}
