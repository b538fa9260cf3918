//! Value coercion
//!
//! Raw query literals become [`TypedValue`]s according to the declared
//! field type. Every function here is total: it returns `None` instead of
//! guessing when a literal does not fit.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::constants::{RQL_EMPTY, RQL_FALSE, RQL_TRUE};
use crate::schema::{FieldKind, ModelField};

use super::predicate::TypedValue;

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Removes one pair of matching surrounding quotes.
pub fn strip_quotes(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// ISO-8601 datetime. Offsets are normalized to UTC.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.naive_utc());
        }
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Coerces `raw` for `field`.
///
/// The empty sentinel is accepted only when the field allows blank values
/// and is not an integer.
pub fn coerce_value(field: &ModelField, use_repr: bool, raw: &str) -> Option<TypedValue> {
    if raw == RQL_EMPTY {
        return (field.blank && field.kind != FieldKind::Integer)
            .then(|| TypedValue::String(String::new()));
    }

    let value = strip_quotes(raw);
    if !field.choices.is_empty() {
        return coerce_choice(field, use_repr, value);
    }

    match field.kind {
        FieldKind::Integer => value.parse::<i64>().ok().map(TypedValue::Int),
        FieldKind::Float => parse_float(value).map(TypedValue::Float),
        FieldKind::Decimal => {
            let parsed = parse_float(value)?;
            let rounded = match field.decimal_places {
                Some(places) => round_to(parsed, places),
                None => parsed,
            };
            Some(TypedValue::Float(rounded))
        }
        FieldKind::Date => parse_date(value).map(TypedValue::Date),
        FieldKind::DateTime => parse_datetime(value).map(TypedValue::DateTime),
        FieldKind::Boolean => match value {
            RQL_TRUE => Some(TypedValue::Bool(true)),
            RQL_FALSE => Some(TypedValue::Bool(false)),
            _ => None,
        },
        FieldKind::String => Some(TypedValue::String(value.to_string())),
        FieldKind::Relation | FieldKind::Json | FieldKind::Binary => None,
    }
}

fn coerce_choice(field: &ModelField, use_repr: bool, value: &str) -> Option<TypedValue> {
    if use_repr {
        return field
            .choices
            .iter()
            .find(|c| c.label == value)
            .map(|c| TypedValue::from(&c.value));
    }

    if field.kind == FieldKind::Integer {
        let parsed = value.parse::<i64>().ok()?;
        return field
            .choices
            .iter()
            .find(|c| c.value.as_i64() == Some(parsed))
            .map(|_| TypedValue::Int(parsed));
    }

    field
        .choices
        .iter()
        .find(|c| choice_key(&c.value) == value)
        .map(|c| TypedValue::from(&c.value))
}

fn choice_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_float(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Choice;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'abc'"), "abc");
        assert_eq!(strip_quotes("\"a b\""), "a b");
        assert_eq!(strip_quotes("'abc\""), "'abc\"");
        assert_eq!(strip_quotes("'"), "'");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(coerce_value(&ModelField::integer("n"), false, "42"), Some(TypedValue::Int(42)));
        assert_eq!(coerce_value(&ModelField::integer("n"), false, "4.2"), None);
        assert_eq!(coerce_value(&ModelField::float("f"), false, "'2.5'"), Some(TypedValue::Float(2.5)));
        assert_eq!(coerce_value(&ModelField::float("f"), false, "abc"), None);
        assert_eq!(coerce_value(&ModelField::float("f"), false, "inf"), None);
        assert_eq!(
            coerce_value(&ModelField::decimal("price", 2), false, "3.14159"),
            Some(TypedValue::Float(3.14))
        );
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            coerce_value(&ModelField::date("d"), false, "2020-02-29"),
            Some(TypedValue::Date(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()))
        );
        assert_eq!(coerce_value(&ModelField::date("d"), false, "2019-02-29"), None);

        let expected = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2020-01-01T10:00:00+03:00"), Some(expected));
        assert_eq!(parse_datetime("2020-01-01T07:00:00"), Some(expected));
        assert_eq!(parse_datetime("2020-01-01 07:00:00"), Some(expected));
        assert_eq!(parse_datetime("2020-01-01T07:00"), Some(expected));
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn test_booleans() {
        let field = ModelField::boolean("b");
        assert_eq!(coerce_value(&field, false, "true"), Some(TypedValue::Bool(true)));
        assert_eq!(coerce_value(&field, false, "false"), Some(TypedValue::Bool(false)));
        assert_eq!(coerce_value(&field, false, "True"), None);
        assert_eq!(coerce_value(&field, false, "1"), None);
    }

    #[test]
    fn test_empty_sentinel() {
        assert_eq!(coerce_value(&ModelField::string("s"), false, "empty()"), None);
        assert_eq!(
            coerce_value(&ModelField::string("s").allow_blank(), false, "empty()"),
            Some(TypedValue::String(String::new()))
        );
        assert_eq!(
            coerce_value(&ModelField::integer("n").allow_blank(), false, "empty()"),
            None
        );
        assert_eq!(
            coerce_value(&ModelField::string("s"), false, "'empty()'"),
            Some(TypedValue::String("empty()".into()))
        );
    }

    #[test]
    fn test_choices() {
        let int_choices = ModelField::integer("status")
            .with_choices(vec![Choice::new(0, "draft"), Choice::new(1, "published")]);
        assert_eq!(coerce_value(&int_choices, false, "1"), Some(TypedValue::Int(1)));
        assert_eq!(coerce_value(&int_choices, false, "2"), None);
        assert_eq!(coerce_value(&int_choices, true, "published"), Some(TypedValue::Int(1)));
        assert_eq!(coerce_value(&int_choices, true, "1"), None);

        let str_choices = ModelField::string("kind")
            .with_choices(vec![Choice::new("a", "Alpha")]);
        assert_eq!(coerce_value(&str_choices, false, "a"), Some(TypedValue::String("a".into())));
        assert_eq!(coerce_value(&str_choices, false, "Alpha"), None);
    }
}
