//! Multi-key result sorting
//!
//! Stable: documents equal on every key keep their relative order.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use super::matcher::first_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One sort key: dotted attribute path plus direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// `-path` for descending keys, `path` otherwise
    pub fn to_token(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.field.clone(),
            SortDirection::Desc => format!("-{}", self.field),
        }
    }
}

pub struct ResultSorter;

impl ResultSorter {
    /// Sorts by every key in order; later keys break ties.
    pub fn sort(documents: &mut [Value], keys: &[SortSpec]) {
        if keys.is_empty() {
            return;
        }
        documents.sort_by(|a, b| {
            keys.iter().fold(Ordering::Equal, |acc, key| {
                acc.then_with(|| {
                    let ordering =
                        Self::compare_values(first_value(a, &key.field), first_value(b, &key.field));
                    match key.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
            })
        });
    }

    /// Missing < null < bool < number < string; arrays and objects tie.
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        let (a, b) = match (a, b) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => (a, b),
        };

        let rank = |v: &Value| -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Number(_) => 2,
                Value::String(_) => 3,
                Value::Array(_) => 4,
                Value::Object(_) => 5,
            }
        };

        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(0.0);
                let y = y.as_f64().unwrap_or(0.0);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => rank(a).cmp(&rank(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(docs: &[Value]) -> Vec<i64> {
        docs.iter().map(|d| d["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_sort_descending() {
        let mut docs = vec![json!({"id": 1, "age": 20}), json!({"id": 2, "age": 30})];
        ResultSorter::sort(&mut docs, &[SortSpec::desc("age")]);
        assert_eq!(ids(&docs), vec![2, 1]);
    }

    #[test]
    fn test_multi_key_tie_break() {
        let mut docs = vec![
            json!({"id": 1, "age": 30, "name": "b"}),
            json!({"id": 2, "age": 20, "name": "z"}),
            json!({"id": 3, "age": 30, "name": "a"}),
        ];
        ResultSorter::sort(&mut docs, &[SortSpec::desc("age"), SortSpec::asc("name")]);
        assert_eq!(ids(&docs), vec![3, 1, 2]);
    }

    #[test]
    fn test_sort_stable_and_nested() {
        let mut docs = vec![
            json!({"id": 1, "author": {"name": "x"}}),
            json!({"id": 2}),
            json!({"id": 3, "author": {"name": "x"}}),
            json!({"id": 4, "author": {"name": "a"}}),
        ];
        ResultSorter::sort(&mut docs, &[SortSpec::asc("author.name")]);
        assert_eq!(ids(&docs), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_token() {
        assert_eq!(SortSpec::desc("age").to_token(), "-age");
        assert_eq!(SortSpec::asc("age").to_token(), "age");
    }
}
