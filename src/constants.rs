//! Reserved literals, grammar operators and filter lookups.
//!
//! Everything in this module is schema independent: the tokens are
//! recognised by the parser and the predicate builder regardless of the
//! filter declaration being used.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value literal that resolves to an `IS NULL` comparison.
pub const RQL_NULL: &str = "null()";
/// Value literal that resolves to the empty string.
pub const RQL_EMPTY: &str = "empty()";
pub const RQL_TRUE: &str = "true";
pub const RQL_FALSE: &str = "false";
/// Pseudo filter name used for free-text search.
pub const RQL_SEARCH_PARAM: &str = "search";
/// Wildcard symbol for `like`, `ilike` and search values.
pub const RQL_ANY_SYMBOL: char = '*';
pub const RQL_LIMIT_PARAM: &str = "limit";
pub const RQL_OFFSET_PARAM: &str = "offset";
pub const RQL_ORDERING_OPERATOR: &str = "ordering";
pub const RQL_SELECT_OPERATOR: &str = "select";
/// Deepest group or call nesting the parser accepts.
pub const RQL_MAX_NESTING: usize = 128;

/// Public filter names that a declaration may not claim.
pub const RESERVED_FILTER_NAMES: [&str; 5] = [
    RQL_SEARCH_PARAM,
    RQL_ORDERING_OPERATOR,
    RQL_SELECT_OPERATOR,
    RQL_LIMIT_PARAM,
    RQL_OFFSET_PARAM,
];

/// Returns true if `name` is reserved by the query language.
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_FILTER_NAMES.contains(&name)
}

/// Comparison operators of the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    #[serde(rename = "ilike")]
    ILike,
}

impl ComparisonOperator {
    /// Get the operator string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::Ne => "ne",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Le => "le",
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Ge => "ge",
            ComparisonOperator::Like => "like",
            ComparisonOperator::ILike => "ilike",
        }
    }

    /// Resolve a grammar keyword (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name.to_ascii_lowercase().as_str() {
            "eq" => ComparisonOperator::Eq,
            "ne" => ComparisonOperator::Ne,
            "lt" => ComparisonOperator::Lt,
            "le" => ComparisonOperator::Le,
            "gt" => ComparisonOperator::Gt,
            "ge" => ComparisonOperator::Ge,
            "like" => ComparisonOperator::Like,
            "ilike" => ComparisonOperator::ILike,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// List operators: `in(prop,(a,b))` and `out(prop,(a,b))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOperator {
    In,
    Out,
}

impl ListOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListOperator::In => "in",
            ListOperator::Out => "out",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "in" => Some(ListOperator::In),
            "out" => Some(ListOperator::Out),
            _ => None,
        }
    }

    /// Comparison applied to every listed value
    pub fn item_operator(&self) -> ComparisonOperator {
        match self {
            ListOperator::In => ComparisonOperator::Eq,
            ListOperator::Out => ComparisonOperator::Ne,
        }
    }
}

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
            LogicalOperator::Not => "not",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "and" => Some(LogicalOperator::And),
            "or" => Some(LogicalOperator::Or),
            "not" => Some(LogicalOperator::Not),
            _ => None,
        }
    }
}

/// Lookups a filter may permit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLookup {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Out,
    Null,
    Like,
    #[serde(rename = "ilike")]
    ILike,
}

impl FilterLookup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterLookup::Eq => "eq",
            FilterLookup::Ne => "ne",
            FilterLookup::Lt => "lt",
            FilterLookup::Le => "le",
            FilterLookup::Gt => "gt",
            FilterLookup::Ge => "ge",
            FilterLookup::In => "in",
            FilterLookup::Out => "out",
            FilterLookup::Null => "null",
            FilterLookup::Like => "like",
            FilterLookup::ILike => "ilike",
        }
    }
}

impl From<ComparisonOperator> for FilterLookup {
    fn from(op: ComparisonOperator) -> Self {
        match op {
            ComparisonOperator::Eq => FilterLookup::Eq,
            ComparisonOperator::Ne => FilterLookup::Ne,
            ComparisonOperator::Lt => FilterLookup::Lt,
            ComparisonOperator::Le => FilterLookup::Le,
            ComparisonOperator::Gt => FilterLookup::Gt,
            ComparisonOperator::Ge => FilterLookup::Ge,
            ComparisonOperator::Like => FilterLookup::Like,
            ComparisonOperator::ILike => FilterLookup::ILike,
        }
    }
}

impl From<ListOperator> for FilterLookup {
    fn from(op: ListOperator) -> Self {
        match op {
            ListOperator::In => FilterLookup::In,
            ListOperator::Out => FilterLookup::Out,
        }
    }
}

impl fmt::Display for FilterLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved_name("search"));
        assert!(is_reserved_name("select"));
        assert!(!is_reserved_name("name"));
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(ComparisonOperator::from_name("GE"), Some(ComparisonOperator::Ge));
        assert_eq!(ComparisonOperator::from_name("in"), None);
        assert_eq!(ListOperator::from_name("out"), Some(ListOperator::Out));
        assert_eq!(LogicalOperator::from_name("Not"), Some(LogicalOperator::Not));
    }

    #[test]
    fn test_lookup_from_operator() {
        assert_eq!(FilterLookup::from(ComparisonOperator::ILike), FilterLookup::ILike);
        assert_eq!(FilterLookup::from(ListOperator::In), FilterLookup::In);
        assert_eq!(ListOperator::Out.item_operator(), ComparisonOperator::Ne);
    }

    #[test]
    fn test_lookup_serde_names() {
        let lookup: FilterLookup = serde_json::from_str("\"ilike\"").unwrap();
        assert_eq!(lookup, FilterLookup::ILike);
        assert_eq!(serde_json::to_string(&FilterLookup::Null).unwrap(), "\"null\"");
    }
}
