//! RQL parse tree

use serde::Serialize;

use crate::constants::{ComparisonOperator, ListOperator, LogicalOperator};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// `prop=value`, `prop=op=value`, `op(prop,value)`
    Comparison {
        property: String,
        operator: ComparisonOperator,
        /// Raw literal, quotes included
        value: String,
    },
    /// `in(prop,(a,b))`, `out(prop,(a,b))`
    Listing {
        operator: ListOperator,
        property: String,
        values: Vec<String>,
    },
    Logical {
        operator: LogicalOperator,
        children: Vec<Node>,
    },
    /// `ordering(-a,b)`, tokens keep their sign
    Ordering { tokens: Vec<String> },
    /// `select(-a,+b)`, tokens keep their sign
    Select { tokens: Vec<String> },
}

impl Node {
    pub fn comparison(
        property: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<String>,
    ) -> Self {
        Node::Comparison {
            property: property.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn logical(operator: LogicalOperator, children: Vec<Node>) -> Self {
        Node::Logical { operator, children }
    }
}
