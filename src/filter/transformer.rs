//! Parse tree to predicate
//!
//! Walks the tree bottom-up. Leaves go through the predicate builder;
//! `and`/`or`/`not` combine their children. Ordering, selection and
//! pagination directives are collected on the way and resolved after the
//! walk.

use crate::constants::{
    ComparisonOperator, ListOperator, LogicalOperator, RQL_LIMIT_PARAM, RQL_OFFSET_PARAM,
};
use crate::parser::Node;

use super::builder::PredicateBuilder;
use super::errors::{FilterError, FilterResult};
use super::predicate::Predicate;

/// Everything extracted from one parse tree
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedQuery {
    pub predicate: Predicate,
    /// One entry per `ordering(...)` call
    pub ordering: Vec<Vec<String>>,
    pub select: Vec<String>,
    /// Raw `limit` values, in query order
    pub limit: Vec<String>,
    /// Raw `offset` values, in query order
    pub offset: Vec<String>,
    /// A visited filter requires deduplication
    pub distinct: bool,
}

pub struct QueryTransformer<'b, 'a> {
    builder: &'b mut PredicateBuilder<'a>,
    ordering: Vec<Vec<String>>,
    select: Vec<String>,
    limit: Vec<String>,
    offset: Vec<String>,
}

impl<'b, 'a> QueryTransformer<'b, 'a> {
    pub fn new(builder: &'b mut PredicateBuilder<'a>) -> Self {
        Self {
            builder,
            ordering: Vec::new(),
            select: Vec::new(),
            limit: Vec::new(),
            offset: Vec::new(),
        }
    }

    pub fn transform(mut self, tree: &Node) -> FilterResult<TransformedQuery> {
        let predicate = self.visit(tree, true)?;
        Ok(TransformedQuery {
            predicate,
            ordering: self.ordering,
            select: self.select,
            limit: self.limit,
            offset: self.offset,
            distinct: self.builder.requires_distinct(),
        })
    }

    /// `top` holds while only conjunctions separate the node from the root.
    fn visit(&mut self, node: &Node, top: bool) -> FilterResult<Predicate> {
        match node {
            Node::Comparison {
                property,
                operator,
                value,
            } => self.visit_comparison(property, *operator, value, top),
            Node::Listing {
                operator,
                property,
                values,
            } => self.visit_listing(*operator, property, values),
            Node::Logical { operator, children } => match operator {
                LogicalOperator::And => {
                    let parts = children
                        .iter()
                        .map(|c| self.visit(c, top))
                        .collect::<FilterResult<Vec<_>>>()?;
                    Ok(Predicate::all(parts))
                }
                LogicalOperator::Or => {
                    let parts = children
                        .iter()
                        .map(|c| self.visit(c, false))
                        .collect::<FilterResult<Vec<_>>>()?;
                    Ok(Predicate::any(parts))
                }
                LogicalOperator::Not => match children.as_slice() {
                    [child] => Ok(self.visit(child, false)?.negate()),
                    _ => Err(FilterError::parsing("not() takes exactly one argument")),
                },
            },
            Node::Ordering { tokens } => {
                self.ordering.push(tokens.clone());
                Ok(Predicate::Neutral)
            }
            Node::Select { tokens } => {
                self.select.extend(tokens.iter().cloned());
                Ok(Predicate::Neutral)
            }
        }
    }

    fn visit_comparison(
        &mut self,
        property: &str,
        operator: ComparisonOperator,
        value: &str,
        top: bool,
    ) -> FilterResult<Predicate> {
        let target = match property {
            RQL_LIMIT_PARAM => &mut self.limit,
            RQL_OFFSET_PARAM => &mut self.offset,
            _ => return self.builder.build_predicate(property, operator, value, None),
        };
        if !top || operator != ComparisonOperator::Eq {
            return Err(FilterError::parsing(format!(
                "'{}' must be a top-level eq directive",
                property
            )));
        }
        target.push(value.to_string());
        Ok(Predicate::Neutral)
    }

    fn visit_listing(
        &mut self,
        operator: ListOperator,
        property: &str,
        values: &[String],
    ) -> FilterResult<Predicate> {
        let item = operator.item_operator();
        let parts = values
            .iter()
            .map(|v| self.builder.build_predicate(property, item, v, Some(operator)))
            .collect::<FilterResult<Vec<_>>>()?;
        Ok(match operator {
            ListOperator::In => Predicate::any(parts),
            ListOperator::Out => Predicate::all(parts),
        })
    }
}
