//! RQL query parser
//!
//! Turns a query string into a [`Node`] tree. Values are kept as raw
//! literals; typing happens later against the filter schema.

mod ast;
mod grammar;
mod lexer;

pub use ast::Node;
pub use grammar::RqlParser;
pub use lexer::{Lexer, Token};

use crate::filter::FilterResult;

/// Parses `query`. Blank queries yield `None`.
pub fn parse(query: &str) -> FilterResult<Option<Node>> {
    RqlParser::new(query)?.parse()
}
