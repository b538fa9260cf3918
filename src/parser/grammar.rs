//! Recursive descent parser for RQL
//!
//! # Grammar
//!
//! ```text
//! query      := expr?
//! expr       := and_expr ('|' and_expr)*
//! and_expr   := term (('&' | ',') term)*        ',' only outside call arguments
//! term       := '(' expr ')' | call | comparison
//! call       := ('and' | 'or') '(' expr (',' expr)* ')'
//!             | 'not' '(' expr ')'
//!             | OP '(' prop ',' value ')'
//!             | ('in' | 'out') '(' prop ',' list ')'
//!             | ('ordering' | 'select') '(' (prop (',' prop)*)? ')'
//! comparison := prop '=' value | prop '!=' value
//!             | prop '=' OP '=' value | prop '=' ('in' | 'out') '=' list
//! list       := '(' value (',' value)* ')' | value
//! ```

use crate::constants::{
    ComparisonOperator, ListOperator, LogicalOperator, RQL_MAX_NESTING, RQL_ORDERING_OPERATOR,
    RQL_SELECT_OPERATOR,
};
use crate::filter::{FilterError, FilterResult};

use super::ast::Node;
use super::lexer::{Lexer, Token};

pub struct RqlParser {
    lexer: Lexer,
    current: Token,
    current_pos: usize,
    depth: usize,
}

impl RqlParser {
    pub fn new(input: &str) -> FilterResult<Self> {
        let mut lexer = Lexer::new(input);
        let (current, current_pos) = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            current_pos,
            depth: 0,
        })
    }

    /// Parses the whole input. Blank input yields `None`.
    pub fn parse(&mut self) -> FilterResult<Option<Node>> {
        if self.current == Token::Eof {
            return Ok(None);
        }

        let node = self.parse_expr(true)?;
        if self.current != Token::Eof {
            return Err(self.unexpected());
        }
        Ok(Some(node))
    }

    /// Every group and call re-enters here, so nesting is bounded in one place.
    fn parse_expr(&mut self, allow_comma: bool) -> FilterResult<Node> {
        if self.depth >= RQL_MAX_NESTING {
            return Err(FilterError::parsing(format!(
                "query nesting too deep at position {}",
                self.current_pos
            )));
        }
        self.depth += 1;
        let node = self.parse_alternatives(allow_comma);
        self.depth -= 1;
        node
    }

    fn parse_alternatives(&mut self, allow_comma: bool) -> FilterResult<Node> {
        let mut alternatives = vec![self.parse_and_expr(allow_comma)?];
        while self.current == Token::Pipe {
            self.advance()?;
            alternatives.push(self.parse_and_expr(allow_comma)?);
        }
        Ok(combine(LogicalOperator::Or, alternatives))
    }

    fn parse_and_expr(&mut self, allow_comma: bool) -> FilterResult<Node> {
        let mut terms = vec![self.parse_term()?];
        while self.current == Token::Amp || (allow_comma && self.current == Token::Comma) {
            self.advance()?;
            terms.push(self.parse_term()?);
        }
        Ok(combine(LogicalOperator::And, terms))
    }

    fn parse_term(&mut self) -> FilterResult<Node> {
        match self.current.clone() {
            Token::LeftParen => {
                self.advance()?;
                let node = self.parse_expr(true)?;
                self.expect(Token::RightParen)?;
                Ok(node)
            }
            Token::Word(word) => {
                self.advance()?;
                if self.current == Token::LeftParen {
                    self.parse_call(&word)
                } else {
                    self.parse_comparison(word)
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_comparison(&mut self, property: String) -> FilterResult<Node> {
        match self.current {
            Token::NotEquals => {
                self.advance()?;
                let value = self.take_value()?;
                Ok(Node::comparison(property, ComparisonOperator::Ne, value))
            }
            Token::Equals => {
                self.advance()?;
                let operator = match &self.current {
                    Token::Word(word) => Some(word.clone()),
                    _ => None,
                };
                if self.current == Token::LeftParen {
                    return Err(self.unexpected());
                }
                let first = self.take_value()?;

                match operator {
                    Some(name) if self.current == Token::Equals => {
                        self.advance()?;
                        self.operator_comparison(property, &name)
                    }
                    _ => Ok(Node::comparison(property, ComparisonOperator::Eq, first)),
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Tail of `prop=op=value`
    fn operator_comparison(&mut self, property: String, name: &str) -> FilterResult<Node> {
        if let Some(operator) = ComparisonOperator::from_name(name) {
            let value = self.take_value()?;
            return Ok(Node::comparison(property, operator, value));
        }
        if let Some(operator) = ListOperator::from_name(name) {
            let values = self.parse_list()?;
            return Ok(Node::Listing {
                operator,
                property,
                values,
            });
        }
        Err(FilterError::parsing(format!("unknown operator '{}'", name)))
    }

    fn parse_call(&mut self, name: &str) -> FilterResult<Node> {
        self.expect(Token::LeftParen)?;
        let lower = name.to_ascii_lowercase();

        let node = if let Some(operator) = LogicalOperator::from_name(&lower) {
            let mut children = vec![self.parse_expr(false)?];
            while self.current == Token::Comma {
                self.advance()?;
                children.push(self.parse_expr(false)?);
            }
            if operator == LogicalOperator::Not && children.len() != 1 {
                return Err(FilterError::parsing("not() takes exactly one argument"));
            }
            Node::logical(operator, children)
        } else if lower == RQL_ORDERING_OPERATOR {
            Node::Ordering {
                tokens: self.parse_props()?,
            }
        } else if lower == RQL_SELECT_OPERATOR {
            Node::Select {
                tokens: self.parse_props()?,
            }
        } else if let Some(operator) = ComparisonOperator::from_name(&lower) {
            let property = self.take_property()?;
            self.expect(Token::Comma)?;
            let value = self.take_value()?;
            Node::comparison(property, operator, value)
        } else if let Some(operator) = ListOperator::from_name(&lower) {
            let property = self.take_property()?;
            self.expect(Token::Comma)?;
            let values = self.parse_list()?;
            Node::Listing {
                operator,
                property,
                values,
            }
        } else {
            return Err(FilterError::parsing(format!("unknown function '{}'", name)));
        };

        self.expect(Token::RightParen)?;
        Ok(node)
    }

    fn parse_list(&mut self) -> FilterResult<Vec<String>> {
        if self.current != Token::LeftParen {
            return Ok(vec![self.take_value()?]);
        }
        self.advance()?;
        let mut values = vec![self.take_value()?];
        while self.current == Token::Comma {
            self.advance()?;
            values.push(self.take_value()?);
        }
        self.expect(Token::RightParen)?;
        Ok(values)
    }

    fn parse_props(&mut self) -> FilterResult<Vec<String>> {
        let mut props = Vec::new();
        if self.current == Token::RightParen {
            return Ok(props);
        }
        props.push(self.take_property()?);
        while self.current == Token::Comma {
            self.advance()?;
            props.push(self.take_property()?);
        }
        Ok(props)
    }

    fn take_property(&mut self) -> FilterResult<String> {
        match self.current.clone() {
            Token::Word(word) => {
                self.advance()?;
                Ok(word)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn take_value(&mut self) -> FilterResult<String> {
        match self.current.clone() {
            Token::Word(value) | Token::Quoted(value) => {
                self.advance()?;
                Ok(value)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn expect(&mut self, token: Token) -> FilterResult<()> {
        if self.current != token {
            return Err(FilterError::parsing(format!(
                "expected {} but found {} at position {}",
                token.describe(),
                self.current.describe(),
                self.current_pos
            )));
        }
        self.advance()
    }

    fn advance(&mut self) -> FilterResult<()> {
        let (token, pos) = self.lexer.next_token()?;
        self.current = token;
        self.current_pos = pos;
        Ok(())
    }

    fn unexpected(&self) -> FilterError {
        FilterError::parsing(format!(
            "unexpected {} at position {}",
            self.current.describe(),
            self.current_pos
        ))
    }
}

fn combine(operator: LogicalOperator, mut nodes: Vec<Node>) -> Node {
    if nodes.len() == 1 {
        if let Some(node) = nodes.pop() {
            return node;
        }
    }
    Node::logical(operator, nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Node {
        RqlParser::new(input).unwrap().parse().unwrap().unwrap()
    }

    fn parse_err(input: &str) -> FilterError {
        match RqlParser::new(input).and_then(|mut p| p.parse()) {
            Ok(node) => panic!("expected error, got {:?}", node),
            Err(err) => err,
        }
    }

    #[test]
    fn test_comparison_forms_agree() {
        let expected = Node::comparison("age", ComparisonOperator::Lt, "30");
        assert_eq!(parse("age=lt=30"), expected);
        assert_eq!(parse("lt(age,30)"), expected);
        assert_eq!(parse("age=30"), Node::comparison("age", ComparisonOperator::Eq, "30"));
        assert_eq!(parse("age!=30"), Node::comparison("age", ComparisonOperator::Ne, "30"));
    }

    #[test]
    fn test_value_equal_to_operator_name() {
        assert_eq!(parse("name=eq"), Node::comparison("name", ComparisonOperator::Eq, "eq"));
    }

    #[test]
    fn test_top_level_and_or() {
        let node = parse("a=1&b=2|c=3");
        match node {
            Node::Logical { operator, children } => {
                assert_eq!(operator, LogicalOperator::Or);
                assert_eq!(children.len(), 2);
                assert!(matches!(
                    &children[0],
                    Node::Logical { operator: LogicalOperator::And, .. }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(parse("a=1,b=2"), parse("a=1&b=2"));
    }

    #[test]
    fn test_logical_calls() {
        let node = parse("or(a=1,not(b=2))");
        let expected = Node::logical(
            LogicalOperator::Or,
            vec![
                Node::comparison("a", ComparisonOperator::Eq, "1"),
                Node::logical(
                    LogicalOperator::Not,
                    vec![Node::comparison("b", ComparisonOperator::Eq, "2")],
                ),
            ],
        );
        assert_eq!(node, expected);
    }

    #[test]
    fn test_grouping() {
        let node = parse("(a=1|b=2)&c=3");
        assert!(matches!(node, Node::Logical { operator: LogicalOperator::And, .. }));
    }

    #[test]
    fn test_list_operators() {
        let expected = Node::Listing {
            operator: ListOperator::In,
            property: "status".into(),
            values: vec!["a".into(), "'b c'".into()],
        };
        assert_eq!(parse("in(status,(a,'b c'))"), expected);
        assert_eq!(parse("status=in=(a,'b c')"), expected);
    }

    #[test]
    fn test_ordering_and_select() {
        assert_eq!(
            parse("ordering(-title,+id)"),
            Node::Ordering {
                tokens: vec!["-title".into(), "+id".into()]
            }
        );
        assert_eq!(
            parse("select(-author)"),
            Node::Select {
                tokens: vec!["-author".into()]
            }
        );
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(RqlParser::new("   ").unwrap().parse().unwrap(), None);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse_err("a=1)").code(), "RQL_PARSING_ERROR");
        assert!(parse_err("eq(a,1").to_string().contains("expected ')'"));
        assert!(parse_err("foo(a,1)").to_string().contains("unknown function"));
        assert!(parse_err("a=zz=1").to_string().contains("unknown operator"));
        assert!(parse_err("not(a=1,b=2)").to_string().contains("exactly one"));
        assert!(parse_err("a").to_string().contains("position 1"));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}id=1{}", "(".repeat(200_000), ")".repeat(200_000));
        let err = parse_err(&deep);
        assert_eq!(err.code(), "RQL_PARSING_ERROR");
        assert!(err.to_string().contains("nesting too deep"));

        let calls = format!("{}id=1{}", "not(".repeat(200_000), ")".repeat(200_000));
        assert!(parse_err(&calls).to_string().contains("nesting too deep"));

        let depth = RQL_MAX_NESTING - 1;
        let allowed = format!("{}id=1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&allowed), Node::comparison("id", ComparisonOperator::Eq, "1"));
    }
}
