//! Lexer for RQL query strings

use crate::constants::{RQL_EMPTY, RQL_NULL};
use crate::filter::{FilterError, FilterResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare word: property, operator keyword or unquoted value
    Word(String),
    /// Quoted literal, surrounding quotes kept
    Quoted(String),
    LeftParen,
    RightParen,
    Comma,
    Amp,
    Pipe,
    Equals,
    NotEquals,
    Eof,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Quoted(q) => q.clone(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Amp => "'&'".to_string(),
            Token::Pipe => "'|'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::NotEquals => "'!='".to_string(),
            Token::Eof => "end of query".to_string(),
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Returns the next token and the position it starts at.
    pub fn next_token(&mut self) -> FilterResult<(Token, usize)> {
        self.skip_whitespace();
        let start = self.position;

        let ch = match self.current_char() {
            Some(ch) => ch,
            None => return Ok((Token::Eof, start)),
        };

        let token = match ch {
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            ',' => self.single(Token::Comma),
            '&' => self.single(Token::Amp),
            '|' => self.single(Token::Pipe),
            '=' => self.single(Token::Equals),
            '!' if self.peek_char(1) == Some('=') => {
                self.position += 2;
                Token::NotEquals
            }
            '"' | '\'' => self.read_quoted(ch)?,
            _ => self.read_word()?,
        };
        Ok((token, start))
    }

    fn single(&mut self, token: Token) -> Token {
        self.position += 1;
        token
    }

    fn read_quoted(&mut self, quote: char) -> FilterResult<Token> {
        let start = self.position;
        let mut literal = String::new();
        literal.push(quote);
        self.position += 1;

        while let Some(ch) = self.current_char() {
            self.position += 1;
            literal.push(ch);
            if ch == quote {
                return Ok(Token::Quoted(literal));
            }
        }

        Err(FilterError::parsing(format!(
            "unterminated quoted value at position {}",
            start
        )))
    }

    fn read_word(&mut self) -> FilterResult<Token> {
        let start = self.position;
        let mut word = String::new();

        while let Some(ch) = self.current_char() {
            match ch {
                '\\' => {
                    // Escape keeps both characters; the pattern translator
                    // resolves them.
                    word.push(ch);
                    self.position += 1;
                    if let Some(next) = self.current_char() {
                        word.push(next);
                        self.position += 1;
                    }
                }
                '(' | ')' | ',' | '&' | '|' | '=' | '"' | '\'' => break,
                '!' if self.peek_char(1) == Some('=') => break,
                _ if ch.is_whitespace() => break,
                _ => {
                    word.push(ch);
                    self.position += 1;
                }
            }
        }

        if word.is_empty() {
            return Err(FilterError::parsing(format!(
                "unexpected character at position {}",
                start
            )));
        }

        // `null()` and `empty()` are single value tokens
        if (word == "null" || word == "empty")
            && self.current_char() == Some('(')
            && self.peek_char(1) == Some(')')
        {
            self.position += 2;
            word = if word == "null" {
                RQL_NULL.to_string()
            } else {
                RQL_EMPTY.to_string()
            };
        }

        Ok(Token::Word(word))
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some(ch) if ch.is_whitespace()) {
            self.position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let (token, _) = lexer.next_token().unwrap();
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_comparison_tokens() {
        assert_eq!(
            tokens("age=lt=30"),
            vec![
                Token::Word("age".into()),
                Token::Equals,
                Token::Word("lt".into()),
                Token::Equals,
                Token::Word("30".into()),
            ]
        );
    }

    #[test]
    fn test_sentinels_are_single_tokens() {
        assert_eq!(
            tokens("eq(deleted_at,null())"),
            vec![
                Token::Word("eq".into()),
                Token::LeftParen,
                Token::Word("deleted_at".into()),
                Token::Comma,
                Token::Word("null()".into()),
                Token::RightParen,
            ]
        );
        assert_eq!(tokens("name!=empty()")[2], Token::Word("empty()".into()));
    }

    #[test]
    fn test_quoted_values_keep_quotes() {
        assert_eq!(
            tokens("title='a, b (c)'")[2],
            Token::Quoted("'a, b (c)'".into())
        );
    }

    #[test]
    fn test_escapes_and_wildcards() {
        assert_eq!(tokens(r"name=like=*a\*b*")[4], Token::Word(r"*a\*b*".into()));
        assert_eq!(tokens("created=2020-01-01T10:00:00+03:00")[2],
            Token::Word("2020-01-01T10:00:00+03:00".into()));
    }

    #[test]
    fn test_unterminated_quote() {
        let mut lexer = Lexer::new("title=\"abc");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.code(), "RQL_PARSING_ERROR");
    }
}
