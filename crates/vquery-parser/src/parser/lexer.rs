//! Lexer for the query language
//!
//! Pulls tokens lazily from a [`Cursor`] with exactly one token of lookahead.
//!
//! # Token rules
//!
//! - `|`, `(`, `)` and `,` are single-character structural tokens
//! - `"..."` is a string literal; `\` escapes the next character
//! - `=`, `==`, `>`, `>=`, `<`, `<=` and `~` are always operator tokens, even
//!   when glued to a word (`=1.2>3` lexes as `=`, `1.2`, `>`, `3`)
//! - anything else up to whitespace, a structural character or an operator
//!   symbol is an identifier
//!
//! # Example
//!
//! ```rust
//! use vquery_parser::parser::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("severity > 2").collect::<Result<_, _>>().unwrap();
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[1].kind, TokenKind::Operator);
//! ```

use tracing::trace;

use super::cursor::Cursor;
use super::error::{ErrorKind, Fault};
use super::keywords::is_operator_char;
use super::token::{Token, TokenKind};

const QUOTE: char = '"';
const ESCAPE: char = '\\';

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_structural(c: char) -> bool {
    matches!(c, '|' | '(' | ')' | ',')
}

fn is_ident_char(c: char) -> bool {
    !is_whitespace(c) && !is_structural(c) && !is_operator_char(c) && !c.is_control()
}

/// Options for reading the body of a quoted string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeOptions {
    /// Keep the backslash in front of escaped characters
    pub keep_escape: bool,
    /// Fail with `UnclosedString` when input ends before the closing quote
    pub expect_closing_quote: bool,
}

impl Default for EscapeOptions {
    fn default() -> Self {
        Self {
            keep_escape: false,
            expect_closing_quote: true,
        }
    }
}

/// Pull-based tokenizer owning its cursor
#[derive(Debug, Clone)]
pub struct Lexer {
    cursor: Cursor,
    /// Lookahead slot, filled by `peek` and emptied by `next_token`
    current: Option<Token>,
    string_options: EscapeOptions,
    /// Set once iteration has hit a fault, so `Iterator` stops
    failed: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::from_cursor(Cursor::new(input))
    }

    pub fn from_cursor(cursor: Cursor) -> Self {
        Self {
            cursor,
            current: None,
            string_options: EscapeOptions::default(),
            failed: false,
        }
    }

    /// Accept string literals that run to the end of input without a closing quote
    pub fn tolerate_unclosed_strings(mut self, tolerate: bool) -> Self {
        self.string_options.expect_closing_quote = !tolerate;
        self
    }

    /// The underlying character cursor
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The token sitting in the lookahead slot, without lexing a new one
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Look at the next token without consuming it
    pub fn peek(&mut self) -> Result<Option<&Token>, Fault> {
        if self.current.is_none() {
            self.current = self.read_next()?;
        }
        Ok(self.current.as_ref())
    }

    /// Consume the next token
    pub fn next_token(&mut self) -> Result<Option<Token>, Fault> {
        match self.current.take() {
            Some(token) => Ok(Some(token)),
            None => self.read_next(),
        }
    }

    pub fn eof(&mut self) -> Result<bool, Fault> {
        Ok(self.peek()?.is_none())
    }

    /// Read the body of a string literal; the opening quote is already consumed
    pub fn read_escaped_string(&mut self, options: EscapeOptions) -> Result<String, Fault> {
        let mut s = String::new();
        let mut escaped = false;
        let mut closed = false;

        while let Some(c) = self.cursor.next() {
            if escaped {
                if options.keep_escape {
                    s.push(ESCAPE);
                }
                s.push(c);
                escaped = false;
            } else if c == ESCAPE {
                escaped = true;
            } else if c == QUOTE {
                closed = true;
                break;
            } else {
                s.push(c);
            }
        }

        if !closed && options.expect_closing_quote {
            return Err(Fault::new(ErrorKind::UnclosedString));
        }

        Ok(s)
    }

    fn read_next(&mut self) -> Result<Option<Token>, Fault> {
        self.cursor.read_while(is_whitespace);

        let Some(c) = self.cursor.peek() else {
            return Ok(None);
        };
        let pos = self.cursor.position();

        let token = match c {
            '|' => self.read_single(TokenKind::Pipe),
            '(' => self.read_single(TokenKind::OpenParen),
            ')' => self.read_single(TokenKind::CloseParen),
            ',' => self.read_single(TokenKind::Comma),
            QUOTE => {
                self.cursor.next();
                let pos = self.cursor.position();
                let value = self.read_escaped_string(self.string_options)?;
                Token::new(TokenKind::String, value, pos)
            }
            _ if is_operator_char(c) => self.read_operator(),
            _ if c.is_control() => {
                return Err(Fault::at(
                    ErrorKind::UnlexableCharacter {
                        character: c,
                        position: pos,
                    },
                    pos,
                ));
            }
            _ => Token::new(TokenKind::Ident, self.cursor.read_while(is_ident_char), pos),
        };

        trace!(kind = %token.kind, value = %token.value, pos = token.pos, "lexed token");
        Ok(Some(token))
    }

    fn read_single(&mut self, kind: TokenKind) -> Token {
        let pos = self.cursor.position();
        let value = self.cursor.next().map(String::from).unwrap_or_default();
        Token::new(kind, value, pos)
    }

    /// `>=`, `<=` and `==` are one token; every other operator is one character
    fn read_operator(&mut self) -> Token {
        let pos = self.cursor.position();
        let mut value = String::with_capacity(2);

        if let Some(first) = self.cursor.next() {
            value.push(first);
            if matches!(first, '>' | '<' | '=') && self.cursor.peek() == Some('=') {
                self.cursor.next();
                value.push('=');
            }
        }

        Token::new(TokenKind::Operator, value, pos)
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, Fault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = self.next_token().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}
