//! Token types for the query lexer

use std::fmt;

use serde::Serialize;

/// Token kinds in the query language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// `|` - clause separator
    Pipe,
    OpenParen,
    CloseParen,
    Comma,
    /// Double-quoted string literal, escapes already resolved
    String,
    /// Bare word: field names, keywords, numbers, versions
    Ident,
    /// Comparison symbol: `=`, `==`, `>`, `>=`, `<`, `<=`, `~`
    Operator,
}

impl TokenKind {
    /// Strings and bare words both carry user text
    pub fn is_text(&self) -> bool {
        matches!(self, TokenKind::String | TokenKind::Ident)
    }

    /// Tokens that end a list entry
    pub fn is_separator(&self) -> bool {
        matches!(
            self,
            TokenKind::Pipe | TokenKind::Comma | TokenKind::CloseParen
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Pipe => write!(f, "pipe"),
            TokenKind::OpenParen => write!(f, "openParen"),
            TokenKind::CloseParen => write!(f, "closeParen"),
            TokenKind::Comma => write!(f, "comma"),
            TokenKind::String => write!(f, "string"),
            TokenKind::Ident => write!(f, "ident"),
            TokenKind::Operator => write!(f, "operator"),
        }
    }
}

/// A token with position information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Character offset of the first character of the token
    pub pos: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, pos: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            pos,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_text(&self) -> bool {
        self.kind.is_text()
    }

    pub fn is_separator(&self) -> bool {
        self.kind.is_separator()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.value)
    }
}
