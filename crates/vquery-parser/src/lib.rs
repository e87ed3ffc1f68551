//! vquery parser
//!
//! Turns a compact, human-typed filter query into a typed AST for a
//! downstream query builder.
//!
//! ```text
//! severity > 2 < 5 | tags not in ("a", "b") | software in ("Adobe Acrobat" gt 1.3)
//! ```
//!
//! Clauses are separated by `|` and come back in source order. Field names are
//! checked against a caller-supplied set; `filter`, `group` and `software` are
//! reserved words that bypass the check.
//!
//! # Example
//!
//! ```rust
//! use vquery_parser::{parse, Query};
//!
//! let queries = parse("id = CVE-2020-123 | severity > 4", ["id", "severity"]).unwrap();
//! assert_eq!(queries.len(), 2);
//! assert_eq!(queries[0].tag(), "exact");
//!
//! let err = parse("severity >", ["severity"]).unwrap_err();
//! assert_eq!(err.column_number, 10);
//! ```

pub mod parser;

// Re-export main types at crate root
pub use parser::{
    ErrorKind, Lexer, Parser, ParserConfig, ParserError, Query, RangeOp, Token, TokenKind,
};

/// Parse `query`, accepting only the given field names
pub fn parse<I, S>(query: &str, valid_fields: I) -> Result<Vec<Query>, ParserError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let config = ParserConfig::new(valid_fields);
    Parser::new(query, &config).parse()
}
