//! Query Parser
//!
//! Recursive-descent parser for the pipe-separated filter language.
//!
//! # Grammar
//!
//! ```text
//! query    ::= clause? ("|" clause?)*
//! clause   ::= STRING                                  full-text match
//!            | "filter" TOKEN
//!            | "group" TOKEN
//!            | "software" software
//!            | FIELD ["not"] comparison
//!
//! comparison ::= "in" "("? value ("," value)* ")"?
//!              | ("match" | "like" | "~") value        match
//!              | ("=" | "eq" | "is") value             exact
//!              | range_op NUMBER (range_op NUMBER)*    range
//!
//! software ::= ("=" | "eq" | "is" | "in" | "match" | "like" | "~") "("? (@LIST | entry ("," entry)*) ")"?
//! entry    ::= value (range_op value)*
//! range_op ::= "gt" | ">" | "gte" | ">=" | "lt" | "<" | "lte" | "<=" | "eq" | "=" | "=="
//! ```
//!
//! # Example
//!
//! ```rust
//! use vquery_parser::parser::{Parser, ParserConfig, Query};
//!
//! let config = ParserConfig::new(["severity", "description"]);
//! let queries = Parser::new("severity > 2 < 5 | description like \"Apple\"", &config)
//!     .parse()
//!     .unwrap();
//! assert_eq!(queries.len(), 2);
//! assert!(matches!(queries[0], Query::Range(_)));
//! ```

mod ast;
mod config;
mod cursor;
mod error;
mod keywords;
mod lexer;
mod token;

pub use ast::{
    Bounds, FilterQuery, GroupQuery, InQuery, Query, RangeOp, RangeQuery, Software,
    SoftwareQuery, ValueQuery, VersionConstraint,
};
pub use config::{ParserConfig, DEFAULT_FULL_TEXT_FIELD};
pub use cursor::Cursor;
pub use error::{ErrorKind, Fault, ParserError};
pub use lexer::{EscapeOptions, Lexer};
pub use token::{Token, TokenKind};

use keywords::{comparison, is_in, is_not, range_op, Comparison};
use tracing::debug;

/// Recursive-descent parser over a [`Lexer`]
pub struct Parser<'c> {
    lexer: Lexer,
    config: &'c ParserConfig,
}

impl<'c> Parser<'c> {
    pub fn new(input: &str, config: &'c ParserConfig) -> Self {
        Self {
            lexer: Lexer::new(input).tolerate_unclosed_strings(config.tolerate_unclosed_strings),
            config,
        }
    }

    /// Parse every clause, failing on the first fault
    pub fn parse(mut self) -> Result<Vec<Query>, ParserError> {
        let result = self.parse_clauses();
        result.map_err(|fault| self.diagnose(fault))
    }

    /// Attach a column and excerpt to a fault. Faults without an explicit
    /// column point at the lookahead token, or at the raw cursor when there is none.
    fn diagnose(&self, fault: Fault) -> ParserError {
        let column = fault
            .column
            .or_else(|| self.lexer.current().map(|t| t.pos))
            .unwrap_or_else(|| self.lexer.cursor().position());

        debug!(code = fault.kind.code(), column, "query rejected");
        ParserError::new(fault.kind, column, self.lexer.cursor())
    }

    fn parse_clauses(&mut self) -> Result<Vec<Query>, Fault> {
        let mut queries = Vec::new();

        while !self.lexer.eof()? {
            if let Some(query) = self.parse_clause()? {
                debug!(tag = query.tag(), field = query.field(), "parsed clause");
                queries.push(query);
            }
        }

        debug!(clauses = queries.len(), "parsed query");
        Ok(queries)
    }

    fn parse_clause(&mut self) -> Result<Option<Query>, Fault> {
        self.skip_while(TokenKind::Pipe)?;

        let Some(token) = self.lexer.peek()?.cloned() else {
            return Ok(None);
        };

        match token.kind {
            TokenKind::Ident => self.read_query(),
            TokenKind::String => {
                self.next()?;
                Ok(Some(Query::Match(ValueQuery::new(
                    &self.config.full_text_field,
                    token.value,
                ))))
            }
            kind => Err(Fault::at(
                ErrorKind::UnexpectedToken {
                    kind: kind.to_string(),
                    value: token.value,
                },
                token.pos,
            )),
        }
    }

    fn read_query(&mut self) -> Result<Option<Query>, Fault> {
        let Some(field) = self.next()? else {
            return Ok(None);
        };

        match field.value.as_str() {
            "filter" => return self.read_filter(),
            "group" => return self.read_group(),
            "software" => return self.read_software_query().map(Some),
            _ => {}
        }

        if !self.config.is_valid_field(&field.value) {
            return Err(Fault::at(
                ErrorKind::InvalidField { field: field.value },
                field.pos,
            ));
        }

        let negated = self.read_negated()?;
        let keyword = match self.next()? {
            Some(t) if matches!(t.kind, TokenKind::Ident | TokenKind::Operator) => t,
            other => {
                return Err(fault_near(
                    ErrorKind::InvalidOperator {
                        operator: other.as_ref().map(|t| t.value.clone()),
                    },
                    other.as_ref(),
                ))
            }
        };

        if is_in(&keyword.value) {
            return self
                .read_in(field.value, negated)
                .map(|q| Some(Query::In(q)));
        }

        match comparison(&keyword.value) {
            Some(Comparison::Match) => {
                return self.read_value(field.value).map(|v| Some(Query::Match(v)));
            }
            Some(Comparison::Equal) => {
                return self.read_value(field.value).map(|v| Some(Query::Exact(v)));
            }
            None => {}
        }

        match range_op(&keyword.value) {
            Some(op) => self
                .read_range(field.value, op)
                .map(|q| Some(Query::Range(q))),
            None => Err(Fault::at(
                ErrorKind::InvalidOperator {
                    operator: Some(keyword.value),
                },
                keyword.pos,
            )),
        }
    }

    /// Filter and group take their operand verbatim; a missing operand yields no clause.
    fn read_filter(&mut self) -> Result<Option<Query>, Fault> {
        Ok(self
            .next()?
            .map(|t| Query::Filter(FilterQuery { filter: t.value })))
    }

    fn read_group(&mut self) -> Result<Option<Query>, Fault> {
        Ok(self
            .next()?
            .map(|t| Query::Group(GroupQuery { field: t.value })))
    }

    fn read_negated(&mut self) -> Result<bool, Fault> {
        let negated = matches!(
            self.lexer.peek()?,
            Some(t) if t.is(TokenKind::Ident) && is_not(&t.value)
        );
        if negated {
            self.next()?;
        }
        Ok(negated)
    }

    fn read_in(&mut self, field: String, negated: bool) -> Result<InQuery, Fault> {
        let mut query = Vec::new();
        let mut has_open_paren = false;

        while !self.at_list_end()? {
            self.skip_while(TokenKind::Comma)?;
            match self.next()? {
                Some(t) if t.is(TokenKind::OpenParen) => has_open_paren = true,
                Some(t) if t.is_text() => query.push(t.value),
                _ => {}
            }
        }

        self.read_close_paren(has_open_paren)?;

        Ok(InQuery {
            field,
            query,
            negated,
        })
    }

    fn read_range(&mut self, field: String, op: RangeOp) -> Result<RangeQuery, Fault> {
        let mut bounds = Bounds::new();

        let value = self.next()?;
        bounds.insert(op, read_number(&field, value)?);

        while !self.at_clause_end()? {
            let Some(token) = self.next()? else {
                break;
            };

            let op = if token.is_text() || token.is(TokenKind::Operator) {
                range_op(&token.value)
            } else {
                None
            };

            // Words that are not operators are skipped
            if let Some(op) = op {
                let value = self.next()?;
                bounds.insert(op, read_number(&field, value)?);
            }
        }

        Ok(RangeQuery {
            field,
            query: bounds,
        })
    }

    fn read_value(&mut self, field: String) -> Result<ValueQuery, Fault> {
        match self.next()? {
            Some(t) if t.is_text() => Ok(ValueQuery { field, query: t.value }),
            other => Err(fault_near(
                ErrorKind::UnexpectedValue { field },
                other.as_ref(),
            )),
        }
    }

    fn read_software_query(&mut self) -> Result<Query, Fault> {
        let keyword = match self.next()? {
            Some(t) if t.is_text() || t.is(TokenKind::Operator) => t,
            other => {
                return Err(fault_near(
                    ErrorKind::UnexpectedOperator { operator: None },
                    other.as_ref(),
                ))
            }
        };

        let Some(kind) = comparison(&keyword.value) else {
            return Err(Fault::at(
                ErrorKind::UnexpectedOperator {
                    operator: Some(keyword.value),
                },
                keyword.pos,
            ));
        };
        let fuzzy = kind == Comparison::Match;

        let has_open_paren = self.peek_is(TokenKind::OpenParen)?;
        if has_open_paren {
            self.next()?;
        }

        let token = match self.lexer.peek()? {
            Some(t) if t.is_text() => t.clone(),
            _ => return Err(Fault::new(ErrorKind::ExpectedSoftwareQuery)),
        };

        if token.is(TokenKind::Ident) && token.value.starts_with('@') {
            self.next()?;
            self.read_close_paren(has_open_paren)?;
            return Ok(Query::Software(SoftwareQuery {
                software: Vec::new(),
                software_list: Some(token.value),
                fuzzy,
            }));
        }

        let software = self.read_software_in()?;
        self.read_close_paren(has_open_paren)?;

        Ok(Query::Software(SoftwareQuery {
            software,
            software_list: None,
            fuzzy,
        }))
    }

    fn read_software_in(&mut self) -> Result<Vec<Software>, Fault> {
        let mut software = Vec::new();

        while !self.at_list_end()? {
            self.skip_while(TokenKind::Comma)?;
            software.push(self.read_software_entry()?);
        }

        Ok(software)
    }

    fn read_software_entry(&mut self) -> Result<Software, Fault> {
        let name = match self.next()? {
            Some(t) if t.is_text() => t.value,
            other => {
                return Err(fault_near(
                    ErrorKind::ExpectedSoftwareName,
                    other.as_ref(),
                ))
            }
        };

        let mut software = Software::new(name);
        if !self.at_separator()? {
            software.version = self.read_software_version()?;
        }
        Ok(software)
    }

    /// `(operator, version)` pairs up to the next separator
    fn read_software_version(&mut self) -> Result<Vec<VersionConstraint>, Fault> {
        let mut versions = Vec::new();

        while !self.at_separator()? {
            let Some(op_token) = self.next()? else {
                break;
            };

            let value = match self.next()? {
                Some(t) if t.is_text() => t.value,
                other => return Err(fault_near(ErrorKind::ExpectedVersion, other.as_ref())),
            };

            let Some(op) = range_op(&op_token.value) else {
                return Err(Fault::at(
                    ErrorKind::InvalidVersionOperator {
                        operator: op_token.value,
                    },
                    op_token.pos,
                ));
            };

            versions.push(VersionConstraint { op, value });
        }

        Ok(versions)
    }

    fn read_close_paren(&mut self, required: bool) -> Result<(), Fault> {
        if self.peek_is(TokenKind::CloseParen)? {
            self.next()?;
            Ok(())
        } else if required {
            Err(Fault::new(ErrorKind::ExpectedClosingParen))
        } else {
            Ok(())
        }
    }

    fn next(&mut self) -> Result<Option<Token>, Fault> {
        self.lexer.next_token()
    }

    fn peek_kind(&mut self) -> Result<Option<TokenKind>, Fault> {
        Ok(self.lexer.peek()?.map(|t| t.kind))
    }

    fn peek_is(&mut self, kind: TokenKind) -> Result<bool, Fault> {
        Ok(self.peek_kind()? == Some(kind))
    }

    fn skip_while(&mut self, kind: TokenKind) -> Result<(), Fault> {
        while self.peek_is(kind)? {
            self.next()?;
        }
        Ok(())
    }

    /// End of input or `|`
    fn at_clause_end(&mut self) -> Result<bool, Fault> {
        Ok(matches!(self.peek_kind()?, None | Some(TokenKind::Pipe)))
    }

    /// End of input, `|` or `)`
    fn at_list_end(&mut self) -> Result<bool, Fault> {
        Ok(matches!(
            self.peek_kind()?,
            None | Some(TokenKind::Pipe) | Some(TokenKind::CloseParen)
        ))
    }

    /// End of input, `|`, `,` or `)`
    fn at_separator(&mut self) -> Result<bool, Fault> {
        Ok(self.peek_kind()?.is_none_or(|kind| kind.is_separator()))
    }
}

/// Fault at `token`, or at the default column when the token is missing
fn fault_near(kind: ErrorKind, token: Option<&Token>) -> Fault {
    Fault {
        kind,
        column: token.map(|t| t.pos),
    }
}

fn read_number(field: &str, token: Option<Token>) -> Result<f64, Fault> {
    match token {
        Some(t) if t.is(TokenKind::Ident) => parse_number(&t.value).ok_or_else(|| {
            Fault::at(
                ErrorKind::NotANumber {
                    field: field.to_string(),
                    value: t.value.clone(),
                },
                t.pos,
            )
        }),
        other => Err(fault_near(
            ErrorKind::ExpectedNumber {
                field: field.to_string(),
            },
            other.as_ref(),
        )),
    }
}

/// Finite decimal numbers only; `inf`, `Infinity` and `NaN` are rejected
/// on purpose, unlike JavaScript's `Number()`
fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}
