//! Parse faults and rendered diagnostics

use serde::{Serialize, Serializer};
use thiserror::Error;

use super::cursor::Cursor;

/// Characters of context shown on each side of the column in an excerpt
const EXCERPT_RADIUS: usize = 20;

/// Every way a parse can fail. The Display string is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Unable to parse query character: {character:?} at {position}")]
    UnlexableCharacter { character: char, position: usize },

    #[error("Unclosed string")]
    UnclosedString,

    #[error("Invalid field '{field}'")]
    InvalidField { field: String },

    #[error("Invalid operator{}", quoted(.operator))]
    InvalidOperator { operator: Option<String> },

    #[error("Unexpected operator{}", quoted(.operator))]
    UnexpectedOperator { operator: Option<String> },

    #[error("Expected a number for field '{field}'")]
    ExpectedNumber { field: String },

    #[error("Not a number '{value}' for field '{field}'")]
    NotANumber { field: String, value: String },

    #[error("Unexpected value for field '{field}'")]
    UnexpectedValue { field: String },

    #[error("Expected software name")]
    ExpectedSoftwareName,

    #[error("Expected software query")]
    ExpectedSoftwareQuery,

    #[error("Expected version")]
    ExpectedVersion,

    #[error("Invalid version operator '{operator}'")]
    InvalidVersionOperator { operator: String },

    #[error("Expected closing parenthesis")]
    ExpectedClosingParen,

    #[error("Unexpected token: {kind} {value}")]
    UnexpectedToken { kind: String, value: String },
}

fn quoted(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(|v| format!(" '{v}'"))
        .unwrap_or_default()
}

impl ErrorKind {
    /// Stable identifier for the fault, independent of the message text
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnlexableCharacter { .. } => "UnlexableCharacter",
            ErrorKind::UnclosedString => "UnclosedString",
            ErrorKind::InvalidField { .. } => "InvalidField",
            ErrorKind::InvalidOperator { .. } => "InvalidOperator",
            ErrorKind::UnexpectedOperator { .. } => "UnexpectedOperator",
            ErrorKind::ExpectedNumber { .. } => "ExpectedNumber",
            ErrorKind::NotANumber { .. } => "NotANumber",
            ErrorKind::UnexpectedValue { .. } => "UnexpectedValue",
            ErrorKind::ExpectedSoftwareName => "ExpectedSoftwareName",
            ErrorKind::ExpectedSoftwareQuery => "ExpectedSoftwareQuery",
            ErrorKind::ExpectedVersion => "ExpectedVersion",
            ErrorKind::InvalidVersionOperator { .. } => "InvalidVersionOperator",
            ErrorKind::ExpectedClosingParen => "ExpectedClosingParen",
            ErrorKind::UnexpectedToken { .. } => "UnexpectedToken",
        }
    }

    /// Lexical faults come from the tokenizer rather than the grammar
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnlexableCharacter { .. } | ErrorKind::UnclosedString
        )
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A fault raised while lexing or parsing, before it is attached to the source.
///
/// `column` is set when the raise site knows which token is at fault; otherwise
/// it is resolved from the parser's lookahead when the fault becomes a
/// [`ParserError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct Fault {
    pub kind: ErrorKind,
    pub column: Option<usize>,
}

impl Fault {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, column: None }
    }

    pub fn at(kind: ErrorKind, column: usize) -> Self {
        Self {
            kind,
            column: Some(column),
        }
    }
}

impl From<ErrorKind> for Fault {
    fn from(kind: ErrorKind) -> Self {
        Fault::new(kind)
    }
}

/// Diagnostic returned to callers: message, column and a two-line excerpt
/// with a caret under the offending character.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ParserError {
    #[serde(rename = "code")]
    pub kind: ErrorKind,
    pub message: String,
    pub column_number: usize,
    pub example: String,
}

impl ParserError {
    pub fn new(kind: ErrorKind, column_number: usize, source: &Cursor) -> Self {
        Self {
            message: kind.to_string(),
            example: excerpt(source, column_number),
            kind,
            column_number,
        }
    }

    /// Message followed by the excerpt, for terminal output
    pub fn render(&self) -> String {
        format!("{}\n{}", self.message, self.example)
    }
}

/// Source window of ±20 characters around `column`, with a caret line beneath.
pub fn excerpt(source: &Cursor, column: usize) -> String {
    let start = column.saturating_sub(EXCERPT_RADIUS);
    let end = (column + EXCERPT_RADIUS).min(source.len());
    let offset = column - start;

    format!("{}\n{}^", source.slice(start, end), " ".repeat(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ErrorKind::UnclosedString.to_string(), "Unclosed string");
        assert_eq!(
            ErrorKind::InvalidField {
                field: "thing".into()
            }
            .to_string(),
            "Invalid field 'thing'"
        );
        assert_eq!(
            ErrorKind::UnexpectedOperator { operator: None }.to_string(),
            "Unexpected operator"
        );
        assert_eq!(
            ErrorKind::UnexpectedOperator {
                operator: Some("%".into())
            }
            .to_string(),
            "Unexpected operator '%'"
        );
        assert_eq!(
            ErrorKind::UnlexableCharacter {
                character: '\u{7}',
                position: 3
            }
            .to_string(),
            "Unable to parse query character: '\\u{7}' at 3"
        );
    }

    #[test]
    fn test_excerpt_short_input() {
        let source = Cursor::new("severity >");
        assert_eq!(excerpt(&source, 10), "severity >\n          ^");
    }

    #[test]
    fn test_excerpt_window() {
        let source =
            Cursor::new("description in \"this is a very long description\" | software in |");
        let rendered = excerpt(&source, 63);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "tion\" | software in |");
        assert_eq!(lines[1], format!("{}^", " ".repeat(20)));
    }

    #[test]
    fn test_parser_error_fields() {
        let source = Cursor::new("thing");
        let err = ParserError::new(
            ErrorKind::InvalidField {
                field: "thing".into(),
            },
            0,
            &source,
        );
        assert_eq!(err.column_number, 0);
        assert_eq!(err.example, "thing\n^");
        assert_eq!(err.to_string(), "Invalid field 'thing'");
        assert_eq!(err.render(), "Invalid field 'thing'\nthing\n^");
    }

    #[test]
    fn test_parser_error_serializes_with_code() {
        let source = Cursor::new("a");
        let err = ParserError::new(ErrorKind::ExpectedVersion, 1, &source);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "code": "ExpectedVersion",
                "message": "Expected version",
                "columnNumber": 1,
                "example": "a\n ^",
            })
        );
    }
}
