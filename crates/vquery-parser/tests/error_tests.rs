//! Diagnostic tests: message, column and rendered excerpt

use vquery_parser::{parse, ErrorKind, ParserError};

const FIELDS: [&str; 7] = [
    "software",
    "softwareList",
    "severity",
    "description",
    "collectors",
    "id",
    "tags",
];

fn fail(query: &str) -> ParserError {
    match parse(query, FIELDS) {
        Ok(queries) => panic!("expected {query:?} to fail, got {queries:?}"),
        Err(err) => err,
    }
}

/// Caret line for a column inside a short input
fn caret(column: usize) -> String {
    format!("{}^", " ".repeat(column))
}

#[test]
fn test_invalid_field() {
    let err = fail("thing");
    assert_eq!(err.message, "Invalid field 'thing'");
    assert_eq!(err.column_number, 0);
    assert_eq!(err.example, "thing\n^");
}

#[test]
fn test_missing_number() {
    let err = fail("severity >");
    assert_eq!(err.message, "Expected a number for field 'severity'");
    assert_eq!(err.column_number, 10);
    assert_eq!(err.example, format!("severity >\n{}", caret(10)));
}

#[test]
fn test_string_where_number_expected() {
    let err = fail(r#"severity > "test""#);
    assert!(matches!(err.kind, ErrorKind::ExpectedNumber { .. }));
    assert_eq!(err.column_number, 12);
}

#[test]
fn test_not_a_number() {
    let err = fail("severity > x");
    assert_eq!(err.message, "Not a number 'x' for field 'severity'");
    assert_eq!(err.column_number, 11);
    assert_eq!(err.example, format!("severity > x\n{}", caret(11)));
}

#[test]
fn test_unexpected_value() {
    let err = fail("description ~");
    assert_eq!(err.message, "Unexpected value for field 'description'");
    assert_eq!(err.column_number, 13);
}

#[test]
fn test_invalid_operator() {
    let err = fail(r#"description # "test""#);
    assert_eq!(err.message, "Invalid operator '#'");
    assert_eq!(err.column_number, 12);
}

#[test]
fn test_expected_version() {
    let err = fail("software in x = , y > 2");
    assert_eq!(err.message, "Expected version");
    assert_eq!(err.column_number, 16);
    assert_eq!(err.example, format!("software in x = , y > 2\n{}", caret(16)));
}

#[test]
fn test_invalid_version_operator() {
    let err = fail("software in x % 2, y > 2");
    assert_eq!(err.message, "Invalid version operator '%'");
    assert_eq!(err.column_number, 14);
}

#[test]
fn test_expected_software_query() {
    let err = fail("software in |");
    assert_eq!(err.message, "Expected software query");
    assert_eq!(err.column_number, 12);
}

#[test]
fn test_expected_software_query_in_long_input() {
    let err = fail(r#"description in "this is a very long description" | software in |"#);
    assert_eq!(err.kind, ErrorKind::ExpectedSoftwareQuery);
    assert_eq!(err.column_number, 63);
    assert_eq!(err.example, format!("tion\" | software in |\n{}", caret(20)));
}

#[test]
fn test_unclosed_string() {
    let err = fail(r#"collectors in (a, ")"#);
    assert_eq!(err.message, "Unclosed string");
    assert_eq!(err.column_number, 20);
    assert_eq!(err.example, format!("collectors in (a, \")\n{}", caret(20)));
}

#[test]
fn test_missing_closing_paren() {
    let err = fail("collectors in (a, b");
    assert_eq!(err.message, "Expected closing parenthesis");
    assert_eq!(err.column_number, 19);

    let err = fail("software in (x = 1, y > 2");
    assert_eq!(err.kind, ErrorKind::ExpectedClosingParen);
    assert_eq!(err.column_number, 25);
}

#[test]
fn test_excerpt_window_is_centered() {
    let query = "severity > 1 | severity > 2 | severity > 3 | severity > oops | id = x";
    let err = fail(query);
    assert_eq!(err.column_number, 56);
    let lines: Vec<_> = err.example.lines().collect();
    assert_eq!(lines[0], &query[36..76.min(query.len())]);
    assert_eq!(lines[1], caret(20));
}

#[test]
fn test_render() {
    let err = fail("thing");
    assert_eq!(err.render(), "Invalid field 'thing'\nthing\n^");
}
