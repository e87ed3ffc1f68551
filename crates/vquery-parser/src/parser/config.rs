//! Parser configuration

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Field used by bare string clauses (`"CVE-2020-123"`)
pub const DEFAULT_FULL_TEXT_FIELD: &str = "aggregate";

/// Caller-supplied parser settings
///
/// ```rust
/// use vquery_parser::ParserConfig;
///
/// let config = ParserConfig::from_json(r#"{"fields": ["severity", "tags"]}"#).unwrap();
/// assert!(config.is_valid_field("severity"));
/// assert_eq!(config.full_text_field, "aggregate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Field names accepted on the left of a comparison (case-sensitive)
    pub fields: BTreeSet<String>,
    pub full_text_field: String,
    /// Accept a string literal left open at the end of input
    pub tolerate_unclosed_strings: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            fields: BTreeSet::new(),
            full_text_field: DEFAULT_FULL_TEXT_FIELD.to_string(),
            tolerate_unclosed_strings: false,
        }
    }
}

impl ParserConfig {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_full_text_field(mut self, field: impl Into<String>) -> Self {
        self.full_text_field = field.into();
        self
    }

    pub fn with_unclosed_strings(mut self, tolerate: bool) -> Self {
        self.tolerate_unclosed_strings = tolerate;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_valid_field(&self, field: &str) -> bool {
        self.fields.contains(field)
    }
}
