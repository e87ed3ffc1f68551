//! Keyword and operator tables
//!
//! Uses compile-time perfect hashing (phf) for O(1) lookup. All lookups are
//! case-insensitive.

use phf::phf_map;

use super::ast::RangeOp;

/// How a single-value comparison keyword treats its operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Substring/approximate match (`match`, `like`, `~`)
    Match,
    /// Exact equality (`=`, `eq`, `is`, `in`)
    Equal,
}

static RANGE_OPS: phf::Map<&'static str, RangeOp> = phf_map! {
    "gt" => RangeOp::Gt,
    ">" => RangeOp::Gt,
    "gte" => RangeOp::Gte,
    ">=" => RangeOp::Gte,
    "lt" => RangeOp::Lt,
    "<" => RangeOp::Lt,
    "lte" => RangeOp::Lte,
    "<=" => RangeOp::Lte,
    "eq" => RangeOp::Eq,
    "=" => RangeOp::Eq,
    "==" => RangeOp::Eq,
};

static COMPARISONS: phf::Map<&'static str, Comparison> = phf_map! {
    "match" => Comparison::Match,
    "like" => Comparison::Match,
    "~" => Comparison::Match,

    "=" => Comparison::Equal,
    "eq" => Comparison::Equal,
    "is" => Comparison::Equal,
    "in" => Comparison::Equal,
};

/// Resolve a word to a range/version operator
#[inline]
pub fn range_op(word: &str) -> Option<RangeOp> {
    let lower = word.to_ascii_lowercase();
    RANGE_OPS.get(lower.as_str()).copied()
}

/// Classify a single-value comparison keyword
#[inline]
pub fn comparison(word: &str) -> Option<Comparison> {
    let lower = word.to_ascii_lowercase();
    COMPARISONS.get(lower.as_str()).copied()
}

#[inline]
pub fn is_in(word: &str) -> bool {
    word.eq_ignore_ascii_case("in")
}

#[inline]
pub fn is_not(word: &str) -> bool {
    word.eq_ignore_ascii_case("not")
}

/// Single-character comparison symbols that never join an identifier run
#[inline]
pub fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '>' | '<' | '~')
}
