//! AST types for parsed queries
//!
//! Every node serializes as `{"type": <tag>, "value": <payload>}`, which is the
//! shape downstream query builders consume.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Comparison operator used by range bounds and software version constraints
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
}

impl RangeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeOp::Gt => "gt",
            RangeOp::Gte => "gte",
            RangeOp::Lt => "lt",
            RangeOp::Lte => "lte",
            RangeOp::Eq => "eq",
        }
    }
}

impl fmt::Display for RangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator → bound map of a range clause. Re-assigning an operator keeps the last value.
pub type Bounds = BTreeMap<RangeOp, f64>;

/// One parsed clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Query {
    Software(SoftwareQuery),
    In(InQuery),
    Range(RangeQuery),
    Match(ValueQuery),
    Exact(ValueQuery),
    Filter(FilterQuery),
    Group(GroupQuery),
}

impl Query {
    /// The wire tag of this node
    pub fn tag(&self) -> &'static str {
        match self {
            Query::Software(_) => "software",
            Query::In(_) => "in",
            Query::Range(_) => "range",
            Query::Match(_) => "match",
            Query::Exact(_) => "exact",
            Query::Filter(_) => "filter",
            Query::Group(_) => "group",
        }
    }

    /// The field this clause targets, if it targets one
    pub fn field(&self) -> Option<&str> {
        match self {
            Query::In(q) => Some(&q.field),
            Query::Range(q) => Some(&q.field),
            Query::Match(q) | Query::Exact(q) => Some(&q.field),
            Query::Group(q) => Some(&q.field),
            Query::Software(_) | Query::Filter(_) => None,
        }
    }
}

/// `software in ("Adobe Acrobat" gt 1.3)` or `software = @list`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareQuery {
    pub software: Vec<Software>,
    /// Opaque `@name` reference resolved by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_list: Option<String>,
    #[serde(default)]
    pub fuzzy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    pub name: String,
    pub version: Vec<VersionConstraint>,
}

impl Software {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Vec::new(),
        }
    }

    pub fn with_version(mut self, op: RangeOp, value: impl Into<String>) -> Self {
        self.version.push(VersionConstraint {
            op,
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionConstraint {
    pub op: RangeOp,
    pub value: String,
}

/// `tags in ("a", "b")` / `tags not in ("a", "b")`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InQuery {
    pub field: String,
    pub query: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
}

/// `severity > 2 < 5`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeQuery {
    pub field: String,
    #[serde(serialize_with = "serialize_bounds")]
    pub query: Bounds,
}

/// Payload shared by `match` and `exact` clauses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueQuery {
    pub field: String,
    pub query: String,
}

impl ValueQuery {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupQuery {
    pub field: String,
}

// Largest integer an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Integral bounds go out as JSON integers (`2`, not `2.0`).
fn serialize_bounds<S>(bounds: &Bounds, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(bounds.len()))?;
    for (op, value) in bounds {
        if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
            map.serialize_entry(op, &(*value as i64))?;
        } else {
            map.serialize_entry(op, value)?;
        }
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_range_serializes_integral_bounds_as_integers() {
        let query = Query::Range(RangeQuery {
            field: "severity".into(),
            query: Bounds::from([(RangeOp::Gt, 2.0), (RangeOp::Lt, 5.5)]),
        });
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"type": "range", "value": {"field": "severity", "query": {"gt": 2, "lt": 5.5}}})
        );
    }

    #[test]
    fn test_in_omits_negated_when_false() {
        let query = Query::In(InQuery {
            field: "tags".into(),
            query: vec!["a".into()],
            negated: false,
        });
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"type": "in", "value": {"field": "tags", "query": ["a"]}})
        );
    }

    #[test]
    fn test_software_list_shape() {
        let query = Query::Software(SoftwareQuery {
            software: vec![],
            software_list: Some("@software_list".into()),
            fuzzy: false,
        });
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"type": "software", "value": {"software": [], "softwareList": "@software_list", "fuzzy": false}})
        );
    }

    #[test]
    fn test_deserialize_from_wire_shape() {
        let query: Query = serde_json::from_value(json!({
            "type": "software",
            "value": {"software": [{"name": "test", "version": [{"op": "gte", "value": "1.2"}]}]}
        }))
        .unwrap();
        assert_eq!(
            query,
            Query::Software(SoftwareQuery {
                software: vec![Software::new("test").with_version(RangeOp::Gte, "1.2")],
                software_list: None,
                fuzzy: false,
            })
        );
    }

    #[test]
    fn test_tag_and_field() {
        let exact = Query::Exact(ValueQuery::new("id", "CVE-2020-123"));
        assert_eq!(exact.tag(), "exact");
        assert_eq!(exact.field(), Some("id"));

        let filter = Query::Filter(FilterQuery {
            filter: "THING".into(),
        });
        assert_eq!(filter.tag(), "filter");
        assert_eq!(filter.field(), None);
    }
}
