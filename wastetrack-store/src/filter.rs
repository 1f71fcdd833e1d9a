//! Composable scan predicates and query specs.
//!
//! A [`Filter`] is an expression tree over JSON pointer paths into the record
//! payload (e.g. `"/waste_code"`, `"/meta/author"`). Backends translate it
//! themselves: the memory store evaluates it against the blob, the SQLite
//! store renders it into a parameterized `json_extract` WHERE clause. Nothing
//! here is a free-form query string.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A composable scan predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Matches every row.
    All,
    /// Field equals value. `Eq` against `null` matches a missing field.
    Eq(String, Value),
    Ne(String, Value),
    Gt(String, Value),
    Ge(String, Value),
    Lt(String, Value),
    Le(String, Value),
    /// Substring match on a text field.
    Contains(String, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(path.into(), value.into())
    }

    pub fn ne(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne(path.into(), value.into())
    }

    pub fn gt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(path.into(), value.into())
    }

    pub fn ge(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ge(path.into(), value.into())
    }

    pub fn lt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt(path.into(), value.into())
    }

    pub fn le(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Le(path.into(), value.into())
    }

    pub fn contains(path: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains(path.into(), needle.into())
    }

    /// Conjunction with another predicate.
    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Disjunction with another predicate.
    #[must_use]
    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut parts) => {
                parts.push(other);
                Filter::Or(parts)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    /// Negation.
    #[must_use]
    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Evaluates the predicate against a record payload.
    pub fn matches(&self, data: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(path, expected) => match data.pointer(path) {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            },
            Filter::Ne(path, expected) => match data.pointer(path) {
                Some(actual) => actual != expected,
                None => !expected.is_null(),
            },
            Filter::Gt(path, bound) => cmp_at(data, path, bound) == Some(Ordering::Greater),
            Filter::Ge(path, bound) => {
                matches!(cmp_at(data, path, bound), Some(Ordering::Greater | Ordering::Equal))
            }
            Filter::Lt(path, bound) => cmp_at(data, path, bound) == Some(Ordering::Less),
            Filter::Le(path, bound) => {
                matches!(cmp_at(data, path, bound), Some(Ordering::Less | Ordering::Equal))
            }
            Filter::Contains(path, needle) => data
                .pointer(path)
                .and_then(Value::as_str)
                .is_some_and(|s| s.contains(needle.as_str())),
            Filter::And(parts) => parts.iter().all(|f| f.matches(data)),
            Filter::Or(parts) => parts.iter().any(|f| f.matches(data)),
            Filter::Not(inner) => !inner.matches(data),
        }
    }
}

fn cmp_at(data: &Value, path: &str, bound: &Value) -> Option<Ordering> {
    data.pointer(path).and_then(|v| compare_values(v, bound))
}

/// Total order over comparable JSON scalars: numbers against numbers, strings
/// against strings, booleans against booleans. Mixed or non-scalar operands
/// are incomparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Sort direction for one ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One ordering key: a JSON pointer into the payload plus a direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// A composed scan: filter, ordering, window. The default spec scans a whole
/// kind in id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub filter: Option<Filter>,
    pub order: Vec<SortKey>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QuerySpec {
    #[must_use]
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }
}

/// Converts a JSON pointer (`"/a/b"`) into a SQLite JSON path (`"$.a.b"`).
/// Rejects paths that would escape the quoted SQL literal.
pub(crate) fn pointer_to_json_path(pointer: &str) -> Result<String, crate::StoreError> {
    if pointer.is_empty() || !pointer.starts_with('/') {
        return Err(crate::StoreError::InvalidData(format!(
            "filter path must be a JSON pointer starting with '/': {pointer:?}"
        )));
    }
    if pointer.contains('\'') || pointer.contains('"') {
        return Err(crate::StoreError::InvalidData(format!(
            "filter path contains quote characters: {pointer:?}"
        )));
    }
    let mut path = String::from("$");
    for segment in pointer[1..].split('/') {
        if segment.is_empty() {
            return Err(crate::StoreError::InvalidData(format!(
                "filter path has an empty segment: {pointer:?}"
            )));
        }
        // JSON pointer escapes: ~1 is '/', ~0 is '~'.
        let segment = segment.replace("~1", "/").replace("~0", "~");
        path.push('.');
        path.push_str(&segment);
    }
    Ok(path)
}
