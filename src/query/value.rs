//! Values bound to named query parameters.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;

/// A single value bound to a named query parameter.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
}

/// Named parameters of a query, keyed by name without the leading `:`.
pub type QueryParams = BTreeMap<String, QueryValue>;

impl Display for QueryValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryValue::Null => write!(f, "NULL"),
            QueryValue::Integer(value) => write!(f, "{value}"),
            QueryValue::Real(value) => write!(f, "{value}"),
            QueryValue::Text(value) => write!(f, "'{value}'"),
            QueryValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Integer(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Real(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl<T> From<Option<T>> for QueryValue
where
    T: Into<QueryValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(QueryValue::Null)
    }
}
