//! Client supplied sort expressions.
//!
//! Sort text has the form `<field> [ASC|DESC] (, <field> [ASC|DESC])*` where a
//! field is either a sortable field name or a 1-based column position.

use std::fmt::{Display, Formatter};

use crate::query::errors::QueryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SortDirection {
    Asc,
    Desc,
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SortKey {
    field: String,
    direction: Option<SortDirection>,
}

/// A sort expression whose every field has been checked against a
/// whitelist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortExpression {
    keys: Vec<SortKey>,
}

fn split_direction(fragment: &str) -> (&str, Option<SortDirection>) {
    let lower = fragment.to_ascii_lowercase();
    if lower.ends_with(" desc") {
        (fragment[..fragment.len() - 5].trim(), Some(SortDirection::Desc))
    } else if lower.ends_with(" asc") {
        (fragment[..fragment.len() - 4].trim(), Some(SortDirection::Asc))
    } else {
        (fragment, None)
    }
}

fn is_position(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

impl SortExpression {
    /// Parses `sort` and checks every field against `sortable`.
    ///
    /// Empty fragments between commas are skipped, but at least one
    /// fragment is required.
    pub fn parse<S: AsRef<str>>(sort: &str, sortable: &[S]) -> Result<Self, QueryError> {
        let mut keys = Vec::new();

        for fragment in sort.split(',').filter(|f| !f.is_empty()) {
            let (field, direction) = split_direction(fragment.trim());
            if !is_position(field) && !sortable.iter().any(|s| s.as_ref() == field) {
                return Err(QueryError::InvalidSortExpression(sort.to_string()));
            }
            keys.push(SortKey {
                field: field.to_string(),
                direction,
            });
        }

        if keys.is_empty() {
            return Err(QueryError::InvalidSortExpression(sort.to_string()));
        }

        Ok(Self { keys })
    }

    /// Renders the expression as an `ORDER BY` clause body.
    pub fn to_order_clause(&self) -> String {
        self.keys
            .iter()
            .map(|key| match key.direction {
                Some(direction) => format!("{} {direction}", key.field),
                None => key.field.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Returns `true` if `sort` is present and valid against `sortable`.
pub fn is_sort_valid<S: AsRef<str>>(sort: Option<&str>, sortable: &[S]) -> bool {
    sort.is_some_and(|sort| SortExpression::parse(sort, sortable).is_ok())
}
