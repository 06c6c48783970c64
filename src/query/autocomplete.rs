//! Distinct field values for autocompletion.

use crate::query::sql::contains_ignore_case;
use crate::query::value::QueryParams;
use crate::repository::ValueQuery;
use crate::repository::errors::RepositoryResult;

/// Maximum number of values returned by one autocompletion.
pub const AUTOCOMPLETE_MAX_RESULTS: u64 = 10;

const TERM_PARAMETER: &str = "q";

#[derive(Debug, Clone)]
pub struct AutoCompleteQuery<'a> {
    table: &'a str,
    field: &'a str,
    term: Option<&'a str>,
}

impl<'a> AutoCompleteQuery<'a> {
    /// `table` and `field` must come from entity metadata, never from
    /// client input.
    pub fn new(table: &'a str, field: &'a str) -> Self {
        Self {
            table,
            field,
            term: None,
        }
    }

    /// Restricts values to those containing `term`, ignoring case. Empty
    /// terms are ignored.
    pub fn term(mut self, term: Option<&'a str>) -> Self {
        self.term = term.filter(|t| !t.is_empty());
        self
    }

    pub fn sql(&self) -> String {
        let field = self.field;
        let mut sql = format!(
            "SELECT DISTINCT CAST({field} AS TEXT) AS value FROM {} WHERE {field} IS NOT NULL",
            self.table
        );
        if self.term.is_some() {
            sql.push_str(" AND ");
            sql.push_str(&contains_ignore_case(field, TERM_PARAMETER));
        }
        sql.push_str(" ORDER BY value");
        sql
    }

    pub fn parameters(&self) -> QueryParams {
        let mut parameters = QueryParams::new();
        if let Some(term) = self.term {
            parameters.insert(TERM_PARAMETER.to_string(), term.into());
        }
        parameters
    }

    pub fn fetch<E>(&self, executor: &E) -> RepositoryResult<Vec<String>>
    where
        E: ValueQuery + ?Sized,
    {
        let sql = self.sql();
        log::debug!("Making autocomplete query: {sql}");
        executor.fetch_values(&sql, &self.parameters(), AUTOCOMPLETE_MAX_RESULTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::value::QueryValue;

    #[test]
    fn without_term_lists_all_values() {
        let query = AutoCompleteQuery::new("items", "category").term(Some(""));

        assert_eq!(
            query.sql(),
            "SELECT DISTINCT CAST(category AS TEXT) AS value FROM items WHERE category IS NOT NULL ORDER BY value"
        );
        assert!(query.parameters().is_empty());
    }

    #[test]
    fn term_is_bound_not_interpolated() {
        let query = AutoCompleteQuery::new("items", "name").term(Some("O'Brien"));

        let sql = query.sql();
        assert!(sql.contains("instr(unicode_lower(name), unicode_lower(:q)) > 0"));
        assert!(!sql.contains("O'Brien"));
        assert_eq!(
            query.parameters().get("q"),
            Some(&QueryValue::Text("O'Brien".to_string()))
        );
    }
}
