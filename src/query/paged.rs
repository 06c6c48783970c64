//! Request-scoped paginated query over a `FROM ...` template.

use std::marker::PhantomData;

use crate::query::sql::{contains_ignore_case, starts_with_from, where_condition};
use crate::query::value::{QueryParams, QueryValue};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{QueryExecutor, Window};

/// Name of the parameter the search term is bound to.
pub const SEARCH_PARAMETER: &str = "_search";

/// A filtered, sortable and paginated query.
///
/// The template is the query text starting at its `FROM` clause, e.g.
/// `FROM items` or `FROM items WHERE hub_id = :hub`. The projection, search
/// filter, grouping and ordering are assembled around it, so the result and
/// count queries always share the same filter text and parameters.
///
/// The total count is executed at most once per instance and cached.
#[derive(Debug)]
pub struct PagedQuery<T> {
    template: String,
    projection: String,
    pub group: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    search_fields: Vec<String>,
    parameters: QueryParams,
    pub start: Option<u64>,
    pub limit: Option<u64>,
    count: Option<u64>,
    row: PhantomData<fn() -> T>,
}

impl<T> PagedQuery<T> {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            projection: "*".to_string(),
            group: None,
            order: None,
            search: None,
            search_fields: Vec::new(),
            parameters: QueryParams::new(),
            start: None,
            limit: None,
            count: None,
            row: PhantomData,
        }
    }

    /// Replaces the `SELECT` list of the result query (defaults to `*`).
    pub fn projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn group_by(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn order_by(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Replaces the set of fields the search term is matched against.
    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Binds a named parameter referenced as `:name` in the template.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|term| !term.is_empty() && !self.search_fields.is_empty())
    }

    fn filtered_template(&self) -> RepositoryResult<String> {
        if !starts_with_from(&self.template) {
            return Err(RepositoryError::QueryExecution(format!(
                "query template must start with FROM: {}",
                self.template
            )));
        }

        let template = self.template.trim();
        if self.search_term().is_none() {
            return Ok(template.to_string());
        }

        let conditions = self
            .search_fields
            .iter()
            .map(|field| contains_ignore_case(field, SEARCH_PARAMETER))
            .collect::<Vec<_>>();
        let search = format!("({})", conditions.join(" OR "));

        // An existing condition is parenthesised so its OR terms stay scoped.
        let sql = match where_condition(template) {
            Some(range) => {
                let mut sql = format!(
                    "{} ({}) AND {search}",
                    &template[..range.start],
                    template[range.clone()].trim()
                );
                let rest = template[range.end..].trim();
                if !rest.is_empty() {
                    sql.push(' ');
                    sql.push_str(rest);
                }
                sql
            }
            None => format!("{template} WHERE {search}"),
        };
        Ok(sql)
    }

    /// Query text for the current page of results.
    pub fn select_sql(&self) -> RepositoryResult<String> {
        let mut sql = format!("SELECT {} {}", self.projection, self.filtered_template()?);
        if let Some(group) = self.group.as_deref().filter(|g| !g.is_empty()) {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }
        if let Some(order) = self.order.as_deref().filter(|o| !o.is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        Ok(sql)
    }

    /// Query text for the total number of matching rows, or of distinct
    /// groups when a grouping key is set.
    pub fn count_sql(&self) -> RepositoryResult<String> {
        let count = match self.group.as_deref().filter(|g| !g.is_empty()) {
            Some(group) => format!("COUNT(DISTINCT {group})"),
            None => "COUNT(*)".to_string(),
        };
        Ok(format!(
            "SELECT {count} AS count {}",
            self.filtered_template()?
        ))
    }

    /// Named parameters shared by the result and count queries.
    pub fn parameters(&self) -> QueryParams {
        let mut parameters = self.parameters.clone();
        if let Some(term) = self.search_term() {
            parameters.insert(SEARCH_PARAMETER.to_string(), term.into());
        }
        parameters
    }

    /// Total number of matching rows, ignoring `start` and `limit`.
    pub fn count<E>(&mut self, executor: &E) -> RepositoryResult<u64>
    where
        E: QueryExecutor<T> + ?Sized,
    {
        if let Some(count) = self.count {
            return Ok(count);
        }
        let sql = self.count_sql()?;
        log::debug!("Making count query: {sql}");
        let count = executor.count(&sql, &self.parameters())?;
        self.count = Some(count);
        Ok(count)
    }

    /// Rows of the current page.
    pub fn result_list<E>(&self, executor: &E) -> RepositoryResult<Vec<T>>
    where
        E: QueryExecutor<T> + ?Sized,
    {
        let sql = self.select_sql()?;
        let parameters = self.parameters();
        log::debug!("Making query: {sql}");
        for (name, value) in &parameters {
            log::debug!(" Query param {name} => {value}");
        }
        executor.fetch(
            &sql,
            &parameters,
            Window {
                start: self.start,
                limit: self.limit,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    /// In-memory executor over a fixed list of rows that records every
    /// statement it is asked to run.
    #[derive(Default)]
    struct RecordingExecutor {
        rows: Vec<String>,
        counts: Cell<usize>,
        statements: RefCell<Vec<(String, QueryParams)>>,
    }

    impl RecordingExecutor {
        fn with_rows(n: usize) -> Self {
            Self {
                rows: (1..=n).map(|i| format!("row {i}")).collect(),
                ..Self::default()
            }
        }
    }

    impl QueryExecutor<String> for RecordingExecutor {
        fn count(&self, sql: &str, params: &QueryParams) -> RepositoryResult<u64> {
            self.counts.set(self.counts.get() + 1);
            self.statements
                .borrow_mut()
                .push((sql.to_string(), params.clone()));
            Ok(self.rows.len() as u64)
        }

        fn fetch(
            &self,
            sql: &str,
            params: &QueryParams,
            window: Window,
        ) -> RepositoryResult<Vec<String>> {
            self.statements
                .borrow_mut()
                .push((sql.to_string(), params.clone()));
            let start = window.start.unwrap_or(0) as usize;
            let limit = window.limit.map_or(usize::MAX, |l| l as usize);
            Ok(self.rows.iter().skip(start).take(limit).cloned().collect())
        }
    }

    #[test]
    fn unfiltered_when_term_or_fields_are_empty() {
        let mut query = PagedQuery::<String>::new("FROM Item").search_fields(["name", "desc"]);
        assert_eq!(query.select_sql().unwrap(), "SELECT * FROM Item");

        query.search = Some(String::new());
        assert_eq!(query.select_sql().unwrap(), "SELECT * FROM Item");
        assert!(query.parameters().is_empty());

        let mut query = PagedQuery::<String>::new("FROM Item").search_fields(Vec::<String>::new());
        query.search = Some("foo".to_string());
        assert_eq!(query.select_sql().unwrap(), "SELECT * FROM Item");
        assert_eq!(query.count_sql().unwrap(), "SELECT COUNT(*) AS count FROM Item");
        assert!(query.parameters().is_empty());
    }

    #[test]
    fn search_builds_disjunctive_filter_with_bound_term() {
        let mut query = PagedQuery::<String>::new("FROM Item").search_fields(["name", "desc"]);
        query.search = Some("foo".to_string());

        let filter = "WHERE (instr(unicode_lower(name), unicode_lower(:_search)) > 0 OR instr(unicode_lower(desc), unicode_lower(:_search)) > 0)";
        assert_eq!(
            query.select_sql().unwrap(),
            format!("SELECT * FROM Item {filter}")
        );
        assert_eq!(
            query.count_sql().unwrap(),
            format!("SELECT COUNT(*) AS count FROM Item {filter}")
        );
        assert!(!query.select_sql().unwrap().contains("foo"));
        assert_eq!(
            query.parameters().get(SEARCH_PARAMETER),
            Some(&QueryValue::Text("foo".to_string()))
        );
    }

    #[test]
    fn search_extends_existing_where_clause() {
        let mut query = PagedQuery::<String>::new("FROM Item WHERE hub_id = :hub")
            .parameter("hub", 7)
            .search_fields(["name"]);
        query.search = Some("foo".to_string());

        assert_eq!(
            query.select_sql().unwrap(),
            "SELECT * FROM Item WHERE (hub_id = :hub) AND (instr(unicode_lower(name), unicode_lower(:_search)) > 0)"
        );
        let params = query.parameters();
        assert_eq!(params.get("hub"), Some(&QueryValue::Integer(7)));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn disjunctive_template_condition_is_parenthesised() {
        let mut query =
            PagedQuery::<String>::new("FROM items WHERE category = :a OR category = :b")
                .parameter("a", "Books")
                .parameter("b", "Tools")
                .search_fields(["name"])
                .order_by("name");
        query.search = Some("Item 01".to_string());

        assert_eq!(
            query.select_sql().unwrap(),
            "SELECT * FROM items WHERE (category = :a OR category = :b) AND (instr(unicode_lower(name), unicode_lower(:_search)) > 0) ORDER BY name"
        );
        assert_eq!(
            query.count_sql().unwrap(),
            "SELECT COUNT(*) AS count FROM items WHERE (category = :a OR category = :b) AND (instr(unicode_lower(name), unicode_lower(:_search)) > 0)"
        );
    }

    #[test]
    fn where_inside_literal_does_not_count() {
        let mut query =
            PagedQuery::<String>::new("FROM Item JOIN Tag ON Tag.label = ' where '").search_fields(["name"]);
        query.search = Some("foo".to_string());

        assert!(
            query
                .select_sql()
                .unwrap()
                .ends_with("' where ' WHERE (instr(unicode_lower(name), unicode_lower(:_search)) > 0)")
        );
    }

    #[test]
    fn grouping_and_ordering() {
        let query = PagedQuery::<String>::new("FROM Item")
            .projection("category, COUNT(*)")
            .group_by("category")
            .order_by("category DESC");

        assert_eq!(
            query.select_sql().unwrap(),
            "SELECT category, COUNT(*) FROM Item GROUP BY category ORDER BY category DESC"
        );
        assert_eq!(
            query.count_sql().unwrap(),
            "SELECT COUNT(DISTINCT category) AS count FROM Item"
        );
    }

    #[test]
    fn template_without_from_is_an_execution_error() {
        let query = PagedQuery::<String>::new("SELECT * FROM Item");

        assert!(matches!(
            query.select_sql(),
            Err(RepositoryError::QueryExecution(_))
        ));
        assert!(matches!(
            query.count_sql(),
            Err(RepositoryError::QueryExecution(_))
        ));
    }

    #[test]
    fn count_is_cached_and_ignores_pagination() {
        let executor = RecordingExecutor::with_rows(35);
        let mut query = PagedQuery::<String>::new("FROM Item");

        assert_eq!(query.count(&executor).unwrap(), 35);
        query.start = Some(20);
        query.limit = Some(10);
        assert_eq!(query.count(&executor).unwrap(), 35);
        assert_eq!(executor.counts.get(), 1);

        let rows = query.result_list(&executor).unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows.first().map(String::as_str), Some("row 21"));
        assert_eq!(rows.last().map(String::as_str), Some("row 30"));
    }

    #[test]
    fn count_and_results_share_parameters() {
        let executor = RecordingExecutor::with_rows(3);
        let mut query = PagedQuery::<String>::new("FROM Item").search_fields(["name"]);
        query.search = Some("foo".to_string());

        query.count(&executor).unwrap();
        query.result_list(&executor).unwrap();

        let statements = executor.statements.borrow();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].1, statements[1].1);
    }
}
