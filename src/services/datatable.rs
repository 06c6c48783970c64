//! Shapes paginated query results into data table pages.

use serde_json::Value;

use crate::domain::datatable::DataTable;
use crate::domain::metadata::EntityMetadata;
use crate::domain::permission::{Authorizer, Target};
use crate::domain::sort::SortExpression;
use crate::dto::api::DataTableQuery;
use crate::query::PagedQuery;
use crate::repository::QueryExecutor;
use crate::services::ServiceResult;

/// Logs an incoming list query.
pub fn log_query(query: &DataTableQuery) {
    log::info!(
        "GET start: {}, length: {}, echo: {:?}, sort: {:?}, search: {:?}",
        query.start,
        query.length,
        query.echo,
        query.sort,
        query.search
    );
}

/// Applies the client query to `results` and packages one page.
///
/// The sort text is applied only when every field in it is sortable on
/// `metadata`; otherwise the query keeps its default ordering. Each of
/// `permissions` granted by `authorizer` on the entity type is listed in the
/// page.
pub fn make_query_response<T, E, A>(
    executor: &E,
    authorizer: &A,
    query: &DataTableQuery,
    mut results: PagedQuery<T>,
    metadata: &EntityMetadata,
    oob: Option<Value>,
    permissions: &[&str],
) -> ServiceResult<DataTable<T>>
where
    E: QueryExecutor<T> + ?Sized,
    A: Authorizer + ?Sized,
{
    results.start = Some(query.start);
    results.limit = Some(query.length);

    if let Some(sort) = query.sort.as_deref() {
        match SortExpression::parse(sort, &metadata.sortable_fields()) {
            Ok(sort) => results.order = Some(sort.to_order_clause()),
            Err(err) => log::debug!("Ignoring sort: {err}"),
        }
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        results.search = Some(search.to_string());
    }

    let size = results.count(executor)?;
    let rows = results.result_list(executor)?;

    let mut page = DataTable::new(metadata.name, query.echo.clone(), size, rows, oob);
    let target = Target::Type(metadata.table);
    for permission in permissions {
        if authorizer.has_permission(&target, permission) {
            page.add_permission(*permission);
        }
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use serde_json::json;

    use super::*;
    use crate::domain::field::{FieldDescriptor, FieldType};
    use crate::domain::permission::{DELETE, INSERT, PermissionRegistry, SELECT};
    use crate::query::QueryParams;
    use crate::repository::Window;
    use crate::repository::errors::RepositoryResult;

    #[derive(Default)]
    struct TableRepo {
        rows: Vec<u32>,
        count_calls: Cell<usize>,
        last_select: RefCell<Option<(String, Window)>>,
    }

    impl TableRepo {
        fn with_rows(n: u32) -> Self {
            Self {
                rows: (1..=n).collect(),
                ..Self::default()
            }
        }
    }

    impl QueryExecutor<u32> for TableRepo {
        fn count(&self, _sql: &str, _params: &QueryParams) -> RepositoryResult<u64> {
            self.count_calls.set(self.count_calls.get() + 1);
            Ok(self.rows.len() as u64)
        }

        fn fetch(
            &self,
            sql: &str,
            _params: &QueryParams,
            window: Window,
        ) -> RepositoryResult<Vec<u32>> {
            self.last_select.replace(Some((sql.to_string(), window)));
            let start = window.start.unwrap_or(0) as usize;
            let limit = window.limit.map_or(usize::MAX, |l| l as usize);
            Ok(self.rows.iter().copied().skip(start).take(limit).collect())
        }
    }

    fn metadata() -> EntityMetadata {
        EntityMetadata {
            name: "Item",
            table: "items",
            key: "id",
            fields: vec![
                FieldDescriptor::new("id", FieldType::Integer),
                FieldDescriptor::new("name", FieldType::String)
                    .searchable()
                    .sortable(),
                FieldDescriptor::new("desc", FieldType::String).searchable(),
            ],
            column_order: Vec::new(),
        }
    }

    fn respond(
        repo: &TableRepo,
        authorizer: &PermissionRegistry,
        query: &DataTableQuery,
    ) -> DataTable<u32> {
        let results = PagedQuery::new("FROM items").search_fields(["name", "desc"]);
        make_query_response(
            repo,
            authorizer,
            query,
            results,
            &metadata(),
            None,
            &[INSERT, DELETE],
        )
        .unwrap()
    }

    #[test]
    fn pages_rows_and_counts_the_full_set() {
        let repo = TableRepo::with_rows(35);
        let query = DataTableQuery {
            start: 20,
            length: 10,
            ..DataTableQuery::default()
        };

        let page = respond(&repo, &PermissionRegistry::new(), &query);

        assert_eq!(page.size, 35);
        assert_eq!(page.rows, (21..=30).collect::<Vec<_>>());
        assert_eq!(repo.count_calls.get(), 1);
    }

    #[test]
    fn echo_passes_through_unchanged() {
        let repo = TableRepo::with_rows(1);
        for echo in [None, Some(String::new()), Some("  7 &x=1 ".to_string())] {
            let query = DataTableQuery {
                echo: echo.clone(),
                ..DataTableQuery::default()
            };

            assert_eq!(respond(&repo, &PermissionRegistry::new(), &query).echo, echo);
        }
    }

    #[test]
    fn invalid_sort_leaves_default_ordering() {
        let repo = TableRepo::with_rows(3);
        let query = DataTableQuery {
            sort: Some("name desc, id".to_string()),
            ..DataTableQuery::default()
        };

        respond(&repo, &PermissionRegistry::new(), &query);

        let (sql, _) = repo.last_select.borrow().clone().unwrap();
        assert_eq!(sql, "SELECT * FROM items");
    }

    #[test]
    fn valid_sort_and_search_are_applied() {
        let repo = TableRepo::with_rows(3);
        let query = DataTableQuery {
            sort: Some("name desc".to_string()),
            search: Some("foo".to_string()),
            ..DataTableQuery::default()
        };

        respond(&repo, &PermissionRegistry::new(), &query);

        let (sql, window) = repo.last_select.borrow().clone().unwrap();
        assert!(sql.starts_with("SELECT * FROM items WHERE (instr(unicode_lower(name)"));
        assert!(sql.ends_with(" ORDER BY name DESC"));
        assert_eq!(
            window,
            Window {
                start: Some(0),
                limit: Some(10)
            }
        );
    }

    #[test]
    fn lists_only_granted_permissions() {
        let repo = TableRepo::with_rows(1);
        let authorizer = PermissionRegistry::new()
            .allow(SELECT, ["items"])
            .allow(DELETE, ["items"])
            .allow(INSERT, ["orders"]);

        let page = respond(&repo, &authorizer, &DataTableQuery::default());

        assert_eq!(page.permissions, vec![DELETE.to_string()]);
        assert_eq!(page.type_name, "item");
    }

    #[test]
    fn attaches_out_of_band_payload() {
        let repo = TableRepo::with_rows(0);
        let page = make_query_response(
            &repo,
            &PermissionRegistry::new(),
            &DataTableQuery::default(),
            PagedQuery::new("FROM items"),
            &metadata(),
            Some(json!({"total": 0})),
            &[],
        )
        .unwrap();

        assert_eq!(page.oob, Some(json!({"total": 0})));
        assert!(page.rows.is_empty());
    }
}
