//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::item::Item;
use crate::query::value::{QueryParams, QueryValue};
use crate::repository::errors::RepositoryResult;
use crate::repository::{QueryExecutor, ResourceWriter, ValueQuery, Window};

mock! {
    pub Repository {}

    impl QueryExecutor<Item> for Repository {
        fn count(&self, sql: &str, params: &QueryParams) -> RepositoryResult<u64>;
        fn fetch(
            &self,
            sql: &str,
            params: &QueryParams,
            window: Window,
        ) -> RepositoryResult<Vec<Item>>;
    }

    impl ValueQuery for Repository {
        fn fetch_values(
            &self,
            sql: &str,
            params: &QueryParams,
            limit: u64,
        ) -> RepositoryResult<Vec<String>>;
    }

    impl ResourceWriter for Repository {
        fn insert(&self, table: &str, values: &[(String, QueryValue)]) -> RepositoryResult<i64>;
        fn update(
            &self,
            table: &str,
            key: &str,
            id: i64,
            values: &[(String, QueryValue)],
        ) -> RepositoryResult<usize>;
        fn delete(&self, table: &str, key: &str, id: i64) -> RepositoryResult<usize>;
    }
}
