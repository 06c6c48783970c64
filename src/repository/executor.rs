use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Double, Nullable, Text};
use diesel::sqlite::Sqlite;

use crate::models::Persisted;
use crate::query::sql::bind_named;
use crate::query::value::{QueryParams, QueryValue};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, QueryExecutor, ValueQuery, Window};

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct ValueRow {
    #[diesel(sql_type = Nullable<Text>)]
    value: Option<String>,
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Compiles `:named` parameters to positional binds on a boxed raw query.
pub(crate) fn prepare(
    sql: &str,
    params: &QueryParams,
) -> RepositoryResult<BoxedSqlQuery<'static, Sqlite, SqlQuery>> {
    let (sql, values) = bind_named(sql, params)?;
    Ok(bind_values(sql, values))
}

pub(crate) fn bind_values(
    sql: String,
    values: Vec<QueryValue>,
) -> BoxedSqlQuery<'static, Sqlite, SqlQuery> {
    values
        .into_iter()
        .fold(sql_query(sql).into_boxed(), |query, value| match value {
            QueryValue::Null => query.bind::<Nullable<Text>, _>(None::<String>),
            QueryValue::Integer(v) => query.bind::<BigInt, _>(v),
            QueryValue::Real(v) => query.bind::<Double, _>(v),
            QueryValue::Text(v) => query.bind::<Text, _>(v),
            QueryValue::Bool(v) => query.bind::<Bool, _>(v),
        })
}

impl<R> QueryExecutor<R> for DieselRepository
where
    R: Persisted,
{
    fn count(&self, sql: &str, params: &QueryParams) -> RepositoryResult<u64> {
        let mut conn = self.conn()?;
        let row = prepare(sql, params)?.get_result::<CountRow>(&mut conn)?;
        Ok(row.count.max(0) as u64)
    }

    fn fetch(&self, sql: &str, params: &QueryParams, window: Window) -> RepositoryResult<Vec<R>> {
        let mut conn = self.conn()?;
        let (mut sql, mut values) = bind_named(sql, params)?;

        if window.start.is_some() || window.limit.is_some() {
            // SQLite needs a LIMIT to accept an OFFSET; -1 means unbounded.
            sql.push_str(" LIMIT ? OFFSET ?");
            values.push(QueryValue::Integer(window.limit.map_or(-1, clamp)));
            values.push(QueryValue::Integer(window.start.map_or(0, clamp)));
        }

        let rows = bind_values(sql, values)
            .load::<R::Model>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(rows)
    }
}

impl ValueQuery for DieselRepository {
    fn fetch_values(
        &self,
        sql: &str,
        params: &QueryParams,
        limit: u64,
    ) -> RepositoryResult<Vec<String>> {
        let mut conn = self.conn()?;
        let (mut sql, mut values) = bind_named(sql, params)?;
        sql.push_str(" LIMIT ?");
        values.push(QueryValue::Integer(clamp(limit)));

        let rows = bind_values(sql, values)
            .load::<ValueRow>(&mut conn)?
            .into_iter()
            .filter_map(|row| row.value)
            .collect();

        Ok(rows)
    }
}
