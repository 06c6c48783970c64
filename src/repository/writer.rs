use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::BigInt;

use crate::query::value::QueryValue;
use crate::repository::errors::RepositoryResult;
use crate::repository::executor::bind_values;
use crate::repository::{DieselRepository, ResourceWriter};

#[derive(QueryableByName)]
struct KeyRow {
    #[diesel(sql_type = BigInt)]
    key: i64,
}

impl ResourceWriter for DieselRepository {
    fn insert(&self, table: &str, values: &[(String, QueryValue)]) -> RepositoryResult<i64> {
        let mut conn = self.conn()?;

        let sql = if values.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            let columns = values
                .iter()
                .map(|(column, _)| column.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = vec!["?"; values.len()].join(", ");
            format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})")
        };
        let binds = values.iter().map(|(_, value)| value.clone()).collect();

        let key = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            bind_values(sql, binds).execute(conn)?;
            sql_query("SELECT last_insert_rowid() AS key").get_result::<KeyRow>(conn)
        })?;

        Ok(key.key)
    }

    fn update(
        &self,
        table: &str,
        key: &str,
        id: i64,
        values: &[(String, QueryValue)],
    ) -> RepositoryResult<usize> {
        if values.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;

        let assignments = values
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {table} SET {assignments} WHERE {key} = ?");
        let mut binds: Vec<QueryValue> = values.iter().map(|(_, value)| value.clone()).collect();
        binds.push(QueryValue::Integer(id));

        let affected = bind_values(sql, binds).execute(&mut conn)?;
        Ok(affected)
    }

    fn delete(&self, table: &str, key: &str, id: i64) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let sql = format!("DELETE FROM {table} WHERE {key} = ?");
        let affected = bind_values(sql, vec![QueryValue::Integer(id)]).execute(&mut conn)?;
        Ok(affected)
    }
}
