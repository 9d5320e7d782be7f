use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};

use crate::database::manager::DatabaseError;
use crate::filter::types::SqlResult;
use crate::filter::{Filter, FilterData};

/// Typed SELECT over one table or view, driven by a [`FilterData`].
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>) -> Result<Self, DatabaseError> {
        let filter = Filter::new(table_name)?;
        Ok(Self {
            filter,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn filter(mut self, filter_data: FilterData) -> Result<Self, DatabaseError> {
        self.filter.assign(filter_data)?;
        Ok(self)
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql = self.compile()?;
        Ok(bound::<T>(&sql).fetch_all(pool).await?)
    }

    pub async fn select_one(self, pool: &PgPool) -> Result<T, DatabaseError> {
        let sql = self.compile()?;
        Ok(bound::<T>(&sql).fetch_one(pool).await?)
    }

    pub async fn select_optional(self, pool: &PgPool) -> Result<Option<T>, DatabaseError> {
        let sql = self.compile()?;
        Ok(bound::<T>(&sql).fetch_optional(pool).await?)
    }

    fn compile(&self) -> Result<SqlResult, DatabaseError> {
        let sql = self.filter.to_sql()?;
        tracing::trace!(query = %sql.query, params = sql.params.len(), "compiled filter");
        Ok(sql)
    }
}

/// Binds the compiled JSON parameters in order.
fn bound<T>(sql: &SqlResult) -> QueryAs<'_, Postgres, T, PgArguments>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    sql.params.iter().fold(sqlx::query_as::<_, T>(&sql.query), |q, param| match param {
        Value::Null => q.bind(None::<String>),
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => q.bind(i),
            (None, Some(f)) => q.bind(f),
            (None, None) => q.bind(n.to_string()),
        },
        Value::String(s) => q.bind(s.clone()),
        // FilterWhere expands arrays into one parameter per element
        Value::Array(_) | Value::Object(_) => q.bind(param.clone()),
    })
}
