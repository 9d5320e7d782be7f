use serde_json::json;
use sqlx::{self, postgres::PgRow, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::filter::FilterData;

/// Read access to one table or `*_details` view.
///
/// Writes go through the services, which then re-read the row here so every
/// response carries the joined read model.
pub struct Repository<T> {
    table_name: String,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            table_name: table_name.into(),
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .select_all(&self.pool)
            .await
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .select_optional(&self.pool)
            .await
    }

    /// Like `select_one` but absence becomes `NotFound(not_found)`.
    pub async fn select_404(&self, filter_data: FilterData, not_found: impl Into<String>) -> Result<T, DatabaseError> {
        match QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .select_one(&self.pool)
            .await
        {
            Ok(row) => Ok(row),
            Err(DatabaseError::Sqlx(sqlx::Error::RowNotFound)) => Err(DatabaseError::NotFound(not_found.into())),
            Err(other) => Err(other),
        }
    }

    pub async fn select_id(&self, id: i64, label: &str) -> Result<T, DatabaseError> {
        let filter = FilterData {
            where_clause: Some(json!({ "id": id })),
            ..Default::default()
        };
        self.select_404(filter, format!("{} {} not found", label, id)).await
    }
}
