use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::Deacon;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::validation::{clean, default_true, FieldErrors, Validate, MAX_NAME_LENGTH};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeaconListQuery {
    pub active: Option<bool>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeaconInput {
    #[serde(default)]
    pub member_id: i64,
    pub ministry: Option<String>,
    pub ordained_on: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for DeaconInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.member_id <= 0 {
            errors.add("member_id", "A member is required");
        }
        errors.optional_text("ministry", self.ministry.as_deref(), MAX_NAME_LENGTH);
        errors.date_not_after("ordained_on", self.ordained_on, Utc::now().date_naive());
        errors.into_result()
    }
}

pub struct DeaconService {
    pool: PgPool,
}

impl DeaconService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<Deacon> {
        Repository::new("deacon_details", self.pool.clone())
    }

    pub async fn list(&self, query: DeaconListQuery) -> ServiceResult<Vec<Deacon>> {
        let conditions = Conditions::new().eq("is_active", query.active);
        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            "member_name asc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<Deacon> {
        Ok(self.repository().select_id(id, "Deacon").await?)
    }

    pub async fn create_one(&self, input: &DeaconInput) -> ServiceResult<Deacon> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO deacons (member_id, ministry, ordained_on, is_active) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(input.member_id)
        .bind(clean(&input.ministry))
        .bind(input.ordained_on)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;
        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &DeaconInput) -> ServiceResult<Deacon> {
        let result = sqlx::query(
            r#"
            UPDATE deacons SET member_id = $2, ministry = $3, ordained_on = $4, is_active = $5, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.member_id)
        .bind(clean(&input.ministry))
        .bind(input.ordained_on)
        .bind(input.is_active)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Deacon {} not found", id)));
        }
        self.select_404(id).await
    }

    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM deacons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Deacon {} not found", id)));
        }
        Ok(())
    }
}
