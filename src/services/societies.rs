use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::{Society, SocietyLeader};
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::{SocietyKind, SocietyPosition};
use crate::validation::{clean, default_true, FieldErrors, Validate, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocietyListQuery {
    pub kind: Option<SocietyKind>,
    pub active: Option<bool>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocietyInput {
    #[serde(default)]
    pub name: String,
    pub kind: SocietyKind,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for SocietyInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name, MAX_NAME_LENGTH);
        errors.optional_text("description", self.description.as_deref(), MAX_TEXT_LENGTH);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderInput {
    #[serde(default)]
    pub member_id: i64,
    pub position: SocietyPosition,
    pub term_start: Option<NaiveDate>,
    pub term_end: Option<NaiveDate>,
}

impl Validate for LeaderInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.member_id <= 0 {
            errors.add("member_id", "A member is required");
        }
        errors.date_order("term_end", self.term_start, self.term_end);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderUpdate {
    pub position: SocietyPosition,
    pub term_start: Option<NaiveDate>,
    pub term_end: Option<NaiveDate>,
}

impl Validate for LeaderUpdate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.date_order("term_end", self.term_start, self.term_end);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SocietyDetail {
    #[serde(flatten)]
    pub society: Society,
    pub leaders: Vec<SocietyLeader>,
}

pub struct SocietyService {
    pool: PgPool,
}

impl SocietyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<Society> {
        Repository::new("societies", self.pool.clone())
    }

    fn leaders(&self) -> Repository<SocietyLeader> {
        Repository::new("society_leader_details", self.pool.clone())
    }

    pub async fn list(&self, query: SocietyListQuery) -> ServiceResult<Vec<Society>> {
        let conditions = Conditions::new()
            .eq("kind", query.kind.map(|k| k.as_str()))
            .eq("is_active", query.active);
        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            "name asc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<Society> {
        Ok(self.repository().select_id(id, "Society").await?)
    }

    pub async fn detail_404(&self, id: i64) -> ServiceResult<SocietyDetail> {
        let society = self.select_404(id).await?;
        let filter = FilterData::conditions(Conditions::new().eq("society_id", Some(id)).into_map())
            .ordered("position asc, member_name asc");
        let leaders = self.leaders().select_any(filter).await?;
        Ok(SocietyDetail { society, leaders })
    }

    pub async fn create_one(&self, input: &SocietyInput) -> ServiceResult<Society> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO societies (name, kind, description, is_active) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(input.name.trim())
        .bind(input.kind.as_str())
        .bind(clean(&input.description))
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;
        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &SocietyInput) -> ServiceResult<Society> {
        let result = sqlx::query(
            r#"
            UPDATE societies SET name = $2, kind = $3, description = $4, is_active = $5, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.kind.as_str())
        .bind(clean(&input.description))
        .bind(input.is_active)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Society {} not found", id)));
        }
        self.select_404(id).await
    }

    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM societies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Society {} not found", id)));
        }
        Ok(())
    }

    pub async fn add_leader(&self, society_id: i64, input: &LeaderInput) -> ServiceResult<SocietyLeader> {
        self.select_404(society_id).await?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO society_leaders (society_id, member_id, position, term_start, term_end)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(society_id)
        .bind(input.member_id)
        .bind(input.position.as_str())
        .bind(input.term_start)
        .bind(input.term_end)
        .fetch_one(&self.pool)
        .await?;
        Ok(self.leaders().select_id(id, "Society leader").await?)
    }

    pub async fn update_leader(&self, society_id: i64, leader_id: i64, input: &LeaderUpdate) -> ServiceResult<SocietyLeader> {
        let result = sqlx::query(
            r#"
            UPDATE society_leaders SET position = $3, term_start = $4, term_end = $5
            WHERE id = $2 AND society_id = $1
            "#,
        )
        .bind(society_id)
        .bind(leader_id)
        .bind(input.position.as_str())
        .bind(input.term_start)
        .bind(input.term_end)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(leader_not_found(society_id, leader_id));
        }
        Ok(self.leaders().select_id(leader_id, "Society leader").await?)
    }

    pub async fn remove_leader(&self, society_id: i64, leader_id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM society_leaders WHERE id = $2 AND society_id = $1")
            .bind(society_id)
            .bind(leader_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(leader_not_found(society_id, leader_id));
        }
        Ok(())
    }
}

fn leader_not_found(society_id: i64, leader_id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Leader {} not found in society {}", leader_id, society_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn term_must_not_end_before_start() {
        let input: LeaderInput = serde_json::from_value(json!({
            "member_id": 3,
            "position": "president",
            "term_start": "2024-01-01",
            "term_end": "2023-12-31"
        }))
        .unwrap();
        assert!(input.validate().unwrap_err().get("term_end").is_some());
    }

    #[test]
    fn unknown_position_is_rejected() {
        let parsed = serde_json::from_value::<LeaderInput>(json!({ "member_id": 3, "position": "bishop" }));
        assert!(parsed.is_err());
    }
}
