use chrono::NaiveTime;
use serde::Deserialize;
use sqlx::PgPool;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::{HomeGroup, Member};
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::WeekDay;
use crate::validation::{clean, default_true, FieldErrors, Validate, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeGroupListQuery {
    pub active: Option<bool>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomeGroupInput {
    #[serde(default)]
    pub name: String,
    pub address: Option<String>,
    pub host_member_id: Option<i64>,
    pub leader_member_id: Option<i64>,
    pub meeting_day: Option<WeekDay>,
    pub meeting_time: Option<NaiveTime>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for HomeGroupInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name, MAX_NAME_LENGTH);
        errors.optional_text("address", self.address.as_deref(), MAX_TEXT_LENGTH);
        errors.positive_id("host_member_id", self.host_member_id);
        errors.positive_id("leader_member_id", self.leader_member_id);
        if self.meeting_time.is_some() && self.meeting_day.is_none() {
            errors.add("meeting_day", "A meeting day is required when a meeting time is set");
        }
        errors.into_result()
    }
}

pub struct HomeGroupService {
    pool: PgPool,
}

impl HomeGroupService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<HomeGroup> {
        Repository::new("home_group_details", self.pool.clone())
    }

    pub async fn list(&self, query: HomeGroupListQuery) -> ServiceResult<Vec<HomeGroup>> {
        let conditions = Conditions::new().eq("is_active", query.active);
        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            "name asc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<HomeGroup> {
        Ok(self.repository().select_id(id, "Home group").await?)
    }

    pub async fn create_one(&self, input: &HomeGroupInput) -> ServiceResult<HomeGroup> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO home_groups (name, address, host_member_id, leader_member_id, meeting_day, meeting_time, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(clean(&input.address))
        .bind(input.host_member_id)
        .bind(input.leader_member_id)
        .bind(input.meeting_day.map(|d| d.as_str()))
        .bind(input.meeting_time)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;

        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &HomeGroupInput) -> ServiceResult<HomeGroup> {
        let result = sqlx::query(
            r#"
            UPDATE home_groups SET
                name = $2, address = $3, host_member_id = $4, leader_member_id = $5,
                meeting_day = $6, meeting_time = $7, is_active = $8, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(clean(&input.address))
        .bind(input.host_member_id)
        .bind(input.leader_member_id)
        .bind(input.meeting_day.map(|d| d.as_str()))
        .bind(input.meeting_time)
        .bind(input.is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Home group {} not found", id)));
        }
        self.select_404(id).await
    }

    /// Members of the group keep existing with their group cleared.
    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM home_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Home group {} not found", id)));
        }
        Ok(())
    }

    pub async fn members(&self, id: i64) -> ServiceResult<Vec<Member>> {
        self.select_404(id).await?;
        let filter = FilterData::conditions(Conditions::new().eq("home_group_id", Some(id)).into_map())
            .ordered("last_name asc, first_name asc");
        let members = Repository::<Member>::new("member_details", self.pool.clone())
            .select_any(filter)
            .await?;
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn time_without_day_is_rejected() {
        let input: HomeGroupInput = serde_json::from_value(json!({
            "name": "Hogar Norte",
            "meeting_time": "19:30:00"
        }))
        .unwrap();
        assert!(input.is_active);
        let errors = input.validate().unwrap_err();
        assert!(errors.get("meeting_day").is_some());
    }

    #[test]
    fn unknown_weekday_fails_to_parse() {
        let parsed = serde_json::from_value::<HomeGroupInput>(json!({ "name": "Sur", "meeting_day": "funday" }));
        assert!(parsed.is_err());
    }
}
