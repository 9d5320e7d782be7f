use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::Activity;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::{ActivityStatus, ActivityType};
use crate::validation::{clean, FieldErrors, Validate, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

pub const MAX_UPCOMING: i64 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityListQuery {
    pub status: Option<ActivityStatus>,
    pub activity_type: Option<ActivityType>,
    /// First day included (by start time)
    pub from: Option<NaiveDate>,
    /// Last day included (by start time)
    pub to: Option<NaiveDate>,
    pub society_id: Option<i64>,
    pub committee_id: Option<i64>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl ActivityListQuery {
    fn conditions(&self) -> Conditions {
        let mut starts_at = serde_json::Map::new();
        if let Some(from) = self.from {
            starts_at.insert("$gte".to_string(), from.to_string().into());
        }
        // starts_at compares as text, so the upper bound is the next day exclusive
        if let Some(next) = self.to.and_then(|to| to.checked_add_days(Days::new(1))) {
            starts_at.insert("$lt".to_string(), next.to_string().into());
        }

        let mut conditions = Conditions::new()
            .eq("status", self.status.map(|s| s.as_str()))
            .eq("activity_type", self.activity_type.map(|t| t.as_str()))
            .eq("society_id", self.society_id)
            .eq("committee_id", self.committee_id);
        if !starts_at.is_empty() {
            conditions = conditions.raw("starts_at", serde_json::Value::Object(starts_at));
        }
        conditions
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityInput {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub activity_type: ActivityType,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub organizer_member_id: Option<i64>,
    pub society_id: Option<i64>,
    pub committee_id: Option<i64>,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub visitor_count: i32,
}

impl Validate for ActivityInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("title", &self.title, MAX_NAME_LENGTH * 2);
        errors.optional_text("description", self.description.as_deref(), MAX_TEXT_LENGTH);
        errors.optional_text("location", self.location.as_deref(), MAX_NAME_LENGTH * 2);
        if matches!(self.ends_at, Some(end) if end < self.starts_at) {
            errors.add("ends_at", "The activity cannot end before it starts");
        }
        if self.visitor_count < 0 {
            errors.add("visitor_count", "Visitor count cannot be negative");
        }
        errors.positive_id("organizer_member_id", self.organizer_member_id);
        errors.positive_id("society_id", self.society_id);
        errors.positive_id("committee_id", self.committee_id);
        errors.into_result()
    }
}

pub struct ActivityService {
    pool: PgPool,
}

impl ActivityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<Activity> {
        Repository::new("activities", self.pool.clone())
    }

    pub async fn list(&self, query: ActivityListQuery) -> ServiceResult<Vec<Activity>> {
        let filter = FilterData::conditions(query.conditions().into_map()).paged(
            query.order.as_deref(),
            "starts_at desc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    /// Scheduled activities starting at or after `now`, soonest first.
    pub async fn upcoming(&self, now: DateTime<Utc>, limit: i64) -> ServiceResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT * FROM activities
            WHERE status = 'scheduled' AND starts_at >= $1
            ORDER BY starts_at ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit.clamp(1, MAX_UPCOMING))
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<Activity> {
        Ok(self.repository().select_id(id, "Activity").await?)
    }

    pub async fn create_one(&self, input: &ActivityInput) -> ServiceResult<Activity> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO activities (
                title, description, activity_type, starts_at, ends_at, location,
                organizer_member_id, society_id, committee_id, status, visitor_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(input.title.trim())
        .bind(clean(&input.description))
        .bind(input.activity_type.as_str())
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(clean(&input.location))
        .bind(input.organizer_member_id)
        .bind(input.society_id)
        .bind(input.committee_id)
        .bind(input.status.as_str())
        .bind(input.visitor_count)
        .fetch_one(&self.pool)
        .await?;
        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &ActivityInput) -> ServiceResult<Activity> {
        let result = sqlx::query(
            r#"
            UPDATE activities SET
                title = $2, description = $3, activity_type = $4, starts_at = $5, ends_at = $6,
                location = $7, organizer_member_id = $8, society_id = $9, committee_id = $10,
                status = $11, visitor_count = $12, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(clean(&input.description))
        .bind(input.activity_type.as_str())
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(clean(&input.location))
        .bind(input.organizer_member_id)
        .bind(input.society_id)
        .bind(input.committee_id)
        .bind(input.status.as_str())
        .bind(input.visitor_count)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Activity {} not found", id)));
        }
        self.select_404(id).await
    }

    /// Attendance rows cascade with the activity.
    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Activity {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn end_before_start_is_rejected() {
        let input: ActivityInput = serde_json::from_value(json!({
            "title": "Culto de oración",
            "starts_at": "2024-05-01T19:00:00Z",
            "ends_at": "2024-05-01T18:00:00Z"
        }))
        .unwrap();
        assert_eq!(input.activity_type, ActivityType::Other);
        assert_eq!(input.status, ActivityStatus::Scheduled);
        assert!(input.validate().unwrap_err().get("ends_at").is_some());
    }

    #[test]
    fn date_range_uses_exclusive_upper_day() {
        let query = ActivityListQuery {
            from: Some("2024-05-01".parse().unwrap()),
            to: Some("2024-05-31".parse().unwrap()),
            ..Default::default()
        };
        let map = query.conditions().into_map();
        assert_eq!(map["starts_at"], json!({ "$gte": "2024-05-01", "$lt": "2024-06-01" }));
    }
}
