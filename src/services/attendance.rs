use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::AttendanceRecord;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::ActivityStatus;
use crate::validation::{clean, default_true, FieldErrors, Validate, MAX_TEXT_LENGTH};

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceEntry {
    pub member_id: i64,
    #[serde(default = "default_true")]
    pub present: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceInput {
    #[serde(default)]
    pub entries: Vec<AttendanceEntry>,
    pub visitor_count: Option<i32>,
}

impl Validate for AttendanceInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.entries.is_empty() && self.visitor_count.is_none() {
            errors.add("entries", "Record at least one member or a visitor count");
        }
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.member_id <= 0 {
                errors.add("entries", "Every entry needs a member");
            } else if !seen.insert(entry.member_id) {
                errors.add("entries", format!("Member {} appears more than once", entry.member_id));
            }
            errors.optional_text("entries", entry.notes.as_deref(), MAX_TEXT_LENGTH);
        }
        if matches!(self.visitor_count, Some(v) if v < 0) {
            errors.add("visitor_count", "Visitor count cannot be negative");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub activity_id: i64,
    pub present: i64,
    pub absent: i64,
    pub visitors: i64,
    pub total_recorded: i64,
    /// Present members over recorded members, in percent; `None` with no records
    pub attendance_rate: Option<Decimal>,
}

impl AttendanceSummary {
    pub fn compute(activity_id: i64, present: i64, absent: i64, visitors: i64) -> Self {
        let total_recorded = present + absent;
        let attendance_rate = if total_recorded == 0 {
            None
        } else {
            Some((Decimal::from(present) * Decimal::ONE_HUNDRED / Decimal::from(total_recorded)).round_dp(2))
        };
        Self { activity_id, present, absent, visitors, total_recorded, attendance_rate }
    }
}

pub struct AttendanceService {
    pool: PgPool,
}

impl AttendanceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<AttendanceRecord> {
        Repository::new("attendance_details", self.pool.clone())
    }

    /// Upserts the entries and, when given, the visitor count.
    pub async fn record(&self, activity_id: i64, input: &AttendanceInput) -> ServiceResult<Vec<AttendanceRecord>> {
        let mut tx = self.pool.begin().await?;

        let status: Option<String> = sqlx::query_scalar("SELECT status FROM activities WHERE id = $1 FOR UPDATE")
            .bind(activity_id)
            .fetch_optional(&mut *tx)
            .await?;
        match status {
            None => return Err(activity_not_found(activity_id)),
            Some(s) if s == ActivityStatus::Cancelled.as_str() => {
                return Err(ServiceError::Conflict(
                    "Attendance cannot be recorded for a cancelled activity".to_string(),
                ))
            }
            Some(_) => {}
        }

        for entry in &input.entries {
            sqlx::query(
                r#"
                INSERT INTO attendance (activity_id, member_id, present, notes)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (activity_id, member_id)
                DO UPDATE SET present = EXCLUDED.present, notes = EXCLUDED.notes, recorded_at = now()
                "#,
            )
            .bind(activity_id)
            .bind(entry.member_id)
            .bind(entry.present)
            .bind(clean(&entry.notes))
            .execute(&mut *tx)
            .await?;
        }

        if let Some(visitors) = input.visitor_count {
            sqlx::query("UPDATE activities SET visitor_count = $2, updated_at = now() WHERE id = $1")
                .bind(activity_id)
                .bind(visitors)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.list(activity_id).await
    }

    pub async fn list(&self, activity_id: i64) -> ServiceResult<Vec<AttendanceRecord>> {
        let filter = FilterData::conditions(Conditions::new().eq("activity_id", Some(activity_id)).into_map())
            .ordered("member_name asc");
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn remove(&self, activity_id: i64, member_id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM attendance WHERE activity_id = $1 AND member_id = $2")
            .bind(activity_id)
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!(
                "No attendance recorded for member {} at activity {}",
                member_id, activity_id
            )));
        }
        Ok(())
    }

    pub async fn summary(&self, activity_id: i64) -> ServiceResult<AttendanceSummary> {
        let visitors: Option<i32> = sqlx::query_scalar("SELECT visitor_count FROM activities WHERE id = $1")
            .bind(activity_id)
            .fetch_optional(&self.pool)
            .await?;
        let visitors = visitors.ok_or_else(|| activity_not_found(activity_id))?;

        let (present, absent): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE present),
                COUNT(*) FILTER (WHERE NOT present)
            FROM attendance
            WHERE activity_id = $1
            "#,
        )
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AttendanceSummary::compute(activity_id, present, absent, visitors as i64))
    }

    pub async fn member_history(&self, member_id: i64) -> ServiceResult<Vec<AttendanceRecord>> {
        let filter = FilterData::conditions(Conditions::new().eq("member_id", Some(member_id)).into_map())
            .ordered("activity_starts_at desc");
        Ok(self.repository().select_any(filter).await?)
    }
}

fn activity_not_found(activity_id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Activity {} not found", activity_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn summary_rate_is_rounded() {
        let summary = AttendanceSummary::compute(1, 2, 1, 4);
        assert_eq!(summary.total_recorded, 3);
        assert_eq!(summary.attendance_rate, Some(dec!(66.67)));
        assert_eq!(summary.visitors, 4);
    }

    #[test]
    fn summary_without_records_has_no_rate() {
        let summary = AttendanceSummary::compute(1, 0, 0, 12);
        assert_eq!(summary.attendance_rate, None);
    }

    #[test]
    fn duplicate_members_are_rejected() {
        let input: AttendanceInput = serde_json::from_value(json!({
            "entries": [ { "member_id": 3 }, { "member_id": 3, "present": false } ]
        }))
        .unwrap();
        assert_eq!(input.validate().unwrap_err().get("entries"), Some("Member 3 appears more than once"));
    }

    #[test]
    fn visitor_count_alone_is_enough() {
        let input: AttendanceInput = serde_json::from_value(json!({ "visitor_count": 7 })).unwrap();
        assert!(input.validate().is_ok());
        assert!(AttendanceInput::default().validate().is_err());
    }
}
