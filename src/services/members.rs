use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::collections::BTreeMap;

use super::{contains_pattern, Conditions, ServiceError, ServiceResult};
use crate::database::models::Member;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::{Gender, MemberStatus};
use crate::validation::{clean, FieldErrors, Validate, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

const DEFAULT_ORDER: &str = "last_name asc, first_name asc";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberListQuery {
    pub status: Option<MemberStatus>,
    pub home_group_id: Option<i64>,
    /// Case-insensitive match on first name, last name or document ID
    pub search: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub document_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    pub membership_date: Option<NaiveDate>,
    pub baptism_date: Option<NaiveDate>,
    pub home_group_id: Option<i64>,
    pub notes: Option<String>,
}

impl MemberInput {
    fn validate_on(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("first_name", &self.first_name, MAX_NAME_LENGTH);
        errors.require_text("last_name", &self.last_name, MAX_NAME_LENGTH);
        errors.optional_text("document_id", self.document_id.as_deref(), 30);
        errors.optional_text("phone", self.phone.as_deref(), 30);
        errors.optional_email("email", self.email.as_deref());
        errors.optional_text("address", self.address.as_deref(), MAX_TEXT_LENGTH);
        errors.optional_text("notes", self.notes.as_deref(), MAX_TEXT_LENGTH);
        errors.date_not_after("birth_date", self.birth_date, today);
        errors.date_not_after("membership_date", self.membership_date, today);
        errors.date_not_after("baptism_date", self.baptism_date, today);
        if let (Some(birth), Some(baptism)) = (self.birth_date, self.baptism_date) {
            if baptism < birth {
                errors.add("baptism_date", "Baptism date cannot be before birth date");
            }
        }
        errors.positive_id("home_group_id", self.home_group_id);
        errors.into_result()
    }
}

impl Validate for MemberInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_on(Utc::now().date_naive())
    }
}

pub struct MemberService {
    pool: PgPool,
}

impl MemberService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<Member> {
        Repository::new("member_details", self.pool.clone())
    }

    pub async fn list(&self, query: MemberListQuery) -> ServiceResult<Vec<Member>> {
        let mut conditions = Conditions::new()
            .eq("status", query.status.map(|s| s.as_str()))
            .eq("home_group_id", query.home_group_id);

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = contains_pattern(term);
            conditions = conditions.raw(
                "$or",
                json!([
                    { "first_name": { "$ilike": pattern } },
                    { "last_name": { "$ilike": pattern } },
                    { "document_id": { "$ilike": pattern } }
                ]),
            );
        }

        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            DEFAULT_ORDER,
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<Member> {
        Ok(self.repository().select_id(id, "Member").await?)
    }

    pub async fn create_one(&self, input: &MemberInput) -> ServiceResult<Member> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO members (
                first_name, last_name, document_id, birth_date, gender, phone, email, address,
                status, membership_date, baptism_date, home_group_id, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(clean(&input.document_id))
        .bind(input.birth_date)
        .bind(input.gender.map(|g| g.as_str()))
        .bind(clean(&input.phone))
        .bind(clean(&input.email).map(|e| e.to_lowercase()))
        .bind(clean(&input.address))
        .bind(input.status.as_str())
        .bind(input.membership_date)
        .bind(input.baptism_date)
        .bind(input.home_group_id)
        .bind(clean(&input.notes))
        .fetch_one(&self.pool)
        .await?;

        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &MemberInput) -> ServiceResult<Member> {
        let result = sqlx::query(
            r#"
            UPDATE members SET
                first_name = $2, last_name = $3, document_id = $4, birth_date = $5, gender = $6,
                phone = $7, email = $8, address = $9, status = $10, membership_date = $11,
                baptism_date = $12, home_group_id = $13, notes = $14, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(clean(&input.document_id))
        .bind(input.birth_date)
        .bind(input.gender.map(|g| g.as_str()))
        .bind(clean(&input.phone))
        .bind(clean(&input.email).map(|e| e.to_lowercase()))
        .bind(clean(&input.address))
        .bind(input.status.as_str())
        .bind(input.membership_date)
        .bind(input.baptism_date)
        .bind(input.home_group_id)
        .bind(clean(&input.notes))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Member {} not found", id)));
        }
        self.select_404(id).await
    }

    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Member {} not found", id)));
        }
        Ok(())
    }

    /// Member count per status, with every status present.
    pub async fn count_by_status(&self) -> ServiceResult<BTreeMap<String, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM members GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        Ok(status_counts(rows))
    }
}

fn status_counts(rows: Vec<(String, i64)>) -> BTreeMap<String, i64> {
    let mut counts: BTreeMap<String, i64> = MemberStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for (status, count) in rows {
        counts.insert(status, count);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn input() -> MemberInput {
        MemberInput {
            first_name: "Ana".to_string(),
            last_name: "Rojas".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_member_is_valid() {
        assert!(input().validate_on(date("2024-06-01")).is_ok());
    }

    #[test]
    fn names_are_required() {
        let member = MemberInput { first_name: " ".into(), last_name: String::new(), ..input() };
        let errors = member.validate_on(date("2024-06-01")).unwrap_err();
        assert_eq!(errors.get("first_name"), Some("This field is required"));
        assert_eq!(errors.get("last_name"), Some("This field is required"));
    }

    #[test]
    fn dates_are_checked() {
        let member = MemberInput {
            birth_date: Some(date("1990-05-01")),
            baptism_date: Some(date("1989-01-01")),
            membership_date: Some(date("2030-01-01")),
            ..input()
        };
        let errors = member.validate_on(date("2024-06-01")).unwrap_err();
        assert!(errors.get("baptism_date").is_some());
        assert!(errors.get("membership_date").is_some());
        assert!(errors.get("birth_date").is_none());
    }

    #[test]
    fn bad_email_is_rejected() {
        let member = MemberInput { email: Some("ana@".into()), ..input() };
        assert!(member.validate_on(date("2024-06-01")).unwrap_err().get("email").is_some());
    }

    #[test]
    fn status_counts_fill_missing_statuses() {
        let counts = status_counts(vec![("active".into(), 12), ("visitor".into(), 3)]);
        assert_eq!(counts.len(), MemberStatus::ALL.len());
        assert_eq!(counts["active"], 12);
        assert_eq!(counts["deceased"], 0);
    }

    #[test]
    fn payload_defaults_status_to_active() {
        let parsed: MemberInput = serde_json::from_value(json!({
            "first_name": "Luis",
            "last_name": "Paz",
            "gender": "male"
        }))
        .unwrap();
        assert_eq!(parsed.status, MemberStatus::Active);
        assert_eq!(parsed.gender, Some(Gender::Male));
    }
}
