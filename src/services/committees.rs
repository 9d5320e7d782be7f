use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::{Committee, CommitteeMember};
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::CommitteePosition;
use crate::validation::{clean, default_true, FieldErrors, Validate, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitteeListQuery {
    pub active: Option<bool>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitteeInput {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for CommitteeInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name, MAX_NAME_LENGTH);
        errors.optional_text("description", self.description.as_deref(), MAX_TEXT_LENGTH);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitteeMemberInput {
    #[serde(default)]
    pub member_id: i64,
    #[serde(default)]
    pub position: CommitteePosition,
    pub joined_on: Option<NaiveDate>,
}

impl Validate for CommitteeMemberInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.member_id <= 0 {
            errors.add("member_id", "A member is required");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionInput {
    pub position: CommitteePosition,
}

/// A committee together with its roster.
#[derive(Debug, Clone, Serialize)]
pub struct CommitteeDetail {
    #[serde(flatten)]
    pub committee: Committee,
    pub members: Vec<CommitteeMember>,
}

pub struct CommitteeService {
    pool: PgPool,
}

impl CommitteeService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<Committee> {
        Repository::new("committees", self.pool.clone())
    }

    fn roster(&self) -> Repository<CommitteeMember> {
        Repository::new("committee_member_details", self.pool.clone())
    }

    pub async fn list(&self, query: CommitteeListQuery) -> ServiceResult<Vec<Committee>> {
        let conditions = Conditions::new().eq("is_active", query.active);
        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            "name asc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<Committee> {
        Ok(self.repository().select_id(id, "Committee").await?)
    }

    pub async fn detail_404(&self, id: i64) -> ServiceResult<CommitteeDetail> {
        let committee = self.select_404(id).await?;
        let members = self.members(id).await?;
        Ok(CommitteeDetail { committee, members })
    }

    pub async fn create_one(&self, input: &CommitteeInput) -> ServiceResult<Committee> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO committees (name, description, is_active) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(input.name.trim())
        .bind(clean(&input.description))
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;
        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &CommitteeInput) -> ServiceResult<Committee> {
        let result = sqlx::query(
            "UPDATE committees SET name = $2, description = $3, is_active = $4, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(clean(&input.description))
        .bind(input.is_active)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Committee {} not found", id)));
        }
        self.select_404(id).await
    }

    /// Membership rows cascade with the committee.
    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM committees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Committee {} not found", id)));
        }
        Ok(())
    }

    pub async fn members(&self, committee_id: i64) -> ServiceResult<Vec<CommitteeMember>> {
        let filter = FilterData::conditions(Conditions::new().eq("committee_id", Some(committee_id)).into_map())
            .ordered("member_name asc");
        Ok(self.roster().select_any(filter).await?)
    }

    pub async fn add_member(&self, committee_id: i64, input: &CommitteeMemberInput) -> ServiceResult<CommitteeMember> {
        self.select_404(committee_id).await?;
        sqlx::query(
            r#"
            INSERT INTO committee_members (committee_id, member_id, position, joined_on)
            VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE))
            "#,
        )
        .bind(committee_id)
        .bind(input.member_id)
        .bind(input.position.as_str())
        .bind(input.joined_on)
        .execute(&self.pool)
        .await?;
        self.membership_404(committee_id, input.member_id).await
    }

    pub async fn update_member_position(
        &self,
        committee_id: i64,
        member_id: i64,
        position: CommitteePosition,
    ) -> ServiceResult<CommitteeMember> {
        let result = sqlx::query(
            "UPDATE committee_members SET position = $3 WHERE committee_id = $1 AND member_id = $2",
        )
        .bind(committee_id)
        .bind(member_id)
        .bind(position.as_str())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(not_on_committee(committee_id, member_id));
        }
        self.membership_404(committee_id, member_id).await
    }

    pub async fn remove_member(&self, committee_id: i64, member_id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM committee_members WHERE committee_id = $1 AND member_id = $2")
            .bind(committee_id)
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_on_committee(committee_id, member_id));
        }
        Ok(())
    }

    pub async fn committees_of_member(&self, member_id: i64) -> ServiceResult<Vec<CommitteeMember>> {
        let filter = FilterData::conditions(Conditions::new().eq("member_id", Some(member_id)).into_map())
            .ordered("committee_name asc");
        Ok(self.roster().select_any(filter).await?)
    }

    async fn membership_404(&self, committee_id: i64, member_id: i64) -> ServiceResult<CommitteeMember> {
        let filter = FilterData::conditions(
            Conditions::new()
                .eq("committee_id", Some(committee_id))
                .eq("member_id", Some(member_id))
                .into_map(),
        );
        self.roster()
            .select_one(filter)
            .await?
            .ok_or_else(|| not_on_committee(committee_id, member_id))
    }
}

fn not_on_committee(committee_id: i64, member_id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Member {} is not on committee {}", member_id, committee_id))
}
