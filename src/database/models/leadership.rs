use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Committee {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `committee_member_details` view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommitteeMember {
    pub committee_id: i64,
    pub committee_name: String,
    pub member_id: i64,
    pub member_name: String,
    pub position: String,
    pub joined_on: NaiveDate,
}

/// Row of the `deacon_details` view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deacon {
    pub id: i64,
    pub member_id: i64,
    pub member_name: String,
    pub member_phone: Option<String>,
    pub ministry: Option<String>,
    pub ordained_on: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Society {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `society_leader_details` view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SocietyLeader {
    pub id: i64,
    pub society_id: i64,
    pub society_name: String,
    pub member_id: i64,
    pub member_name: String,
    pub position: String,
    pub term_start: Option<NaiveDate>,
    pub term_end: Option<NaiveDate>,
}
