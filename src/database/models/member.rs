use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the `member_details` view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub document_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub membership_date: Option<NaiveDate>,
    pub baptism_date: Option<NaiveDate>,
    pub home_group_id: Option<i64>,
    pub home_group_name: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `home_group_details` view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HomeGroup {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub host_member_id: Option<i64>,
    pub host_name: Option<String>,
    pub leader_member_id: Option<i64>,
    pub leader_name: Option<String>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<NaiveTime>,
    pub is_active: bool,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
