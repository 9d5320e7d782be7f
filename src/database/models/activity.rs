use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub activity_type: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub organizer_member_id: Option<i64>,
    pub society_id: Option<i64>,
    pub committee_id: Option<i64>,
    pub status: String,
    pub visitor_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `attendance_details` view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub activity_id: i64,
    pub activity_title: String,
    pub activity_starts_at: DateTime<Utc>,
    pub member_id: i64,
    pub member_name: String,
    pub present: bool,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
