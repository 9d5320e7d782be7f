use axum::{extract::Path, Extension, Json};

use crate::auth::roles::{check_permission, ROLES_ACTIVITIES, ROLES_ACTIVITIES_READ};
use crate::database::models::AttendanceRecord;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::attendance::{AttendanceInput, AttendanceService, AttendanceSummary};
use crate::validation::Validate;

/// GET /api/activities/:id/attendance
pub async fn list(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Vec<AttendanceRecord>> {
    check_permission(&auth, ROLES_ACTIVITIES_READ)?;

    let pool = DatabaseManager::pool()?;
    let records = AttendanceService::new(pool).list(id).await?;
    Ok(ApiResponse::success(records))
}

/// POST /api/activities/:id/attendance - Record or correct attendance
///
/// Expected Input:
/// ```json
/// {
///   "entries": [ { "member_id": 4, "present": true }, { "member_id": 9, "present": false, "notes": "viaje" } ],
///   "visitor_count": 6
/// }
/// ```
///
/// Entries are upserted per member. Cancelled activities answer 409.
pub async fn record(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<AttendanceInput>,
) -> ApiResult<Vec<AttendanceRecord>> {
    check_permission(&auth, ROLES_ACTIVITIES)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let records = AttendanceService::new(pool).record(id, &input).await?;

    tracing::info!(user = %auth.email, activity_id = id, entries = input.entries.len(), "attendance recorded");
    Ok(ApiResponse::success(records))
}

/// GET /api/activities/:id/attendance/summary
pub async fn summary(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<AttendanceSummary> {
    check_permission(&auth, ROLES_ACTIVITIES_READ)?;

    let pool = DatabaseManager::pool()?;
    let summary = AttendanceService::new(pool).summary(id).await?;
    Ok(ApiResponse::success(summary))
}

pub async fn remove(
    Extension(auth): Extension<AuthUser>,
    Path((id, member_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    check_permission(&auth, ROLES_ACTIVITIES)?;

    let pool = DatabaseManager::pool()?;
    AttendanceService::new(pool).remove(id, member_id).await?;

    tracing::info!(user = %auth.email, activity_id = id, member_id, "attendance entry removed");
    Ok(ApiResponse::no_content())
}
