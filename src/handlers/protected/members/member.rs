use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use std::collections::BTreeMap;

use crate::auth::roles::{check_permission, ROLES_ACTIVITIES_READ, ROLES_MEMBERSHIP, ROLES_MEMBERSHIP_READ};
use crate::database::models::{AttendanceRecord, CommitteeMember, Member};
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::attendance::AttendanceService;
use crate::services::committees::CommitteeService;
use crate::services::members::{MemberInput, MemberListQuery, MemberService};
use crate::validation::Validate;

/// GET /api/members - List members
///
/// Query: `status`, `home_group_id`, `search`, `order`, `limit`, `offset`.
pub async fn list(Extension(auth): Extension<AuthUser>, Query(query): Query<MemberListQuery>) -> ApiResult<Vec<Member>> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let members = MemberService::new(pool).list(query).await?;
    Ok(ApiResponse::success(members))
}

/// GET /api/members/stats - Member count per status
pub async fn stats(Extension(auth): Extension<AuthUser>) -> ApiResult<BTreeMap<String, i64>> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let counts = MemberService::new(pool).count_by_status().await?;
    Ok(ApiResponse::success(counts))
}

pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Member> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let member = MemberService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(member))
}

/// POST /api/members
pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<MemberInput>) -> ApiResult<Member> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let member = MemberService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, member_id = member.id, "member created");
    Ok(ApiResponse::created(member))
}

/// PUT /api/members/:id
pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<MemberInput>,
) -> ApiResult<Member> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let member = MemberService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, member_id = id, "member updated");
    Ok(ApiResponse::success(member))
}

/// DELETE /api/members/:id - 409 while other records still point at the member
pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;

    let pool = DatabaseManager::pool()?;
    MemberService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, member_id = id, "member deleted");
    Ok(ApiResponse::no_content())
}

/// GET /api/members/:id/committees - Committee seats held by the member
pub async fn committees(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Vec<CommitteeMember>> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    MemberService::new(pool.clone()).select_404(id).await?;
    let seats = CommitteeService::new(pool).committees_of_member(id).await?;
    Ok(ApiResponse::success(seats))
}

/// GET /api/members/:id/attendance - Attendance history, newest activity first
pub async fn attendance(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Vec<AttendanceRecord>> {
    check_permission(&auth, ROLES_ACTIVITIES_READ)?;

    let pool = DatabaseManager::pool()?;
    MemberService::new(pool.clone()).select_404(id).await?;
    let history = AttendanceService::new(pool).member_history(id).await?;
    Ok(ApiResponse::success(history))
}
