use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use crate::auth::roles::{check_permission, ROLES_MEMBERSHIP, ROLES_MEMBERSHIP_READ};
use crate::database::models::{Committee, CommitteeMember};
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::committees::{
    CommitteeDetail, CommitteeInput, CommitteeListQuery, CommitteeMemberInput, CommitteeService, PositionInput,
};
use crate::validation::Validate;

pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<CommitteeListQuery>,
) -> ApiResult<Vec<Committee>> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let committees = CommitteeService::new(pool).list(query).await?;
    Ok(ApiResponse::success(committees))
}

/// GET /api/committees/:id - Committee with its roster
pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<CommitteeDetail> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let detail = CommitteeService::new(pool).detail_404(id).await?;
    Ok(ApiResponse::success(detail))
}

pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<CommitteeInput>) -> ApiResult<Committee> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let committee = CommitteeService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, committee_id = committee.id, "committee created");
    Ok(ApiResponse::created(committee))
}

pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<CommitteeInput>,
) -> ApiResult<Committee> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let committee = CommitteeService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, committee_id = id, "committee updated");
    Ok(ApiResponse::success(committee))
}

/// DELETE /api/committees/:id - Roster entries go with it
pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;

    let pool = DatabaseManager::pool()?;
    CommitteeService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, committee_id = id, "committee deleted");
    Ok(ApiResponse::no_content())
}

pub async fn roster(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Vec<CommitteeMember>> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let service = CommitteeService::new(pool);
    service.select_404(id).await?;
    let members = service.members(id).await?;
    Ok(ApiResponse::success(members))
}

/// POST /api/committees/:id/members
///
/// Expected Input:
/// ```json
/// { "member_id": 42, "position": "secretary", "joined_on": "2024-02-01" }
/// ```
pub async fn add_member(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<CommitteeMemberInput>,
) -> ApiResult<CommitteeMember> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let seat = CommitteeService::new(pool).add_member(id, &input).await?;

    tracing::info!(user = %auth.email, committee_id = id, member_id = input.member_id, position = %seat.position, "committee member added");
    Ok(ApiResponse::created(seat))
}

/// PUT /api/committees/:id/members/:member_id - Change a member's position
pub async fn update_member(
    Extension(auth): Extension<AuthUser>,
    Path((id, member_id)): Path<(i64, i64)>,
    Json(input): Json<PositionInput>,
) -> ApiResult<CommitteeMember> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;

    let pool = DatabaseManager::pool()?;
    let seat = CommitteeService::new(pool)
        .update_member_position(id, member_id, input.position)
        .await?;

    tracing::info!(user = %auth.email, committee_id = id, member_id, position = %input.position, "committee position changed");
    Ok(ApiResponse::success(seat))
}

pub async fn remove_member(
    Extension(auth): Extension<AuthUser>,
    Path((id, member_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;

    let pool = DatabaseManager::pool()?;
    CommitteeService::new(pool).remove_member(id, member_id).await?;

    tracing::info!(user = %auth.email, committee_id = id, member_id, "committee member removed");
    Ok(ApiResponse::no_content())
}
