use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use crate::auth::roles::{check_permission, ROLES_MEMBERSHIP, ROLES_MEMBERSHIP_READ};
use crate::database::models::{Society, SocietyLeader};
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::societies::{LeaderInput, LeaderUpdate, SocietyDetail, SocietyInput, SocietyListQuery, SocietyService};
use crate::validation::Validate;

/// GET /api/societies - Query: `kind`, `active`
pub async fn list(Extension(auth): Extension<AuthUser>, Query(query): Query<SocietyListQuery>) -> ApiResult<Vec<Society>> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let societies = SocietyService::new(pool).list(query).await?;
    Ok(ApiResponse::success(societies))
}

/// GET /api/societies/:id - Society with its leadership roster
pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<SocietyDetail> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let detail = SocietyService::new(pool).detail_404(id).await?;
    Ok(ApiResponse::success(detail))
}

pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<SocietyInput>) -> ApiResult<Society> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let society = SocietyService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, society_id = society.id, "society created");
    Ok(ApiResponse::created(society))
}

pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<SocietyInput>,
) -> ApiResult<Society> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let society = SocietyService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, society_id = id, "society updated");
    Ok(ApiResponse::success(society))
}

pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;

    let pool = DatabaseManager::pool()?;
    SocietyService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, society_id = id, "society deleted");
    Ok(ApiResponse::no_content())
}

/// POST /api/societies/:id/leaders
///
/// Expected Input:
/// ```json
/// { "member_id": 8, "position": "president", "term_start": "2024-01-01", "term_end": "2025-12-31" }
/// ```
pub async fn add_leader(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<LeaderInput>,
) -> ApiResult<SocietyLeader> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let leader = SocietyService::new(pool).add_leader(id, &input).await?;

    tracing::info!(user = %auth.email, society_id = id, leader_id = leader.id, "society leader added");
    Ok(ApiResponse::created(leader))
}

pub async fn update_leader(
    Extension(auth): Extension<AuthUser>,
    Path((id, leader_id)): Path<(i64, i64)>,
    Json(input): Json<LeaderUpdate>,
) -> ApiResult<SocietyLeader> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let leader = SocietyService::new(pool).update_leader(id, leader_id, &input).await?;

    tracing::info!(user = %auth.email, society_id = id, leader_id, "society leader updated");
    Ok(ApiResponse::success(leader))
}

pub async fn remove_leader(
    Extension(auth): Extension<AuthUser>,
    Path((id, leader_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;

    let pool = DatabaseManager::pool()?;
    SocietyService::new(pool).remove_leader(id, leader_id).await?;

    tracing::info!(user = %auth.email, society_id = id, leader_id, "society leader removed");
    Ok(ApiResponse::no_content())
}
