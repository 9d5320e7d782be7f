use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use crate::auth::roles::{check_permission, ROLES_MEMBERSHIP, ROLES_MEMBERSHIP_READ};
use crate::database::models::Deacon;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::deacons::{DeaconInput, DeaconListQuery, DeaconService};
use crate::validation::Validate;

pub async fn list(Extension(auth): Extension<AuthUser>, Query(query): Query<DeaconListQuery>) -> ApiResult<Vec<Deacon>> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let deacons = DeaconService::new(pool).list(query).await?;
    Ok(ApiResponse::success(deacons))
}

pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Deacon> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let deacon = DeaconService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(deacon))
}

/// POST /api/deacons - 409 when the member is already a deacon
pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<DeaconInput>) -> ApiResult<Deacon> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let deacon = DeaconService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, deacon_id = deacon.id, member_id = deacon.member_id, "deacon registered");
    Ok(ApiResponse::created(deacon))
}

pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<DeaconInput>,
) -> ApiResult<Deacon> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let deacon = DeaconService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, deacon_id = id, "deacon updated");
    Ok(ApiResponse::success(deacon))
}

pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;

    let pool = DatabaseManager::pool()?;
    DeaconService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, deacon_id = id, "deacon removed");
    Ok(ApiResponse::no_content())
}
