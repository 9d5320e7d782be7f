use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use crate::auth::roles::{check_permission, ROLES_MEMBERSHIP, ROLES_MEMBERSHIP_READ};
use crate::database::models::{HomeGroup, Member};
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::home_groups::{HomeGroupInput, HomeGroupListQuery, HomeGroupService};
use crate::validation::Validate;

/// GET /api/home-groups - List home fellowship locations
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<HomeGroupListQuery>,
) -> ApiResult<Vec<HomeGroup>> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let groups = HomeGroupService::new(pool).list(query).await?;
    Ok(ApiResponse::success(groups))
}

pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<HomeGroup> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let group = HomeGroupService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(group))
}

pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<HomeGroupInput>) -> ApiResult<HomeGroup> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let group = HomeGroupService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, home_group_id = group.id, "home group created");
    Ok(ApiResponse::created(group))
}

pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<HomeGroupInput>,
) -> ApiResult<HomeGroup> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let group = HomeGroupService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, home_group_id = id, "home group updated");
    Ok(ApiResponse::success(group))
}

/// DELETE /api/home-groups/:id - Assigned members stay, unassigned
pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_MEMBERSHIP)?;

    let pool = DatabaseManager::pool()?;
    HomeGroupService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, home_group_id = id, "home group deleted");
    Ok(ApiResponse::no_content())
}

/// GET /api/home-groups/:id/members
pub async fn members(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Vec<Member>> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let members = HomeGroupService::new(pool).members(id).await?;
    Ok(ApiResponse::success(members))
}
