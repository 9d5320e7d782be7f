use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::roles::{check_permission, ROLES_ACTIVITIES, ROLES_ACTIVITIES_READ};
use crate::database::models::Activity;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::activities::{ActivityInput, ActivityListQuery, ActivityService};
use crate::validation::Validate;

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<i64>,
}

/// GET /api/activities - Query: `status`, `activity_type`, `from`, `to`, `society_id`, `committee_id`
pub async fn list(Extension(auth): Extension<AuthUser>, Query(query): Query<ActivityListQuery>) -> ApiResult<Vec<Activity>> {
    check_permission(&auth, ROLES_ACTIVITIES_READ)?;

    let pool = DatabaseManager::pool()?;
    let activities = ActivityService::new(pool).list(query).await?;
    Ok(ApiResponse::success(activities))
}

/// GET /api/activities/upcoming - Scheduled activities from now on, soonest first
pub async fn upcoming(Extension(auth): Extension<AuthUser>, Query(query): Query<UpcomingQuery>) -> ApiResult<Vec<Activity>> {
    check_permission(&auth, ROLES_ACTIVITIES_READ)?;

    let pool = DatabaseManager::pool()?;
    let activities = ActivityService::new(pool)
        .upcoming(Utc::now(), query.limit.unwrap_or(10))
        .await?;
    Ok(ApiResponse::success(activities))
}

pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Activity> {
    check_permission(&auth, ROLES_ACTIVITIES_READ)?;

    let pool = DatabaseManager::pool()?;
    let activity = ActivityService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(activity))
}

pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<ActivityInput>) -> ApiResult<Activity> {
    check_permission(&auth, ROLES_ACTIVITIES)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let activity = ActivityService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, activity_id = activity.id, "activity created");
    Ok(ApiResponse::created(activity))
}

pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<ActivityInput>,
) -> ApiResult<Activity> {
    check_permission(&auth, ROLES_ACTIVITIES)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let activity = ActivityService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, activity_id = id, status = %activity.status, "activity updated");
    Ok(ApiResponse::success(activity))
}

pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_ACTIVITIES)?;

    let pool = DatabaseManager::pool()?;
    ActivityService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, activity_id = id, "activity deleted");
    Ok(ApiResponse::no_content())
}
