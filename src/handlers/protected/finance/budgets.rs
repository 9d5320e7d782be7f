use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use crate::auth::roles::{check_permission, ROLES_FINANCE_READ, ROLES_FINANCE};
use crate::database::models::Budget;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::budgets::{BudgetInput, BudgetListQuery, BudgetService};
use crate::validation::Validate;

/// GET /api/budgets - Query: `year`, `month`, `category_id`
pub async fn list(Extension(auth): Extension<AuthUser>, Query(query): Query<BudgetListQuery>) -> ApiResult<Vec<Budget>> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let rows = BudgetService::new(pool).list(query).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Budget> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let row = BudgetService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(row))
}

/// POST /api/budgets - Omit `month` for an annual budget
pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<BudgetInput>) -> ApiResult<Budget> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let row = BudgetService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, budget_id = row.id, "budget created");
    Ok(ApiResponse::created(row))
}

pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<BudgetInput>,
) -> ApiResult<Budget> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let row = BudgetService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, budget_id = id, "budget updated");
    Ok(ApiResponse::success(row))
}

pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_FINANCE)?;

    let pool = DatabaseManager::pool()?;
    BudgetService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, budget_id = id, "budget deleted");
    Ok(ApiResponse::no_content())
}
