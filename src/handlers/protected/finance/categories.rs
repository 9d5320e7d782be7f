use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use crate::auth::roles::{check_permission, ROLES_FINANCE_READ, ROLES_FINANCE};
use crate::database::models::Category;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::categories::{CategoryInput, CategoryListQuery, CategoryService};
use crate::validation::Validate;

/// GET /api/categories - Query: `kind`, `active`
pub async fn list(Extension(auth): Extension<AuthUser>, Query(query): Query<CategoryListQuery>) -> ApiResult<Vec<Category>> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let rows = CategoryService::new(pool).list(query).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Category> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let row = CategoryService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(row))
}

pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<CategoryInput>) -> ApiResult<Category> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let row = CategoryService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, category_id = row.id, "category created");
    Ok(ApiResponse::created(row))
}

/// PUT /api/categories/:id - The kind is fixed once transactions use the category
pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<CategoryInput>,
) -> ApiResult<Category> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let row = CategoryService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, category_id = id, "category updated");
    Ok(ApiResponse::success(row))
}

/// DELETE /api/categories/:id - 409 while transactions reference it; budgets go with it
pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_FINANCE)?;

    let pool = DatabaseManager::pool()?;
    CategoryService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, category_id = id, "category deleted");
    Ok(ApiResponse::no_content())
}
