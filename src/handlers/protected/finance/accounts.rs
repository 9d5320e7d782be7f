use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use crate::auth::roles::{check_permission, ROLES_FINANCE_READ, ROLES_FINANCE};
use crate::database::models::BankAccount;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::accounts::{AccountInput, AccountListQuery, AccountService};
use crate::validation::Validate;

pub async fn list(Extension(auth): Extension<AuthUser>, Query(query): Query<AccountListQuery>) -> ApiResult<Vec<BankAccount>> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let rows = AccountService::new(pool).list(query).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<BankAccount> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let row = AccountService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(row))
}

/// POST /api/accounts - The balance starts at `opening_balance`
pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<AccountInput>) -> ApiResult<BankAccount> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let row = AccountService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, account_id = row.id, "bank account created");
    Ok(ApiResponse::created(row))
}

/// PUT /api/accounts/:id - Metadata only; balances move through transactions
pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<AccountInput>,
) -> ApiResult<BankAccount> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let row = AccountService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, account_id = id, "bank account updated");
    Ok(ApiResponse::success(row))
}

pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_FINANCE)?;

    let pool = DatabaseManager::pool()?;
    AccountService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, account_id = id, "bank account deleted");
    Ok(ApiResponse::no_content())
}
