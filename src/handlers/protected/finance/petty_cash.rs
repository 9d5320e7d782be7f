use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use crate::auth::roles::{check_permission, ROLES_FINANCE, ROLES_FINANCE_READ};
use crate::database::models::PettyCashFund;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::petty_cash::{PettyCashInput, PettyCashListQuery, PettyCashService, ReplenishInput};
use crate::validation::Validate;

pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PettyCashListQuery>,
) -> ApiResult<Vec<PettyCashFund>> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let funds = PettyCashService::new(pool).list(query).await?;
    Ok(ApiResponse::success(funds))
}

pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<PettyCashFund> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let fund = PettyCashService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(fund))
}

/// POST /api/petty-cash - The balance starts at `assigned_amount`
pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<PettyCashInput>) -> ApiResult<PettyCashFund> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let fund = PettyCashService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, petty_cash_id = fund.id, custodian = fund.custodian_member_id, "petty cash fund created");
    Ok(ApiResponse::created(fund))
}

pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<PettyCashInput>,
) -> ApiResult<PettyCashFund> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let fund = PettyCashService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, petty_cash_id = id, "petty cash fund updated");
    Ok(ApiResponse::success(fund))
}

pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_FINANCE)?;

    let pool = DatabaseManager::pool()?;
    PettyCashService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, petty_cash_id = id, "petty cash fund deleted");
    Ok(ApiResponse::no_content())
}

/// POST /api/petty-cash/:id/replenish - Top up a fund
///
/// Expected Input:
/// ```json
/// { "amount": "150.00", "from_account_id": 2 }
/// ```
///
/// With `from_account_id` the same amount is withdrawn from that account in
/// the same database transaction.
pub async fn replenish(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<ReplenishInput>,
) -> ApiResult<PettyCashFund> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let fund = PettyCashService::new(pool).replenish(id, &input).await?;

    tracing::info!(
        user = %auth.email,
        petty_cash_id = id,
        amount = %input.amount,
        from_account = ?input.from_account_id,
        "petty cash replenished"
    );
    Ok(ApiResponse::success(fund))
}
