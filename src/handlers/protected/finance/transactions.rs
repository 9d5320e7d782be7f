use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use crate::auth::roles::{check_permission, ROLES_FINANCE, ROLES_FINANCE_READ};
use crate::database::models::Transaction;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::transactions::{TransactionInput, TransactionListQuery, TransactionService};
use crate::validation::Validate;

/// GET /api/transactions - List income and expenses
///
/// Query: `kind`, `category_id`, `member_id`, `bank_account_id`,
/// `petty_cash_id`, `from`, `to` (inclusive dates), `order`, `limit`, `offset`.
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<TransactionListQuery>,
) -> ApiResult<Vec<Transaction>> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let transactions = TransactionService::new(pool).list(query).await?;
    Ok(ApiResponse::success(transactions))
}

pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<Transaction> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let transaction = TransactionService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(transaction))
}

/// POST /api/transactions - Record income or an expense
///
/// Expected Input:
/// ```json
/// {
///   "kind": "income", "category_id": 1, "member_id": 42, "bank_account_id": 2,
///   "amount": "250.00", "transaction_date": "2024-03-03", "payment_method": "transfer"
/// }
/// ```
///
/// Moves the balance of the account or petty cash fund it names.
pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<TransactionInput>) -> ApiResult<Transaction> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let transaction = TransactionService::new(pool).create_one(&input, auth.id).await?;

    tracing::info!(
        user = %auth.email,
        transaction_id = transaction.id,
        kind = %transaction.kind,
        amount = %transaction.amount,
        "transaction recorded"
    );
    Ok(ApiResponse::created(transaction))
}

/// PUT /api/transactions/:id - Replaces the previous balance effect with the new one
pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<TransactionInput>,
) -> ApiResult<Transaction> {
    check_permission(&auth, ROLES_FINANCE)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let transaction = TransactionService::new(pool).update_404(id, &input).await?;

    tracing::info!(user = %auth.email, transaction_id = id, amount = %transaction.amount, "transaction updated");
    Ok(ApiResponse::success(transaction))
}

/// DELETE /api/transactions/:id - Reverses the balance effect
pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<i64>) -> ApiResult<()> {
    check_permission(&auth, ROLES_FINANCE)?;

    let pool = DatabaseManager::pool()?;
    TransactionService::new(pool).delete_404(id).await?;

    tracing::info!(user = %auth.email, transaction_id = id, "transaction deleted");
    Ok(ApiResponse::no_content())
}
