//! Balance bookkeeping against a live Postgres (skipped without DATABASE_URL).
mod common;

use anyhow::Result;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use congrega_api::database::models::{Member, Transaction};
use congrega_api::services::accounts::{AccountInput, AccountService};
use congrega_api::services::categories::{CategoryInput, CategoryService};
use congrega_api::services::members::{MemberInput, MemberService};
use congrega_api::services::petty_cash::{PettyCashInput, PettyCashService};
use congrega_api::services::transactions::{TransactionInput, TransactionService, INSUFFICIENT_PETTY_CASH};
use congrega_api::services::ServiceError;

fn input<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

async fn member(pool: &PgPool) -> Result<Member> {
    let input: MemberInput = input(json!({ "first_name": "Rut", "last_name": common::unique("Moabita") }))?;
    Ok(MemberService::new(pool.clone()).create_one(&input).await?)
}

async fn category(pool: &PgPool, kind: &str, is_tithe: bool) -> Result<i64> {
    let input: CategoryInput = input(json!({ "name": common::unique("Categoria"), "kind": kind, "is_tithe": is_tithe }))?;
    Ok(CategoryService::new(pool.clone()).create_one(&input).await?.id)
}

async fn account(pool: &PgPool, opening: Decimal) -> Result<i64> {
    let input: AccountInput = input(json!({
        "name": common::unique("Cuenta"),
        "bank_name": "Banco Central",
        "account_number": Uuid::new_v4().simple().to_string(),
        "account_type": "checking",
        "opening_balance": opening,
    }))?;
    Ok(AccountService::new(pool.clone()).create_one(&input).await?.id)
}

async fn balance(pool: &PgPool, account_id: i64) -> Result<Decimal> {
    Ok(AccountService::new(pool.clone()).select_404(account_id).await?.balance)
}

async fn record(pool: &PgPool, value: Value) -> Result<Transaction, ServiceError> {
    let input: TransactionInput = serde_json::from_value(value).expect("valid transaction payload");
    TransactionService::new(pool.clone()).create_one(&input, Uuid::nil()).await
}

#[tokio::test]
async fn moving_and_deleting_transactions_restores_balances() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let expense = category(&pool, "expense", false).await?;
    let a = account(&pool, dec!(100)).await?;
    let b = account(&pool, dec!(100)).await?;

    let t = record(&pool, json!({
        "kind": "expense", "category_id": expense, "bank_account_id": a,
        "amount": "20.00", "transaction_date": "2024-03-03"
    }))
    .await?;
    assert_eq!(balance(&pool, a).await?, dec!(80));

    let moved: TransactionInput = input(json!({
        "kind": "expense", "category_id": expense, "bank_account_id": b,
        "amount": "20.00", "transaction_date": "2024-03-03"
    }))?;
    TransactionService::new(pool.clone()).update_404(t.id, &moved).await?;
    assert_eq!(balance(&pool, a).await?, dec!(100));
    assert_eq!(balance(&pool, b).await?, dec!(80));

    TransactionService::new(pool.clone()).delete_404(t.id).await?;
    assert_eq!(balance(&pool, a).await?, dec!(100));
    assert_eq!(balance(&pool, b).await?, dec!(100));
    Ok(())
}

#[tokio::test]
async fn income_raises_the_account_balance() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let offering = category(&pool, "income", false).await?;
    let a = account(&pool, dec!(10)).await?;

    record(&pool, json!({
        "kind": "income", "category_id": offering, "bank_account_id": a,
        "amount": "15.50", "transaction_date": "2024-03-03"
    }))
    .await?;
    assert_eq!(balance(&pool, a).await?, dec!(25.50));
    Ok(())
}

#[tokio::test]
async fn petty_cash_cannot_be_overdrawn() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let custodian = member(&pool).await?;
    let expense = category(&pool, "expense", false).await?;
    let fund_input: PettyCashInput = input(json!({
        "name": common::unique("Caja chica"),
        "custodian_member_id": custodian.id,
        "assigned_amount": "50.00",
    }))?;
    let funds = PettyCashService::new(pool.clone());
    let fund = funds.create_one(&fund_input).await?;

    let err = record(&pool, json!({
        "kind": "expense", "category_id": expense, "petty_cash_id": fund.id,
        "amount": "80.00", "transaction_date": "2024-03-03"
    }))
    .await
    .unwrap_err();
    assert!(matches!(&err, ServiceError::Conflict(msg) if msg == INSUFFICIENT_PETTY_CASH));
    assert_eq!(common::status_of(err), StatusCode::CONFLICT);
    assert_eq!(funds.select_404(fund.id).await?.balance, dec!(50));

    record(&pool, json!({
        "kind": "expense", "category_id": expense, "petty_cash_id": fund.id,
        "amount": "50.00", "transaction_date": "2024-03-03"
    }))
    .await?;
    assert_eq!(funds.select_404(fund.id).await?.balance, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn tithes_require_a_member() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let tithe = category(&pool, "income", true).await?;
    let a = account(&pool, dec!(0)).await?;

    let err = record(&pool, json!({
        "kind": "income", "category_id": tithe, "bank_account_id": a,
        "amount": "30.00", "transaction_date": "2024-03-03"
    }))
    .await
    .unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::BAD_REQUEST);
    assert_eq!(balance(&pool, a).await?, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn member_with_giving_history_cannot_be_deleted() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let giver = member(&pool).await?;
    let tithe = category(&pool, "income", true).await?;
    let a = account(&pool, dec!(0)).await?;

    let t = record(&pool, json!({
        "kind": "income", "category_id": tithe, "member_id": giver.id, "bank_account_id": a,
        "amount": "30.00", "transaction_date": "2024-03-03"
    }))
    .await?;

    let members = MemberService::new(pool.clone());
    let err = members.delete_404(giver.id).await.unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::CONFLICT);

    let kept = TransactionService::new(pool.clone()).select_404(t.id).await?;
    assert_eq!(kept.member_id, Some(giver.id));
    assert!(kept.is_tithe);
    assert!(members.select_404(giver.id).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn petty_cash_custodian_cannot_be_deleted() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let custodian = member(&pool).await?;
    let fund_input: PettyCashInput = input(json!({
        "name": common::unique("Caja chica"),
        "custodian_member_id": custodian.id,
        "assigned_amount": "20.00",
    }))?;
    PettyCashService::new(pool.clone()).create_one(&fund_input).await?;

    let err = MemberService::new(pool.clone()).delete_404(custodian.id).await.unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::CONFLICT);
    Ok(())
}
