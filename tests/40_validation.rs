mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use congrega_api::auth::Role;
use serde_json::{json, Value};

async fn post(uri: &str, role: Role, body: Value) -> Result<(StatusCode, Value)> {
    let token = common::token_for(role);
    common::call(Method::POST, uri, Some(&token), Some(body)).await
}

#[tokio::test]
async fn member_needs_names() -> Result<()> {
    let (status, body) = post("/api/members", Role::Secretary, json!({})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["first_name"].is_string());
    assert!(body["field_errors"]["last_name"].is_string());
    Ok(())
}

#[tokio::test]
async fn transaction_amount_must_be_positive() -> Result<()> {
    let (status, body) = post(
        "/api/transactions",
        Role::Treasurer,
        json!({
            "kind": "income",
            "category_id": 1,
            "bank_account_id": 1,
            "amount": "-5.00",
            "transaction_date": "2024-03-03"
        }),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["amount"].is_string());
    Ok(())
}

#[tokio::test]
async fn petty_cash_only_pays_expenses() -> Result<()> {
    let (status, body) = post(
        "/api/transactions",
        Role::Treasurer,
        json!({
            "kind": "income",
            "category_id": 1,
            "petty_cash_id": 1,
            "amount": "20.00",
            "transaction_date": "2024-03-03"
        }),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["petty_cash_id"], "Petty cash can only be used for expenses");
    Ok(())
}

#[tokio::test]
async fn secretaries_cannot_record_transactions() -> Result<()> {
    let (status, _) = post(
        "/api/transactions",
        Role::Secretary,
        json!({
            "kind": "expense",
            "category_id": 1,
            "bank_account_id": 1,
            "amount": "10.00",
            "transaction_date": "2024-03-03"
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn report_month_is_checked() -> Result<()> {
    let (status, body) = common::get("/api/reports/budget?year=2024&month=13", Role::Treasurer).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["month"].is_string());
    Ok(())
}
