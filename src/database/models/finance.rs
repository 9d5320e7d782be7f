use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub is_tithe: bool,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BankAccount {
    pub id: i64,
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_type: String,
    pub opening_balance: Decimal,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `petty_cash_details` view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PettyCashFund {
    pub id: i64,
    pub name: String,
    pub custodian_member_id: i64,
    pub custodian_name: String,
    pub assigned_amount: Decimal,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `transaction_details` view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub kind: String,
    pub category_id: i64,
    pub category_name: String,
    pub is_tithe: bool,
    pub member_id: Option<i64>,
    pub member_name: Option<String>,
    pub bank_account_id: Option<i64>,
    pub bank_account_name: Option<String>,
    pub petty_cash_id: Option<i64>,
    pub petty_cash_name: Option<String>,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    pub payment_method: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `budget_details` view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Budget {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub category_kind: String,
    pub year: i32,
    pub month: Option<i32>,
    pub amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
