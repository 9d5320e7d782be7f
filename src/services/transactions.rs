//! Income and expense records and their effect on account and fund balances.
//!
//! A transaction moves the balance of at most one source: a bank account
//! (+amount for income, -amount for expense) or a petty cash fund (expenses
//! only, -amount). Updates reverse the stored effect before applying the new
//! one; deletes reverse it. Each operation runs in one database transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::Transaction;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::{EntryKind, PaymentMethod};
use crate::validation::{clean, FieldErrors, Validate, MAX_TEXT_LENGTH};

pub const INSUFFICIENT_PETTY_CASH: &str = "Insufficient petty cash balance";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionListQuery {
    pub kind: Option<EntryKind>,
    pub category_id: Option<i64>,
    pub member_id: Option<i64>,
    pub bank_account_id: Option<i64>,
    pub petty_cash_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl TransactionListQuery {
    pub(crate) fn conditions(&self) -> Conditions {
        Conditions::new()
            .eq("kind", self.kind.map(|k| k.as_str()))
            .eq("category_id", self.category_id)
            .eq("member_id", self.member_id)
            .eq("bank_account_id", self.bank_account_id)
            .eq("petty_cash_id", self.petty_cash_id)
            .range("transaction_date", self.from, self.to)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInput {
    pub kind: EntryKind,
    #[serde(default)]
    pub category_id: i64,
    pub member_id: Option<i64>,
    pub bank_account_id: Option<i64>,
    pub petty_cash_id: Option<i64>,
    #[serde(default)]
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
    pub description: Option<String>,
}

impl Validate for TransactionInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.category_id <= 0 {
            errors.add("category_id", "A category is required");
        }
        errors.positive_id("member_id", self.member_id);
        errors.positive_id("bank_account_id", self.bank_account_id);
        errors.positive_id("petty_cash_id", self.petty_cash_id);
        errors.positive_amount("amount", self.amount);
        if self.bank_account_id.is_some() && self.petty_cash_id.is_some() {
            errors.add("petty_cash_id", "Use either a bank account or a petty cash fund, not both");
        }
        if self.petty_cash_id.is_some() && self.kind != EntryKind::Expense {
            errors.add("petty_cash_id", "Petty cash can only be used for expenses");
        }
        errors.optional_text("reference", self.reference.as_deref(), 100);
        errors.optional_text("description", self.description.as_deref(), MAX_TEXT_LENGTH);
        errors.into_result()
    }
}

/// The balance movement a stored transaction caused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BalanceEffect {
    pub kind: EntryKind,
    pub amount: Decimal,
    pub bank_account_id: Option<i64>,
    pub petty_cash_id: Option<i64>,
}

impl BalanceEffect {
    fn of(input: &TransactionInput) -> Self {
        Self {
            kind: input.kind,
            amount: input.amount,
            bank_account_id: input.bank_account_id,
            petty_cash_id: input.petty_cash_id,
        }
    }

    /// Signed change to the bank account balance.
    pub fn account_delta(&self) -> Decimal {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }

    /// Signed change to the petty cash balance.
    pub fn petty_cash_delta(&self) -> Decimal {
        -self.amount
    }
}

#[derive(sqlx::FromRow)]
struct StoredEffect {
    kind: String,
    amount: Decimal,
    bank_account_id: Option<i64>,
    petty_cash_id: Option<i64>,
}

impl StoredEffect {
    fn into_effect(self) -> ServiceResult<BalanceEffect> {
        let kind = self
            .kind
            .parse::<EntryKind>()
            .map_err(|e| ServiceError::Database(crate::database::DatabaseError::QueryError(e)))?;
        Ok(BalanceEffect {
            kind,
            amount: self.amount,
            bank_account_id: self.bank_account_id,
            petty_cash_id: self.petty_cash_id,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CategoryCheck {
    kind: String,
    is_tithe: bool,
    is_active: bool,
}

/// Category rules: it exists, is active, matches the kind, and tithes name a member.
fn check_category(category: Option<CategoryCheck>, input: &TransactionInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    match category {
        None => errors.add("category_id", "Category does not exist"),
        Some(c) => {
            if !c.is_active {
                errors.add("category_id", "Category is inactive");
            } else if c.kind != input.kind.as_str() {
                errors.add("category_id", format!("Category is not an {} category", input.kind));
            }
            if c.is_tithe && input.member_id.is_none() {
                errors.add("member_id", "Tithes must be linked to a member");
            }
        }
    }
    errors.into_result()
}

pub struct TransactionService {
    pool: PgPool,
}

impl TransactionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<Transaction> {
        Repository::new("transaction_details", self.pool.clone())
    }

    pub async fn list(&self, query: TransactionListQuery) -> ServiceResult<Vec<Transaction>> {
        let filter = FilterData::conditions(query.conditions().into_map()).paged(
            query.order.as_deref(),
            "transaction_date desc, id desc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    /// Every matching row, unpaged, oldest first (exports and reports).
    pub async fn select_all(&self, conditions: Conditions) -> ServiceResult<Vec<Transaction>> {
        let filter = FilterData::conditions(conditions.into_map()).ordered("transaction_date asc, id asc");
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<Transaction> {
        Ok(self.repository().select_id(id, "Transaction").await?)
    }

    pub async fn create_one(&self, input: &TransactionInput, created_by: Uuid) -> ServiceResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        verify_category(&mut tx, input).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (
                kind, category_id, member_id, bank_account_id, petty_cash_id, amount,
                transaction_date, payment_method, reference, description, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(input.kind.as_str())
        .bind(input.category_id)
        .bind(input.member_id)
        .bind(input.bank_account_id)
        .bind(input.petty_cash_id)
        .bind(input.amount)
        .bind(input.transaction_date)
        .bind(input.payment_method.as_str())
        .bind(clean(&input.reference))
        .bind(clean(&input.description))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        apply_effect(&mut tx, &BalanceEffect::of(input)).await?;
        tx.commit().await?;

        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &TransactionInput) -> ServiceResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let previous = lock_effect(&mut tx, id).await?;
        reverse_effect(&mut tx, &previous).await?;
        verify_category(&mut tx, input).await?;

        sqlx::query(
            r#"
            UPDATE transactions SET
                kind = $2, category_id = $3, member_id = $4, bank_account_id = $5, petty_cash_id = $6,
                amount = $7, transaction_date = $8, payment_method = $9, reference = $10,
                description = $11, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.kind.as_str())
        .bind(input.category_id)
        .bind(input.member_id)
        .bind(input.bank_account_id)
        .bind(input.petty_cash_id)
        .bind(input.amount)
        .bind(input.transaction_date)
        .bind(input.payment_method.as_str())
        .bind(clean(&input.reference))
        .bind(clean(&input.description))
        .execute(&mut *tx)
        .await?;

        apply_effect(&mut tx, &BalanceEffect::of(input)).await?;
        tx.commit().await?;

        self.select_404(id).await
    }

    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;

        let previous = lock_effect(&mut tx, id).await?;
        reverse_effect(&mut tx, &previous).await?;
        sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

async fn verify_category(conn: &mut PgConnection, input: &TransactionInput) -> ServiceResult<()> {
    let category: Option<CategoryCheck> =
        sqlx::query_as("SELECT kind, is_tithe, is_active FROM categories WHERE id = $1")
            .bind(input.category_id)
            .fetch_optional(&mut *conn)
            .await?;
    check_category(category, input)?;
    Ok(())
}

async fn lock_effect(conn: &mut PgConnection, id: i64) -> ServiceResult<BalanceEffect> {
    let stored: Option<StoredEffect> = sqlx::query_as(
        "SELECT kind, amount, bank_account_id, petty_cash_id FROM transactions WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    stored
        .ok_or_else(|| ServiceError::NotFound(format!("Transaction {} not found", id)))?
        .into_effect()
}

async fn apply_effect(conn: &mut PgConnection, effect: &BalanceEffect) -> ServiceResult<()> {
    if let Some(account_id) = effect.bank_account_id {
        let moved = sqlx::query(
            "UPDATE bank_accounts SET balance = balance + $2, updated_at = now() WHERE id = $1 AND is_active",
        )
        .bind(account_id)
        .bind(effect.account_delta())
        .execute(&mut *conn)
        .await?;
        if moved.rows_affected() == 0 {
            return Err(ServiceError::field("bank_account_id", "Bank account does not exist or is inactive"));
        }
    }

    if let Some(fund_id) = effect.petty_cash_id {
        let fund: Option<(Decimal, bool)> =
            sqlx::query_as("SELECT balance, is_active FROM petty_cash_funds WHERE id = $1 FOR UPDATE")
                .bind(fund_id)
                .fetch_optional(&mut *conn)
                .await?;
        let balance = match fund {
            Some((balance, true)) => balance,
            _ => return Err(ServiceError::field("petty_cash_id", "Petty cash fund does not exist or is inactive")),
        };
        if balance + effect.petty_cash_delta() < Decimal::ZERO {
            return Err(ServiceError::Conflict(INSUFFICIENT_PETTY_CASH.to_string()));
        }
        sqlx::query("UPDATE petty_cash_funds SET balance = balance + $2, updated_at = now() WHERE id = $1")
            .bind(fund_id)
            .bind(effect.petty_cash_delta())
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Undoes a stored effect; inactive sources are still corrected.
async fn reverse_effect(conn: &mut PgConnection, effect: &BalanceEffect) -> ServiceResult<()> {
    if let Some(account_id) = effect.bank_account_id {
        sqlx::query("UPDATE bank_accounts SET balance = balance - $2, updated_at = now() WHERE id = $1")
            .bind(account_id)
            .bind(effect.account_delta())
            .execute(&mut *conn)
            .await?;
    }
    if let Some(fund_id) = effect.petty_cash_id {
        sqlx::query("UPDATE petty_cash_funds SET balance = balance - $2, updated_at = now() WHERE id = $1")
            .bind(fund_id)
            .bind(effect.petty_cash_delta())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn input(value: serde_json::Value) -> TransactionInput {
        serde_json::from_value(value).unwrap()
    }

    fn tithe() -> TransactionInput {
        input(json!({
            "kind": "income",
            "category_id": 1,
            "amount": "250.00",
            "transaction_date": "2024-03-03"
        }))
    }

    #[test]
    fn balance_deltas() {
        let income = BalanceEffect { kind: EntryKind::Income, amount: dec!(100), bank_account_id: Some(1), petty_cash_id: None };
        let expense = BalanceEffect { kind: EntryKind::Expense, amount: dec!(40.50), bank_account_id: None, petty_cash_id: Some(2) };
        assert_eq!(income.account_delta(), dec!(100));
        assert_eq!(expense.account_delta(), dec!(-40.50));
        assert_eq!(expense.petty_cash_delta(), dec!(-40.50));
    }

    #[test]
    fn payment_method_defaults_to_cash() {
        assert_eq!(tithe().payment_method, PaymentMethod::Cash);
        assert!(tithe().validate().is_ok());
    }

    #[test]
    fn single_source_and_petty_cash_rules() {
        let both = input(json!({
            "kind": "income",
            "category_id": 1,
            "bank_account_id": 1,
            "petty_cash_id": 2,
            "amount": 10,
            "transaction_date": "2024-01-01"
        }));
        let errors = both.validate().unwrap_err();
        assert_eq!(
            errors.get("petty_cash_id"),
            Some("Use either a bank account or a petty cash fund, not both")
        );

        let petty_income = input(json!({
            "kind": "income",
            "category_id": 1,
            "petty_cash_id": 2,
            "amount": 10,
            "transaction_date": "2024-01-01"
        }));
        assert_eq!(
            petty_income.validate().unwrap_err().get("petty_cash_id"),
            Some("Petty cash can only be used for expenses")
        );
    }

    #[test]
    fn amount_must_be_positive() {
        let zero = input(json!({ "kind": "expense", "category_id": 3, "amount": 0, "transaction_date": "2024-01-01" }));
        assert!(zero.validate().unwrap_err().get("amount").is_some());
    }

    #[test]
    fn tithe_category_requires_member() {
        let category = CategoryCheck { kind: "income".into(), is_tithe: true, is_active: true };
        let errors = check_category(Some(category), &tithe()).unwrap_err();
        assert_eq!(errors.get("member_id"), Some("Tithes must be linked to a member"));

        let category = CategoryCheck { kind: "income".into(), is_tithe: true, is_active: true };
        let with_member = TransactionInput { member_id: Some(9), ..tithe() };
        assert!(check_category(Some(category), &with_member).is_ok());
    }

    #[test]
    fn category_kind_must_match() {
        let category = CategoryCheck { kind: "expense".into(), is_tithe: false, is_active: true };
        let errors = check_category(Some(category), &tithe()).unwrap_err();
        assert_eq!(errors.get("category_id"), Some("Category is not an income category"));

        let errors = check_category(None, &tithe()).unwrap_err();
        assert_eq!(errors.get("category_id"), Some("Category does not exist"));

        let inactive = CategoryCheck { kind: "income".into(), is_tithe: false, is_active: false };
        assert_eq!(
            check_category(Some(inactive), &tithe()).unwrap_err().get("category_id"),
            Some("Category is inactive")
        );
    }

    #[test]
    fn list_query_builds_date_range() {
        let query = TransactionListQuery {
            kind: Some(EntryKind::Expense),
            from: Some("2024-01-01".parse().unwrap()),
            to: Some("2024-01-31".parse().unwrap()),
            ..Default::default()
        };
        let map = query.conditions().into_map();
        assert_eq!(map["kind"], "expense");
        assert_eq!(map["transaction_date"], json!({ "$gte": "2024-01-01", "$lte": "2024-01-31" }));
    }
}
