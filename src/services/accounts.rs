use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::BankAccount;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::AccountType;
use crate::validation::{default_true, FieldErrors, Validate, MAX_NAME_LENGTH};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountListQuery {
    pub active: Option<bool>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: String,
    pub account_type: AccountType,
    /// Ignored on update; the balance only moves through transactions.
    #[serde(default)]
    pub opening_balance: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for AccountInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name, MAX_NAME_LENGTH);
        errors.require_text("bank_name", &self.bank_name, MAX_NAME_LENGTH);
        errors.require_text("account_number", &self.account_number, 40);
        errors.non_negative_amount("opening_balance", self.opening_balance);
        errors.into_result()
    }
}

pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<BankAccount> {
        Repository::new("bank_accounts", self.pool.clone())
    }

    pub async fn list(&self, query: AccountListQuery) -> ServiceResult<Vec<BankAccount>> {
        let conditions = Conditions::new().eq("is_active", query.active);
        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            "name asc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<BankAccount> {
        Ok(self.repository().select_id(id, "Bank account").await?)
    }

    pub async fn create_one(&self, input: &AccountInput) -> ServiceResult<BankAccount> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bank_accounts (name, bank_name, account_number, account_type, opening_balance, balance, is_active)
            VALUES ($1, $2, $3, $4, $5, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.bank_name.trim())
        .bind(input.account_number.trim())
        .bind(input.account_type.as_str())
        .bind(input.opening_balance)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;
        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &AccountInput) -> ServiceResult<BankAccount> {
        let result = sqlx::query(
            r#"
            UPDATE bank_accounts SET
                name = $2, bank_name = $3, account_number = $4, account_type = $5, is_active = $6, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.bank_name.trim())
        .bind(input.account_number.trim())
        .bind(input.account_type.as_str())
        .bind(input.is_active)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Bank account {} not found", id)));
        }
        self.select_404(id).await
    }

    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM bank_accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Bank account {} not found", id)));
        }
        Ok(())
    }
}
