use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::PettyCashFund;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::validation::{default_true, FieldErrors, Validate, MAX_NAME_LENGTH};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PettyCashListQuery {
    pub active: Option<bool>,
    pub custodian_member_id: Option<i64>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PettyCashInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub custodian_member_id: i64,
    #[serde(default)]
    pub assigned_amount: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for PettyCashInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name, MAX_NAME_LENGTH);
        if self.custodian_member_id <= 0 {
            errors.add("custodian_member_id", "A custodian is required");
        }
        errors.non_negative_amount("assigned_amount", self.assigned_amount);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplenishInput {
    pub amount: Decimal,
    /// Account the money is withdrawn from, if any
    pub from_account_id: Option<i64>,
}

impl Validate for ReplenishInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.positive_amount("amount", self.amount);
        errors.positive_id("from_account_id", self.from_account_id);
        errors.into_result()
    }
}

pub struct PettyCashService {
    pool: PgPool,
}

impl PettyCashService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<PettyCashFund> {
        Repository::new("petty_cash_details", self.pool.clone())
    }

    pub async fn list(&self, query: PettyCashListQuery) -> ServiceResult<Vec<PettyCashFund>> {
        let conditions = Conditions::new()
            .eq("is_active", query.active)
            .eq("custodian_member_id", query.custodian_member_id);
        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            "name asc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<PettyCashFund> {
        Ok(self.repository().select_id(id, "Petty cash fund").await?)
    }

    /// A new fund starts with its full assigned amount on hand.
    pub async fn create_one(&self, input: &PettyCashInput) -> ServiceResult<PettyCashFund> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO petty_cash_funds (name, custodian_member_id, assigned_amount, balance, is_active)
            VALUES ($1, $2, $3, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.custodian_member_id)
        .bind(input.assigned_amount)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;
        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &PettyCashInput) -> ServiceResult<PettyCashFund> {
        let result = sqlx::query(
            r#"
            UPDATE petty_cash_funds SET
                name = $2, custodian_member_id = $3, assigned_amount = $4, is_active = $5, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.custodian_member_id)
        .bind(input.assigned_amount)
        .bind(input.is_active)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Petty cash fund {} not found", id)));
        }
        self.select_404(id).await
    }

    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM petty_cash_funds WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Petty cash fund {} not found", id)));
        }
        Ok(())
    }

    /// Tops the fund up, withdrawing the same amount from a bank account when one is given.
    pub async fn replenish(&self, id: i64, input: &ReplenishInput) -> ServiceResult<PettyCashFund> {
        let mut tx = self.pool.begin().await?;

        let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM petty_cash_funds WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        match active {
            None => return Err(ServiceError::NotFound(format!("Petty cash fund {} not found", id))),
            Some(false) => return Err(ServiceError::Conflict("Petty cash fund is inactive".to_string())),
            Some(true) => {}
        }

        if let Some(account_id) = input.from_account_id {
            let moved = sqlx::query(
                "UPDATE bank_accounts SET balance = balance - $2, updated_at = now() WHERE id = $1 AND is_active",
            )
            .bind(account_id)
            .bind(input.amount)
            .execute(&mut *tx)
            .await?;
            if moved.rows_affected() == 0 {
                return Err(ServiceError::field("from_account_id", "Bank account does not exist or is inactive"));
            }
        }

        sqlx::query("UPDATE petty_cash_funds SET balance = balance + $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(input.amount)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.select_404(id).await
    }
}
