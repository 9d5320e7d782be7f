use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::Budget;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::validation::{clean, FieldErrors, Validate, MAX_TEXT_LENGTH};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetListQuery {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub category_id: Option<i64>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetInput {
    #[serde(default)]
    pub category_id: i64,
    #[serde(default)]
    pub year: i32,
    /// Absent for an annual budget
    pub month: Option<i32>,
    #[serde(default)]
    pub amount: Decimal,
    pub notes: Option<String>,
}

impl Validate for BudgetInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.category_id <= 0 {
            errors.add("category_id", "A category is required");
        }
        errors.year("year", self.year);
        errors.month("month", self.month);
        errors.non_negative_amount("amount", self.amount);
        errors.optional_text("notes", self.notes.as_deref(), MAX_TEXT_LENGTH);
        errors.into_result()
    }
}

pub struct BudgetService {
    pool: PgPool,
}

impl BudgetService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<Budget> {
        Repository::new("budget_details", self.pool.clone())
    }

    pub async fn list(&self, query: BudgetListQuery) -> ServiceResult<Vec<Budget>> {
        let conditions = Conditions::new()
            .eq("year", query.year)
            .eq("month", query.month)
            .eq("category_id", query.category_id);
        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            "year desc, month asc, category_name asc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    /// Budgets of one period: a month, or the annual budgets when `month` is absent.
    pub async fn for_period(&self, year: i32, month: Option<i32>) -> ServiceResult<Vec<Budget>> {
        let conditions = Conditions::new()
            .eq("year", Some(year))
            .raw("month", month.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null));
        let filter = FilterData::conditions(conditions.into_map()).ordered("category_kind asc, category_name asc");
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<Budget> {
        Ok(self.repository().select_id(id, "Budget").await?)
    }

    pub async fn create_one(&self, input: &BudgetInput) -> ServiceResult<Budget> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO budgets (category_id, year, month, amount, notes) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(input.category_id)
        .bind(input.year)
        .bind(input.month)
        .bind(input.amount)
        .bind(clean(&input.notes))
        .fetch_one(&self.pool)
        .await?;
        self.select_404(id).await
    }

    pub async fn update_404(&self, id: i64, input: &BudgetInput) -> ServiceResult<Budget> {
        let result = sqlx::query(
            r#"
            UPDATE budgets SET category_id = $2, year = $3, month = $4, amount = $5, notes = $6, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.year)
        .bind(input.month)
        .bind(input.amount)
        .bind(clean(&input.notes))
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Budget {} not found", id)));
        }
        self.select_404(id).await
    }

    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Budget {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn period_bounds() {
        let input = BudgetInput { category_id: 1, year: 1999, month: Some(13), amount: dec!(-5), notes: None };
        let errors = input.validate().unwrap_err();
        assert!(errors.get("year").is_some());
        assert!(errors.get("month").is_some());
        assert!(errors.get("amount").is_some());

        let annual = BudgetInput { category_id: 1, year: 2024, month: None, amount: dec!(12000), notes: None };
        assert!(annual.validate().is_ok());
    }
}
