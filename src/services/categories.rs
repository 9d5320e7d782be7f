use serde::Deserialize;
use sqlx::PgPool;

use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::Category;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::EntryKind;
use crate::validation::{clean, default_true, FieldErrors, Validate, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryListQuery {
    pub kind: Option<EntryKind>,
    pub active: Option<bool>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    pub name: String,
    pub kind: EntryKind,
    #[serde(default)]
    pub is_tithe: bool,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for CategoryInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name, MAX_NAME_LENGTH);
        errors.optional_text("description", self.description.as_deref(), MAX_TEXT_LENGTH);
        if self.is_tithe && self.kind != EntryKind::Income {
            errors.add("is_tithe", "Only income categories can be marked as tithe");
        }
        errors.into_result()
    }
}

pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<Category> {
        Repository::new("categories", self.pool.clone())
    }

    pub async fn list(&self, query: CategoryListQuery) -> ServiceResult<Vec<Category>> {
        let conditions = Conditions::new()
            .eq("kind", query.kind.map(|k| k.as_str()))
            .eq("is_active", query.active);
        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            "kind asc, name asc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: i64) -> ServiceResult<Category> {
        Ok(self.repository().select_id(id, "Category").await?)
    }

    pub async fn create_one(&self, input: &CategoryInput) -> ServiceResult<Category> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO categories (name, kind, is_tithe, description, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.kind.as_str())
        .bind(input.is_tithe)
        .bind(clean(&input.description))
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;
        self.select_404(id).await
    }

    /// Changing the kind of a category already used by transactions is refused.
    pub async fn update_404(&self, id: i64, input: &CategoryInput) -> ServiceResult<Category> {
        let current = self.select_404(id).await?;
        if current.kind != input.kind.as_str() {
            let used: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM transactions WHERE category_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
            if used {
                return Err(ServiceError::Conflict(
                    "The type of a category with transactions cannot be changed".to_string(),
                ));
            }
        }

        sqlx::query(
            r#"
            UPDATE categories SET name = $2, kind = $3, is_tithe = $4, description = $5, is_active = $6, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.kind.as_str())
        .bind(input.is_tithe)
        .bind(clean(&input.description))
        .bind(input.is_active)
        .execute(&self.pool)
        .await?;
        self.select_404(id).await
    }

    pub async fn delete_404(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tithe_must_be_income() {
        let input: CategoryInput =
            serde_json::from_value(json!({ "name": "Diezmos", "kind": "expense", "is_tithe": true })).unwrap();
        assert_eq!(
            input.validate().unwrap_err().get("is_tithe"),
            Some("Only income categories can be marked as tithe")
        );

        let input: CategoryInput =
            serde_json::from_value(json!({ "name": "Diezmos", "kind": "income", "is_tithe": true })).unwrap();
        assert!(input.validate().is_ok());
    }
}
