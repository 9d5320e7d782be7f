//! Business operations per entity.
//!
//! Each service owns a pool handle, validates business rules that need the
//! database, writes with explicit SQL and re-reads results through the
//! `*_details` views.

pub mod accounts;
pub mod activities;
pub mod attendance;
pub mod budgets;
pub mod categories;
pub mod committees;
pub mod deacons;
pub mod export;
pub mod home_groups;
pub mod members;
pub mod petty_cash;
pub mod reports;
pub mod societies;
pub mod transactions;
pub mod users;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::auth::password::PasswordError;
use crate::database::manager::DatabaseError;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(FieldErrors),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlx(err))
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

impl ServiceError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ServiceError::Validation(FieldErrors::single(field, message))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// WHERE map builder that skips absent query parameters.
#[derive(Debug, Default)]
pub struct Conditions(Map<String, Value>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq<T: Serialize>(mut self, column: &str, value: Option<T>) -> Self {
        if let Some(v) = value {
            self.0.insert(column.to_string(), json!(v));
        }
        self
    }

    pub fn raw(mut self, column: &str, value: Value) -> Self {
        self.0.insert(column.to_string(), value);
        self
    }

    /// Inclusive range on a column; either end may be open.
    pub fn range<T: Serialize>(mut self, column: &str, from: Option<T>, to: Option<T>) -> Self {
        let mut ops = Map::new();
        if let Some(f) = from {
            ops.insert("$gte".to_string(), json!(f));
        }
        if let Some(t) = to {
            ops.insert("$lte".to_string(), json!(t));
        }
        if !ops.is_empty() {
            self.0.insert(column.to_string(), Value::Object(ops));
        }
        self
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Escapes LIKE metacharacters and wraps the term for a contains-match.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_skip_missing_values() {
        let map = Conditions::new()
            .eq("status", Some("active"))
            .eq::<i64>("home_group_id", None)
            .range("transaction_date", Some("2024-01-01"), None)
            .into_map();

        assert_eq!(map.len(), 2);
        assert_eq!(map["status"], "active");
        assert_eq!(map["transaction_date"], json!({ "$gte": "2024-01-01" }));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("ana"), "%ana%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
