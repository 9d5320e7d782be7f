// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::JwtError;
use crate::database::manager::DatabaseError;
use crate::filter::error::FilterError;
use crate::services::ServiceError;
use crate::validation::FieldErrors;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::validation_error("Validation failed", Some(errors.into_map()))
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::ConfigMissing(var) => {
                tracing::error!("Database configuration missing: {}", var);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("DATABASE_URL could not be parsed");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DatabaseError::Filter(e) => e.into(),
            DatabaseError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(sqlx_err) => from_sqlx(sqlx_err),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => errors.into(),
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::Internal(msg) => {
                tracing::error!("Internal service error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            ServiceError::Database(e) => e.into(),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidSecret => {
                tracing::error!("JWT secret not configured; cannot issue tokens");
                ApiError::service_unavailable("Authentication is not configured")
            }
            JwtError::InvalidToken(_) => ApiError::unauthorized("Invalid or expired token"),
            JwtError::TokenGeneration(msg) => {
                tracing::error!("Token generation failed: {}", msg);
                ApiError::internal_server_error("Could not issue a session token")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        from_sqlx(err)
    }
}

/// Maps sqlx failures to client errors. Constraint violations become
/// user-facing messages; everything else is logged and hidden.
fn from_sqlx(err: sqlx::Error) -> ApiError {
    match &err {
        sqlx::Error::RowNotFound => ApiError::not_found("Record not found"),
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            tracing::error!("Database connectivity error: {}", err);
            ApiError::service_unavailable("Database temporarily unavailable")
        }
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
            let constraint = db_err.constraint().unwrap_or_default();
            match code.as_str() {
                "23505" => ApiError::conflict(unique_violation_message(constraint)),
                "23503" => {
                    // Insert/update failures point at a missing parent, deletes at a remaining child
                    if db_err.message().contains("is still referenced") {
                        ApiError::conflict("This record is still referenced by other records and cannot be deleted")
                    } else {
                        ApiError::conflict("A referenced record does not exist")
                    }
                }
                "23514" => ApiError::validation_error(check_violation_message(constraint), None),
                _ => {
                    tracing::error!("SQLx database error ({}): {}", code, db_err);
                    ApiError::internal_server_error("Database error occurred")
                }
            }
        }
        _ => {
            tracing::error!("SQLx error: {}", err);
            ApiError::internal_server_error("Database error occurred")
        }
    }
}

pub(crate) fn unique_violation_message(constraint: &str) -> &'static str {
    match constraint {
        "members_document_id_key" => "A member with this document ID already exists",
        "home_groups_name_key" => "A home group with this name already exists",
        "users_email_key" => "A user with this email already exists",
        "committees_name_key" => "A committee with this name already exists",
        "committee_members_pkey" => "This member already belongs to the committee",
        "committee_members_single_chair_idx" => "This committee already has a chair",
        "deacons_member_id_key" => "This member is already registered as a deacon",
        "societies_name_key" => "A society with this name already exists",
        "society_leaders_member_key" => "This member already holds a position in the society",
        "society_leaders_single_position_idx" => "This position is already held in the society",
        "categories_name_kind_key" => "A category with this name and type already exists",
        "bank_accounts_account_number_key" => "An account with this number already exists",
        "petty_cash_funds_name_key" => "A petty cash fund with this name already exists",
        "budgets_period_key" => "A budget for this category and period already exists",
        "attendance_pkey" => "Attendance for this member is already recorded",
        _ => "A record with these values already exists",
    }
}

pub(crate) fn check_violation_message(constraint: &str) -> &'static str {
    match constraint {
        "petty_cash_funds_balance_check" => "Insufficient petty cash balance",
        "categories_tithe_income_check" => "Only income categories can be marked as tithe",
        "transactions_single_source_check" => "A transaction can use a bank account or a petty cash fund, not both",
        "transactions_petty_cash_expense_check" => "Petty cash can only be used for expenses",
        "activities_time_range_check" => "The activity cannot end before it starts",
        "society_leaders_term_check" => "The term cannot end before it starts",
        _ => "The submitted values are not allowed",
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_field_map() {
        let mut errors = FieldErrors::new();
        errors.add("first_name", "This field is required");
        let api: ApiError = errors.into();

        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        let body = api.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["first_name"], "This field is required");
    }

    #[test]
    fn unique_constraints_have_readable_messages() {
        assert_eq!(
            unique_violation_message("members_document_id_key"),
            "A member with this document ID already exists"
        );
        assert_eq!(
            unique_violation_message("something_else"),
            "A record with these values already exists"
        );
    }

    #[test]
    fn not_found_database_error_maps_to_404() {
        let api: ApiError = DatabaseError::NotFound("Member 7 not found".to_string()).into();
        assert_eq!(api.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(api.message(), "Member 7 not found");
    }

    #[test]
    fn bad_sort_column_is_a_client_error() {
        let err = DatabaseError::from(FilterError::InvalidColumn("last name".to_string()));
        let api: ApiError = err.into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn service_conflict_maps_to_409() {
        let api: ApiError = ServiceError::Conflict("Insufficient petty cash balance".into()).into();
        assert_eq!(api.status_code(), StatusCode::CONFLICT);
        assert_eq!(api.to_json()["code"], "CONFLICT");
    }
}
