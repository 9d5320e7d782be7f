use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::Row;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;

/// Validated user information from the users table
#[derive(Clone, Debug)]
pub struct ValidatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub member_id: Option<i64>,
}

/// Middleware that re-checks the JWT user against the users table.
/// The user must still exist, be active, and hold the role the token claims.
pub async fn validate_user_middleware(mut request: Request, next: Next) -> Response {
    let auth_user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => {
            return ApiError::unauthorized("JWT authentication required before user validation")
                .into_response()
        }
    };

    let pool = match DatabaseManager::pool() {
        Ok(pool) => pool,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let query = r#"
        SELECT id, email, name, role, is_active, member_id
        FROM users
        WHERE id = $1
    "#;

    let row = match sqlx::query(query).bind(auth_user.id).fetch_optional(&pool).await {
        Ok(row) => row,
        Err(e) => {
            tracing::error!("Database error validating user '{}': {}", auth_user.email, e);
            return ApiError::from(e).into_response();
        }
    };

    let Some(user_row) = row else {
        tracing::warn!("User validation failed: user '{}' ({}) no longer exists", auth_user.email, auth_user.id);
        return ApiError::unauthorized("User no longer exists").into_response();
    };

    let is_active: bool = user_row.get("is_active");
    if !is_active {
        tracing::warn!("User validation failed: user '{}' is deactivated", auth_user.email);
        return ApiError::forbidden("User account is deactivated").into_response();
    }

    let db_role: String = user_row.get("role");
    if db_role != auth_user.role {
        tracing::warn!(
            "User validation failed: token role '{}' doesn't match database role '{}'",
            auth_user.role,
            db_role
        );
        return ApiError::unauthorized("User role changed, please sign in again").into_response();
    }

    let validated_user = ValidatedUser {
        id: user_row.get("id"),
        email: user_row.get("email"),
        name: user_row.get("name"),
        role: db_role,
        member_id: user_row.get("member_id"),
    };

    tracing::debug!("User validation successful: {} ({})", validated_user.email, validated_user.role);

    request.extensions_mut().insert(validated_user);

    next.run(request).await
}
