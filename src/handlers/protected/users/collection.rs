use axum::{extract::Query, Extension, Json};

use crate::auth::roles::{check_permission, ROLES_ADMIN};
use crate::database::models::User;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::users::{UserCreate, UserListQuery, UserService};
use crate::validation::Validate;

/// GET /api/users - List login accounts
pub async fn get(Extension(auth): Extension<AuthUser>, Query(query): Query<UserListQuery>) -> ApiResult<Vec<User>> {
    check_permission(&auth, ROLES_ADMIN)?;

    let pool = DatabaseManager::pool()?;
    let users = UserService::new(pool).list(query).await?;
    Ok(ApiResponse::success(users))
}

/// POST /api/users - Create a login account
///
/// Expected Input:
/// ```json
/// { "email": "secretaria@iglesia.org", "name": "Lucía Paz", "password": "...", "role": "secretary", "member_id": 12 }
/// ```
pub async fn post(Extension(auth): Extension<AuthUser>, Json(input): Json<UserCreate>) -> ApiResult<User> {
    check_permission(&auth, ROLES_ADMIN)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let user = UserService::new(pool).create_one(&input).await?;

    tracing::info!(user = %auth.email, created = %user.id, role = %user.role, "user account created");
    Ok(ApiResponse::created(user))
}
