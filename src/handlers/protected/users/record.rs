use axum::{extract::Path, Extension, Json};
use uuid::Uuid;

use crate::auth::roles::{check_permission, ROLES_ADMIN};
use crate::database::models::User;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::users::{PasswordReset, UserService, UserUpdate};
use crate::validation::Validate;

/// GET /api/users/:id
pub async fn get(Extension(auth): Extension<AuthUser>, Path(id): Path<Uuid>) -> ApiResult<User> {
    check_permission(&auth, ROLES_ADMIN)?;

    let pool = DatabaseManager::pool()?;
    let user = UserService::new(pool).select_404(id).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:id - Update name, role, active flag and member link
///
/// An admin cannot deactivate or demote their own account (403).
pub async fn put(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UserUpdate>,
) -> ApiResult<User> {
    check_permission(&auth, ROLES_ADMIN)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let user = UserService::new(pool).update_404(auth.id, id, &input).await?;

    tracing::info!(user = %auth.email, updated = %id, role = %user.role, active = user.is_active, "user account updated");
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:id/password - Set a new password for another user
pub async fn reset_password(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<PasswordReset>,
) -> ApiResult<()> {
    check_permission(&auth, ROLES_ADMIN)?;
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    UserService::new(pool).set_password(id, &input.password).await?;

    tracing::info!(user = %auth.email, target = %id, "password reset");
    Ok(ApiResponse::no_content())
}
