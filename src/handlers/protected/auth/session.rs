use axum::{Extension, Json};

use crate::database::models::User;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::users::{PasswordChange, Session, UserService};
use crate::validation::Validate;

/// GET /api/auth/whoami - Profile of the signed-in user
///
/// Runs behind `validate_user_middleware`, so the row is known to exist and be active.
pub async fn whoami(Extension(user): Extension<ValidatedUser>) -> ApiResult<User> {
    let pool = DatabaseManager::pool()?;
    let profile = UserService::new(pool).select_404(user.id).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/auth/session/refresh - Reissue the token with a fresh expiry
///
/// Claims are rebuilt from the database row, so a renamed user gets a token
/// carrying the new name.
pub async fn refresh_session(Extension(user): Extension<ValidatedUser>) -> ApiResult<Session> {
    let pool = DatabaseManager::pool()?;
    let profile = UserService::new(pool).select_404(user.id).await?;
    let session = Session::issue(profile)?;

    tracing::debug!(user = %user.email, "session refreshed");
    Ok(ApiResponse::success(session))
}

/// PUT /api/auth/password - Change the caller's own password
///
/// Expected Input:
/// ```json
/// { "current_password": "...", "new_password": "..." }
/// ```
pub async fn change_password(
    Extension(user): Extension<ValidatedUser>,
    Json(input): Json<PasswordChange>,
) -> ApiResult<()> {
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    UserService::new(pool).change_password(user.id, &input).await?;

    tracing::info!(user = %user.email, "password changed");
    Ok(ApiResponse::no_content())
}
