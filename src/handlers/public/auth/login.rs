// handlers/public/auth/login.rs - POST /auth/login handler

use axum::Json;

use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::users::{LoginInput, Session, UserService};
use crate::validation::Validate;

/// POST /auth/login - Exchange email and password for a session token
///
/// Expected Input:
/// ```json
/// { "email": "tesoreria@iglesia.org", "password": "..." }
/// ```
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": { "token": "eyJ...", "expires_in": 604800, "user": { "id": "...", "role": "treasurer" } }
/// }
/// ```
///
/// Unknown email and wrong password both answer 401 with the same message;
/// a deactivated account answers 403.
pub async fn login_post(Json(input): Json<LoginInput>) -> ApiResult<Session> {
    input.validate()?;

    let pool = DatabaseManager::pool()?;
    let user = match UserService::new(pool).login(&input).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(email = %input.email.trim(), "login rejected: {}", e);
            return Err(e.into());
        }
    };

    let session = Session::issue(user)?;
    tracing::info!(user = %session.user.email, role = %session.user.role, "user signed in");
    Ok(ApiResponse::success(session))
}
