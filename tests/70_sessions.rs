//! Login against a live Postgres (skipped without DATABASE_URL).
mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use congrega_api::auth::{validate_jwt, Role};
use congrega_api::services::users::{LoginInput, Session, UserCreate, UserService, UserUpdate};

const PASSWORD: &str = "alabanza-2024";

fn login(email: &str, password: &str) -> LoginInput {
    LoginInput { email: email.to_string(), password: password.to_string() }
}

#[tokio::test]
async fn login_issues_a_token_for_the_account() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let users = UserService::new(pool.clone());
    let email = format!("tesorera.{}@iglesia.test", uuid::Uuid::new_v4().simple());
    let created: UserCreate = serde_json::from_value(json!({
        "email": email.to_uppercase(),
        "name": "Lidia",
        "password": PASSWORD,
        "role": "treasurer",
    }))?;
    let user = users.create_one(&created).await?;
    assert_eq!(user.email, email);

    let signed_in = users.login(&login(&email, PASSWORD)).await?;
    assert!(signed_in.last_login_at.is_some());

    let session = Session::issue(signed_in)?;
    let claims = validate_jwt(&session.token)?;
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, Role::Treasurer.as_str());
    assert_eq!(session.expires_in, claims.exp - claims.iat);

    let err = users.login(&login(&email, "not-the-password")).await.unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn deactivated_account_cannot_sign_in() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let users = UserService::new(pool.clone());
    let email = format!("lider.{}@iglesia.test", uuid::Uuid::new_v4().simple());
    let created: UserCreate = serde_json::from_value(json!({
        "email": email, "name": "Bernabe", "password": PASSWORD, "role": "leader",
    }))?;
    let user = users.create_one(&created).await?;

    let update = UserUpdate { name: user.name.clone(), role: Role::Leader, is_active: false, member_id: None };
    users.update_404(uuid::Uuid::nil(), user.id, &update).await?;

    let err = users.login(&login(&email, PASSWORD)).await.unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::FORBIDDEN);
    Ok(())
}
