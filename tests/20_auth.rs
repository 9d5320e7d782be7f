mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let (status, body) = common::call(Method::GET, "/api/auth/whoami", None, None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing Authorization header");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_unauthorized() -> Result<()> {
    let (status, body) = common::call(Method::GET, "/api/transactions", Some("not.a.jwt"), None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() -> Result<()> {
    let claims = congrega_api::auth::Claims::new(
        uuid::Uuid::new_v4(),
        "intruder@iglesia.test".to_string(),
        "Intruder".to_string(),
        "admin".to_string(),
    );
    let forged = congrega_api::auth::generate_jwt_with_secret(&claims, "some-other-secret")?;

    let (status, _) = common::call(Method::GET, "/api/users", Some(&forged), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_rejects_malformed_email_before_lookup() -> Result<()> {
    let (status, body) = common::call(
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "pastor", "password": "secret-password" })),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["email"], "Invalid email address");
    Ok(())
}

#[tokio::test]
async fn login_requires_both_fields() -> Result<()> {
    let (status, body) = common::call(Method::POST, "/auth/login", None, Some(json!({}))).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["email"].is_string());
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}
