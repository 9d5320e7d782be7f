mod common;

use anyhow::Result;
use axum::http::StatusCode;
use congrega_api::auth::Role;

async fn assert_forbidden(uri: &str, role: Role) -> Result<()> {
    let (status, body) = common::get(uri, role).await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{} as {}", uri, role);
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn plain_members_cannot_see_finances() -> Result<()> {
    assert_forbidden("/api/transactions", Role::Member).await?;
    assert_forbidden("/api/accounts", Role::Member).await?;
    assert_forbidden("/api/petty-cash", Role::Member).await?;
    assert_forbidden("/api/export/transactions.csv", Role::Member).await
}

#[tokio::test]
async fn plain_members_cannot_browse_the_directory() -> Result<()> {
    assert_forbidden("/api/members", Role::Member).await?;
    assert_forbidden("/api/export/members.csv", Role::Member).await
}

#[tokio::test]
async fn only_admins_manage_users() -> Result<()> {
    for role in [Role::Pastor, Role::Treasurer, Role::Secretary, Role::Leader, Role::Member] {
        assert_forbidden("/api/users", role).await?;
    }
    Ok(())
}

#[tokio::test]
async fn reports_are_limited_to_finance_leadership() -> Result<()> {
    assert_forbidden("/api/reports/summary", Role::Secretary).await?;
    assert_forbidden("/api/reports/dashboard", Role::Leader).await?;
    assert_forbidden("/api/reports/budget?year=2024", Role::Member).await
}

#[tokio::test]
async fn unknown_role_claims_are_forbidden() -> Result<()> {
    let claims = congrega_api::auth::Claims::new(
        uuid::Uuid::new_v4(),
        "ghost@iglesia.test".to_string(),
        "Ghost".to_string(),
        "superuser".to_string(),
    );
    let token = congrega_api::auth::generate_jwt(&claims)?;

    let (status, _) = common::call(axum::http::Method::GET, "/api/members", Some(&token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}
