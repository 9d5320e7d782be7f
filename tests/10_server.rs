mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};

#[tokio::test]
async fn root_describes_the_api() -> Result<()> {
    let (status, body) = common::call(Method::GET, "/", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Congrega API");
    assert!(body["data"]["currency"].is_string());
    assert!(body["data"]["endpoints"]["finance"].as_str().unwrap().contains("/api/transactions"));
    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_not_found() -> Result<()> {
    let token = common::token_for(congrega_api::auth::Role::Admin);
    let (status, _) = common::call(Method::GET, "/api/nowhere", Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn spawned_server_reports_degraded_health_without_database() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(body["data"]["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn spawned_server_rejects_anonymous_api_calls() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/api/members", server.base_url)).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn spawned_server_stops_with_its_handle() -> Result<()> {
    let server = common::spawn_server().await?;
    let health = format!("{}/health", server.base_url);
    drop(server);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(2))
        .build()?;
    assert!(client.get(&health).send().await.is_err(), "server still answering after drop");
    Ok(())
}
