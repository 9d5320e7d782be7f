#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use congrega_api::auth::{generate_jwt, Claims, Role};
use congrega_api::database::DatabaseManager;
use congrega_api::error::ApiError;
use congrega_api::services::ServiceError;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

/// Signed token for a throwaway user holding `role`.
pub fn token_for(role: Role) -> String {
    let claims = Claims::new(
        Uuid::new_v4(),
        format!("{}@iglesia.test", role.as_str()),
        format!("Test {}", role.as_str()),
        role.as_str().to_string(),
    );
    generate_jwt(&claims).expect("development secret signs tokens")
}

/// Sends one request through the in-process router.
pub async fn call(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = congrega_api::app::app().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).context("response body is not JSON")?
    };
    Ok((status, json))
}

pub async fn get(uri: &str, role: Role) -> Result<(StatusCode, Value)> {
    call(Method::GET, uri, Some(&token_for(role)), None).await
}

/// A `congrega-api` child process; killed and reaped when dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Without a database the server still starts and reports degraded health
        let child = Command::new(env!("CARGO_BIN_EXE_congrega-api"))
            .env("CONGREGA_API_PORT", port.to_string())
            .env("DATABASE_AUTO_MIGRATE", "false")
            .env_remove("DATABASE_URL")
            .env_remove("APP_ENV")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Starts a server for the calling test; it stops when the handle goes out of scope.
pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Migrated pool for tests that need Postgres; `None` when DATABASE_URL is unset.
pub async fn database() -> Result<Option<PgPool>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return Ok(None);
    };
    let pool = DatabaseManager::build_pool(&url)?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(Some(pool))
}

/// Name that cannot collide with rows left by earlier runs.
pub fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4().simple())
}

/// HTTP status the API would answer for a service failure.
pub fn status_of(err: ServiceError) -> StatusCode {
    ApiError::from(err).status_code()
}
