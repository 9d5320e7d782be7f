use congrega_api::config::CONFIG;
use congrega_api::database::DatabaseManager;
use congrega_api::is_production;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Congrega API in {:?} mode", CONFIG.environment);

    if is_production!() && CONFIG.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; logins will be refused until it is configured");
    }

    if CONFIG.database.auto_migrate {
        if let Err(e) = DatabaseManager::migrate().await {
            tracing::error!("Database migration failed: {}", e);
        }
    }

    let bind_addr = format!("0.0.0.0:{}", CONFIG.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Congrega API listening on http://{}", bind_addr);

    axum::serve(listener, congrega_api::app::app()).await?;
    Ok(())
}
