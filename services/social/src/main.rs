use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use social::{AppConfig, build_app};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting social service");

    let config = AppConfig::from_env()?;
    let bind_address = config.bind_address.clone();

    let (app, state) = build_app(config).await?;

    // Check database connectivity
    if common::database::health_check(&state.db_pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Start the web server
    let listener = TcpListener::bind(&bind_address).await?;
    info!("Social service listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
