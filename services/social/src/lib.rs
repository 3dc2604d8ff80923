//! Murmur, a small social network
//!
//! Users register, log in, publish short posts with an optional image, keep a
//! profile with a picture and a bio, and follow each other. Pages are rendered
//! on the server; the authenticated user lives in a cookie session.
//!
//! ```no_run
//! use social::{AppConfig, build_app};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AppConfig::from_env()?;
//! let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
//! let (app, _state) = build_app(config).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod flash;
pub mod forms;
pub mod media;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;
pub mod validation;

use anyhow::Result;
use axum::Router;
use common::database::{init_pool, run_migrations};
use tracing::info;

pub use config::AppConfig;
pub use state::AppState;

/// Open the database, apply migrations, prepare the media root and build the
/// router
pub async fn build_app(config: AppConfig) -> Result<(Router, AppState)> {
    let pool = init_pool(&config.database).await?;
    run_migrations(&pool).await?;

    let state = AppState::new(pool, config)?;
    state.media.init().await?;
    info!("Self-follow policy: {}", state.config.self_follow);

    Ok((routes::create_router(state.clone()), state))
}
