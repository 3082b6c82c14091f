//! HTTP service
//!
//! - Axum router with the backend and public caption endpoints
//! - Request handlers and their error shapes
//! - Permissive CORS for browser front ends

pub mod handlers;
pub mod routes;

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

use crate::app_config::Config;

pub use handlers::AppState;
pub use routes::create_router;

/// Bind `config.server` and serve until the process is stopped
pub async fn serve(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(config));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Starting HTTP server on {}", addr);
    axum::serve(listener, app).await.context("HTTP server stopped unexpectedly")?;

    Ok(())
}
