//! HTTP gateway exposing the agent manager.
//!
//! Thin layer over [`AgentManager`]: every chat-family endpoint answers 200
//! with the uniform outcome envelope, so callers switch on `success`
//! instead of status codes.

pub mod api;

use crate::agents::AgentManager;
use crate::config::Config;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Request body cap for every route.
const MAX_BODY_BYTES: usize = 1024 * 1024;
/// Generous ceiling; model round trips can be slow.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Shared handler state, built once at startup and injected into every route.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<AgentManager>,
    pub config: Arc<Config>,
}

/// Assemble the full route tree with body limit, timeout, and permissive
/// CORS applied to every route.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(api::handle_health))
        .route("/agents", get(api::handle_agents))
        .route("/agents/status", get(api::handle_agent_status))
        .route("/chat", post(api::handle_chat))
        .route("/auto-chat", post(api::handle_auto_chat))
        .route("/generate", post(api::handle_generate))
        .route("/check-compliance", post(api::handle_check_compliance))
        .route("/check-readability", post(api::handle_check_readability));

    Router::new()
        .route("/", get(api::handle_root))
        .route("/health", get(api::handle_health))
        .nest("/api/v1", api)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process receives a shutdown signal.
pub async fn run_gateway(host: &str, port: u16, state: AppState) -> Result<()> {
    let router = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind gateway to {addr}"))?;
    let local_addr = listener.local_addr().context("Failed to read gateway local address")?;
    tracing::info!(%local_addr, "Gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server error")?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(error) => {
            // Losing the signal handler must not take the server down.
            tracing::warn!("Failed to listen for shutdown signal: {error}");
            std::future::pending::<()>().await;
        }
    }
}
