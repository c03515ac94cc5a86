//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use docent_core::config::GatewayConfig;
use docent_core::error::{DocentError, Result};
use docent_engine::Assistant;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    /// The assistant engine — retrieval, prompt assembly, generation.
    pub assistant: Arc<Assistant>,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    // The service is consumed by a browser widget, so all origins are
    // allowed.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(super::routes::api_info))
        .route("/api/chat", post(super::routes::chat))
        .route("/api/health", get(super::routes::health_check))
        .route(
            "/api/knowledge/rebuild",
            post(super::routes::rebuild_knowledge),
        )
        .fallback(super::routes::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Bind and serve until shutdown.
pub async fn start(config: &GatewayConfig, assistant: Arc<Assistant>) -> Result<()> {
    let state = AppState {
        assistant,
        start_time: std::time::Instant::now(),
    };
    let router = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on http://{addr}");

    axum::serve(listener, router)
        .await
        .map_err(|e| DocentError::Config(format!("server error: {e}")))?;
    Ok(())
}
