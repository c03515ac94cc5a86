//! API route handlers for the gateway.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use docent_core::error::DocentError;
use docent_core::types::FailureKind;

use super::server::AppState;

/// API information endpoint.
pub async fn api_info() -> Json<Value> {
    Json(json!({
        "message": "Docent — personal knowledge-base assistant API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /api/chat": "Ask a question, get an answer with sources",
            "GET /api/health": "Health check",
            "POST /api/knowledge/rebuild": "Re-ingest the data directory",
        },
        "usage": {
            "chat": {
                "method": "POST",
                "url": "/api/chat",
                "body": {"message": "Your question"},
                "response": {"response": "Answer text", "sources": ["file.md"], "error": null}
            }
        }
    }))
}

/// Health check endpoint — the operational status probe.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let status = state.assistant.status();
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "knowledge_base": if status.index_loaded { "loaded" } else { "unavailable" },
        "chunks": status.chunks,
        "model": if status.llm_configured { "available" } else { "unavailable" },
    }))
}

/// Main chat endpoint.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(message) = body.get("message").and_then(|v| v.as_str()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Missing 'message' in request body",
                "response": null,
                "sources": [],
            })),
        );
    };

    match state.assistant.answer_query(message).await {
        Ok(answer) => {
            let status = match answer.failure {
                Some(kind) => {
                    tracing::warn!("Degraded answer: {}", kind.as_str());
                    failure_status(kind)
                }
                None => StatusCode::OK,
            };
            (
                status,
                Json(json!({
                    "response": answer.text,
                    "sources": answer.sources,
                    "error": answer.failure.map(|k| k.as_str()),
                })),
            )
        }
        Err(DocentError::InvalidInput(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": msg,
                "response": null,
                "sources": [],
            })),
        ),
        Err(e) => {
            tracing::error!("Chat request failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": e.to_string(),
                    "response": null,
                    "sources": [],
                })),
            )
        }
    }
}

/// Administrative re-ingestion of the data directory.
pub async fn rebuild_knowledge(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.assistant.rebuild_from_data_dir().await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "documents": report.documents,
                "chunks": report.chunks,
            })),
        ),
        Err(e) => {
            tracing::error!("Index rebuild failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"ok": false, "error": e.to_string()})),
            )
        }
    }
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Endpoint not found"})),
    )
}

/// Degraded answers are server-side problems, never the client's fault.
fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::KnowledgeBaseUnavailable | FailureKind::ModelUnavailable => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        FailureKind::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        FailureKind::UpstreamError | FailureKind::UpstreamUnreachable => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_status_is_always_server_side() {
        for kind in [
            FailureKind::KnowledgeBaseUnavailable,
            FailureKind::ModelUnavailable,
            FailureKind::UpstreamTimeout,
            FailureKind::UpstreamError,
            FailureKind::UpstreamUnreachable,
        ] {
            assert!(failure_status(kind).is_server_error());
        }
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        assert_eq!(
            failure_status(FailureKind::UpstreamTimeout),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
