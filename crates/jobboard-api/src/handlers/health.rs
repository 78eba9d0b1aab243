//! Health and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "jobboard-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /healthz — liveness, no dependencies checked.
pub async fn liveness() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /ready — readiness, verifies the document store is reachable.
///
/// A probe read of a document that does not exist still proves
/// connectivity and auth; only transport or auth failures degrade.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.firestore.get_document("jobs", "__readiness_probe__").await {
        Ok(_) => (StatusCode::OK, Json(json!({"status": "ready"}))),
        Err(e) => {
            warn!(error = %e, "readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "degraded"})),
            )
        }
    }
}
