//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness probe (`GET /health`).
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness probe (`GET /health/ready`): checks the product store answers.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.products().health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}
