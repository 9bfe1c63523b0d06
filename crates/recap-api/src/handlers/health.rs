//! `GET /health`: confirms the object store bucket is reachable.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.check_connectivity().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed: object store unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse { status: "unavailable" })).into_response()
        }
    }
}
