//! `GET /validate-twitch` and `GET /validate-github`: on-demand credential
//! checks, distinct from the hourly `validate_tokens` sweep so a caller gets
//! a clean 200/400 for one upstream at a time.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
struct ValidationResponse {
    valid: bool,
}

pub async fn validate_twitch(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.orchestrator.validate_twitch().await.map_err(ApiError::from)?;
    Ok((StatusCode::OK, Json(ValidationResponse { valid: true })))
}

pub async fn validate_github(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.orchestrator.validate_github().await.map_err(ApiError::from)?;
    Ok((StatusCode::OK, Json(ValidationResponse { valid: true })))
}
