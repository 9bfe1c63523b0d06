//! API error types: translates every sibling crate's error taxonomy into an
//! HTTP status and a response body, redacting internal detail in production.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use recap_content::ContentError;
use recap_events::EventsError;
use recap_models::PipelineError;
use recap_storage::StorageError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("rate limited")]
    RateLimited,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Events(#[from] EventsError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::RateLimited => 429,
            ApiError::Pipeline(e) => e.status_code(),
            ApiError::Content(e) => content_error_status(e),
            ApiError::Events(e) => events_error_status(e),
            ApiError::Storage(_) => 503,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Whether this variant's message is safe to hide behind a generic
    /// "internal error" response in production.
    fn redact_in_production(&self) -> bool {
        matches!(self, ApiError::Pipeline(_) | ApiError::Content(_) | ApiError::Events(_) | ApiError::Storage(_))
    }
}

fn content_error_status(e: &ContentError) -> u16 {
    match e {
        ContentError::Validation(_) | ContentError::ForbiddenField(_) => 400,
        ContentError::InvalidTransition(_) | ContentError::PreconditionFailed(_) => 409,
        ContentError::NotFound(_) => 404,
        ContentError::Storage(_) => 503,
        ContentError::Json(_) => 502,
    }
}

fn events_error_status(e: &EventsError) -> u16 {
    match e {
        EventsError::MissingEventType | EventsError::MissingSignature | EventsError::MalformedBody(_) => 400,
        EventsError::SignatureInvalid(_) => 401,
        EventsError::Storage(_) => 503,
        EventsError::Json(_) => 502,
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = if self.redact_in_production() && std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
            "an internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}
