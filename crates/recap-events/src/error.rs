//! Error taxonomy for webhook receipt and event-store operations.

use recap_models::PipelineError;
use thiserror::Error;

pub type EventsResult<T> = Result<T, EventsError>;

#[derive(Debug, Error)]
pub enum EventsError {
    #[error("missing event-type header")]
    MissingEventType,

    #[error("missing signature header")]
    MissingSignature,

    #[error("signature verification failed: {0}")]
    SignatureInvalid(#[from] recap_auth::AuthError),

    #[error("malformed webhook body: {0}")]
    MalformedBody(String),

    #[error("storage error: {0}")]
    Storage(#[from] recap_storage::StorageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<EventsError> for PipelineError {
    fn from(e: EventsError) -> Self {
        match e {
            EventsError::MissingEventType | EventsError::MissingSignature | EventsError::MalformedBody(_) => {
                PipelineError::validation(e.to_string())
            }
            EventsError::SignatureInvalid(inner) => inner.into(),
            EventsError::Storage(inner) => PipelineError::upstream_temporary(inner.to_string()),
            EventsError::Json(inner) => PipelineError::contract(inner.to_string()),
        }
    }
}
