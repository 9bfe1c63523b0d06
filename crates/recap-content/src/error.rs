//! Error taxonomy for ContentItem CRUD, migration, and scoring.

use recap_models::PipelineError;
use thiserror::Error;

pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("forbidden field set by caller: {0}")]
    ForbiddenField(String),

    #[error("disallowed status transition: {0}")]
    InvalidTransition(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("content item not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] recap_storage::StorageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<ContentError> for PipelineError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Validation(msg) | ContentError::ForbiddenField(msg) => PipelineError::validation(msg),
            ContentError::InvalidTransition(msg) | ContentError::PreconditionFailed(msg) => {
                PipelineError::state(msg)
            }
            ContentError::NotFound(msg) => PipelineError::validation(msg),
            ContentError::Storage(inner) => PipelineError::upstream_temporary(inner.to_string()),
            ContentError::Json(inner) => PipelineError::contract(inner.to_string()),
        }
    }
}
