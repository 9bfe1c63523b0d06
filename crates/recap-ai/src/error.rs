//! Error taxonomy for the AI-backed stages: transcription, sectioning, and
//! quality judging.

use recap_models::PipelineError;
use thiserror::Error;

pub type AiResult<T> = Result<T, AiError>;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("inference request failed: {0}")]
    RequestFailed(String),

    #[error("all configured models exhausted: {0}")]
    ModelsExhausted(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("response decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AiError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn models_exhausted(msg: impl Into<String>) -> Self {
        Self::ModelsExhausted(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RequestFailed(_))
    }
}

impl recap_auth::Retryable for AiError {
    fn is_retryable(&self) -> bool {
        AiError::is_retryable(self)
    }
}

impl From<AiError> for PipelineError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::RequestFailed(msg) | AiError::ModelsExhausted(msg) => PipelineError::upstream_temporary(msg),
            AiError::Network(inner) => PipelineError::upstream_temporary(inner.to_string()),
            AiError::Json(inner) => PipelineError::contract(inner.to_string()),
        }
    }
}
