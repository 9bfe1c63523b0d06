//! Error taxonomy for clip-catalog ingestion, dedup, and audio processing.

use recap_models::PipelineError;
use thiserror::Error;

pub type ClipCatalogResult<T> = Result<T, ClipCatalogError>;

#[derive(Debug, Error)]
pub enum ClipCatalogError {
    #[error("clip catalog upstream temporary failure: {0}")]
    UpstreamTemporary(String),

    #[error("clip catalog upstream permanent failure: {0}")]
    UpstreamPermanent(String),

    #[error("auth error: {0}")]
    Auth(#[from] recap_auth::AuthError),

    #[error("storage error: {0}")]
    Storage(#[from] recap_storage::StorageError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("response decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClipCatalogError {
    pub fn upstream_temporary(msg: impl Into<String>) -> Self {
        Self::UpstreamTemporary(msg.into())
    }

    pub fn upstream_permanent(msg: impl Into<String>) -> Self {
        Self::UpstreamPermanent(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTemporary(_) | Self::Network(_) | Self::Auth(_)
        )
    }
}

impl recap_auth::Retryable for ClipCatalogError {
    fn is_retryable(&self) -> bool {
        ClipCatalogError::is_retryable(self)
    }
}

impl From<ClipCatalogError> for PipelineError {
    fn from(e: ClipCatalogError) -> Self {
        match e {
            ClipCatalogError::UpstreamTemporary(msg) => PipelineError::upstream_temporary(msg),
            ClipCatalogError::UpstreamPermanent(msg) => PipelineError::upstream_permanent(msg),
            ClipCatalogError::Auth(inner) => inner.into(),
            ClipCatalogError::Storage(inner) => PipelineError::upstream_temporary(inner.to_string()),
            ClipCatalogError::Network(inner) => PipelineError::upstream_temporary(inner.to_string()),
            ClipCatalogError::Json(inner) => PipelineError::contract(inner.to_string()),
        }
    }
}
