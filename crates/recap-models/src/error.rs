//! The pipeline-wide error taxonomy. Every crate's local error enum
//! converts into this one at its boundary; stage code matches only the
//! variants it can meaningfully handle and lets the rest propagate to the
//! orchestrator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad input; surfaced as 400 with field-level details. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing or invalid caller credentials; 401/403. Never retried.
    #[error("auth failed: {0}")]
    Auth(String),

    /// Network, 5xx, timeouts, 429. Retried with exponential backoff up to
    /// the stage's limit.
    #[error("upstream temporary error: {0}")]
    UpstreamTemporary(String),

    /// 4xx (non-429). Reported upward; the pipeline records a per-item
    /// failure and continues.
    #[error("upstream permanent error: {0}")]
    UpstreamPermanent(String),

    /// The AI service returned a malformed payload. Sectioner/Judge fall
    /// back to safe defaults and annotate the record rather than propagate.
    #[error("contract error: {0}")]
    Contract(String),

    /// A disallowed ContentItem transition or missing precondition. Treated
    /// as a bug signal: the stage aborts and the run is marked failed.
    #[error("state error: {0}")]
    State(String),

    /// A missing secret or other startup-blocking misconfiguration.
    #[error("fatal config error: {0}")]
    FatalConfig(String),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn upstream_temporary(msg: impl Into<String>) -> Self {
        Self::UpstreamTemporary(msg.into())
    }

    pub fn upstream_permanent(msg: impl Into<String>) -> Self {
        Self::UpstreamPermanent(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn fatal_config(msg: impl Into<String>) -> Self {
        Self::FatalConfig(msg.into())
    }

    /// Only `UpstreamTemporary` is worth a retry loop; every other variant
    /// is either permanent or something a retry can't fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::UpstreamTemporary(_))
    }

    /// Maps the taxonomy onto an HTTP status for the API surface.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::Validation(_) => 400,
            PipelineError::Auth(_) => 401,
            PipelineError::UpstreamTemporary(_) => 503,
            PipelineError::UpstreamPermanent(_) => 502,
            PipelineError::Contract(_) => 502,
            PipelineError::State(_) => 409,
            PipelineError::FatalConfig(_) => 500,
        }
    }
}
