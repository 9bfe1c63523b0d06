//! Auth & crypto error types.

use recap_models::PipelineError;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to acquire token: {0}")]
    TokenAcquisitionError(String),

    #[error("token failed verification: {0}")]
    TokenInvalidError(String),

    #[error("failed to mint JWT: {0}")]
    JwtError(String),

    #[error("HMAC signature mismatch")]
    SignatureMismatch,

    #[error("malformed signature header: {0}")]
    MalformedSignature(String),

    #[error("request timestamp outside allowed skew: {0}")]
    ClockSkew(String),

    #[error("duplicate nonce within skew window: {0}")]
    DuplicateNonce(String),

    #[error("rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    pub fn token_acquisition_error(msg: impl Into<String>) -> Self {
        Self::TokenAcquisitionError(msg.into())
    }

    pub fn token_invalid_error(msg: impl Into<String>) -> Self {
        Self::TokenInvalidError(msg.into())
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Network(_) | AuthError::RateLimited(_))
    }
}

impl From<AuthError> for PipelineError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Network(_) | AuthError::RateLimited(_) => {
                PipelineError::upstream_temporary(err.to_string())
            }
            AuthError::TokenAcquisitionError(_)
            | AuthError::TokenInvalidError(_)
            | AuthError::SignatureMismatch
            | AuthError::MalformedSignature(_)
            | AuthError::ClockSkew(_)
            | AuthError::DuplicateNonce(_) => PipelineError::auth(err.to_string()),
            AuthError::JwtError(_) => PipelineError::fatal_config(err.to_string()),
            AuthError::Json(_) => PipelineError::contract(err.to_string()),
        }
    }
}
