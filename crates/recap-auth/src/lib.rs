//! Token lifecycle and request-signing primitives shared across the
//! content-recap pipeline.
//!
//! - `token_cache` - OAuth2 client-credentials bearer token caching
//! - `jwt` - RS256 app JWT minting and installation-token caching
//! - `hmac` - Outbound request signing and inbound webhook verification
//! - `retry` - Retry policy with exponential backoff and jitter
//! - `metrics` - Prometheus metrics collection
//! - `error` - Shared error taxonomy for this crate

pub mod error;
pub mod hmac;
pub mod jwt;
pub mod metrics;
pub mod retry;
pub mod token_cache;

pub use error::{AuthError, AuthResult};
pub use hmac::{
    sign_request, verify_request, verify_webhook_signature, NonceCache, REQUEST_NONCE_HEADER,
    REQUEST_SIGNATURE_HEADER, REQUEST_TIMESTAMP_HEADER, WEBHOOK_SIGNATURE_HEADER,
};
pub use jwt::{mint_app_jwt, InstallationTokenCache, InstallationTokenExchanger};
pub use retry::{with_retry, RetryConfig, Retryable};
pub use token_cache::{OAuthTokenProvider, TokenCache};
