//! Client-credentials OAuth token cache (spec §4.3).
//!
//! Provides a thread-safe, async-aware token cache with:
//! - Refresh margin (skew) to avoid token expiry during in-flight requests
//! - Single-flight pattern to prevent thundering herd on refresh
//! - Graceful fallback to an existing, still-usable token on refresh failure
//! - Validation of a freshly-acquired token against a verify endpoint before caching

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};

/// Conservative token TTL when the token endpoint doesn't declare one.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(55 * 60);

/// A source of bearer tokens via the OAuth client-credentials grant, plus a
/// way to validate a freshly-minted token before it's cached. Implemented
/// once per upstream (the clip catalog being the only current consumer);
/// kept as a trait so the cache logic below is exercised with a fake in
/// tests without any network access.
#[async_trait::async_trait]
pub trait OAuthTokenProvider: Send + Sync {
    /// Acquires a new token, returning it with its server-declared TTL (or
    /// `None` if the server didn't declare one).
    async fn acquire(&self) -> AuthResult<(String, Option<Duration>)>;

    /// Validates a freshly-acquired token against the provider's verify
    /// endpoint before it is trusted and cached.
    async fn validate(&self, token: &str) -> AuthResult<bool>;
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self, skew: Duration) -> bool {
        Instant::now() + skew < self.expires_at
    }

    fn is_usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Thread-safe client-credentials token cache with single-flight refresh.
pub struct TokenCache {
    provider: Arc<dyn OAuthTokenProvider>,
    skew: Duration,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn OAuthTokenProvider>, skew: Duration) -> Self {
        Self {
            provider,
            skew,
            cache: RwLock::new(None),
        }
    }

    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }

    /// Gets a valid access token, refreshing if necessary.
    ///
    /// - Fast path: return the cached token if `now + skew < expires_at`.
    /// - Slow path: acquire a write lock, double-check, then refresh.
    /// - Fallback: on refresh failure, reuse the existing token if it's
    ///   still technically usable (past the skew margin but not expired).
    pub async fn get_token(&self) -> AuthResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid(self.skew) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid(self.skew) {
                return Ok(cached.access_token.clone());
            }
        }

        self.refresh_token(&mut cache).await
    }

    async fn refresh_token(&self, cache: &mut Option<CachedToken>) -> AuthResult<String> {
        match self.provider.acquire().await {
            Ok((access_token, ttl)) => {
                if !self.provider.validate(&access_token).await? {
                    return Err(AuthError::token_invalid_error(
                        "acquired token failed verification",
                    ));
                }

                let expires_at = Instant::now() + ttl.unwrap_or(TOKEN_DEFAULT_TTL);
                *cache = Some(CachedToken {
                    access_token: access_token.clone(),
                    expires_at,
                });

                debug!("refreshed OAuth token");
                Ok(access_token)
            }
            Err(e) => {
                if let Some(cached) = cache.as_ref() {
                    if cached.is_usable() {
                        warn!("token refresh failed, reusing existing token: {e}");
                        return Ok(cached.access_token.clone());
                    }
                }
                Err(AuthError::token_acquisition_error(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FakeProvider {
        acquisitions: AtomicU32,
        fail_after: Option<u32>,
        valid: bool,
    }

    #[async_trait::async_trait]
    impl OAuthTokenProvider for FakeProvider {
        async fn acquire(&self) -> AuthResult<(String, Option<Duration>)> {
            let n = self.acquisitions.fetch_add(1, Ordering::SeqCst);
            if self.fail_after == Some(n) {
                return Err(AuthError::token_acquisition_error("upstream down"));
            }
            Ok((format!("token-{n}"), Some(Duration::from_secs(1))))
        }

        async fn validate(&self, _token: &str) -> AuthResult<bool> {
            Ok(self.valid)
        }
    }

    #[tokio::test]
    async fn caches_until_skew_boundary() {
        let provider = Arc::new(FakeProvider {
            acquisitions: AtomicU32::new(0),
            fail_after: None,
            valid: true,
        });
        let cache = TokenCache::new(provider.clone(), Duration::from_millis(10));
        let first = cache.get_token().await.unwrap();
        let second = cache.get_token().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.acquisitions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_token() {
        let provider = Arc::new(FakeProvider {
            acquisitions: AtomicU32::new(0),
            fail_after: None,
            valid: false,
        });
        let cache = TokenCache::new(provider, Duration::from_millis(10));
        assert!(matches!(
            cache.get_token().await,
            Err(AuthError::TokenInvalidError(_))
        ));
    }

    #[tokio::test]
    async fn falls_back_to_stale_token_on_refresh_failure() {
        let provider = Arc::new(FakeProvider {
            acquisitions: AtomicU32::new(0),
            fail_after: Some(1),
            valid: true,
        });
        let cache = TokenCache::new(provider, Duration::from_secs(2));
        let first = cache.get_token().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let second = cache.get_token().await.unwrap();
        assert_eq!(first, second);
    }
}
