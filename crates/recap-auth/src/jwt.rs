//! RS256 JWT minting for installation-scoped source-control tokens (spec §4.3).
//!
//! Mints a short-lived JWT (`iss/iat/exp`, `exp - iat <= 600s`) signed with
//! an application's PKCS#8 or PKCS#1 RSA private key, then exchanges it with
//! the source-control API for an installation access token, which is cached
//! for 55 minutes regardless of what the server declares.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{AuthError, AuthResult};

const MAX_JWT_LIFETIME_SECS: i64 = 600;
const CLOCK_BACKDATE_SECS: i64 = 60;
const INSTALLATION_TOKEN_TTL: Duration = Duration::from_secs(55 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iat: i64,
    exp: i64,
    iss: String,
}

/// Accepts PEM with either literal or escaped (`\n`) newlines, in PKCS#8 or
/// PKCS#1 form, and produces the `EncodingKey` jsonwebtoken needs.
fn load_encoding_key(pem: &str) -> AuthResult<EncodingKey> {
    let normalized = pem.replace("\\n", "\n");
    EncodingKey::from_rsa_pem(normalized.as_bytes())
        .map_err(|e| AuthError::JwtError(format!("invalid RSA private key: {e}")))
}

/// Mints the application-level JWT used to request an installation token.
/// `now` is injected so the 600s-lifetime invariant is testable without
/// wall-clock flakiness.
pub fn mint_app_jwt(app_id: &str, private_key_pem: &str, kid: Option<&str>, now: i64) -> AuthResult<String> {
    let iat = now - CLOCK_BACKDATE_SECS;
    let exp = iat + MAX_JWT_LIFETIME_SECS;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);

    let claims = Claims {
        iat,
        exp,
        iss: app_id.to_string(),
    };

    let key = load_encoding_key(private_key_pem)?;
    encode(&header, &claims, &key).map_err(|e| AuthError::JwtError(e.to_string()))
}

/// A way to exchange a signed app JWT for a scoped installation access
/// token. Implemented against the source-control REST API by
/// `recap-pipeline`'s publisher; kept as a trait so the cache below can be
/// tested without network access.
#[async_trait::async_trait]
pub trait InstallationTokenExchanger: Send + Sync {
    async fn exchange(&self, app_jwt: &str) -> AuthResult<String>;
}

struct CachedInstallationToken {
    token: String,
    expires_at: Instant,
}

/// Caches an installation access token for 55 minutes, re-minting the app
/// JWT and exchanging it whenever the cache is empty or stale.
pub struct InstallationTokenCache {
    app_id: String,
    private_key_pem: String,
    kid: Option<String>,
    exchanger: Arc<dyn InstallationTokenExchanger>,
    cache: RwLock<Option<CachedInstallationToken>>,
}

impl InstallationTokenCache {
    pub fn new(
        app_id: impl Into<String>,
        private_key_pem: impl Into<String>,
        kid: Option<String>,
        exchanger: Arc<dyn InstallationTokenExchanger>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            private_key_pem: private_key_pem.into(),
            kid,
            exchanger,
            cache: RwLock::new(None),
        }
    }

    pub async fn get_token(&self) -> AuthResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if Instant::now() < cached.expires_at {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }

        let now = chrono::Utc::now().timestamp();
        let app_jwt = mint_app_jwt(&self.app_id, &self.private_key_pem, self.kid.as_deref(), now)?;
        let token = self.exchanger.exchange(&app_jwt).await?;

        *cache = Some(CachedInstallationToken {
            token: token.clone(),
            expires_at: Instant::now() + INSTALLATION_TOKEN_TTL,
        });

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    // A 2048-bit RSA test key generated solely for unit tests; never used
    // to sign anything outside this module.
    const TEST_KEY_PEM: &str = include_str!("testdata/test_rsa_key.pem");

    fn decode_segment(segment: &str) -> serde_json::Value {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn jwt_has_expected_shape() {
        let now = 1_700_000_000;
        let token = mint_app_jwt("app-123", TEST_KEY_PEM, Some("kid-1"), now).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header = decode_segment(parts[0]);
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["typ"], "JWT");
        assert_eq!(header["kid"], "kid-1");

        let payload = decode_segment(parts[1]);
        let iat = payload["iat"].as_i64().unwrap();
        let exp = payload["exp"].as_i64().unwrap();
        assert_eq!(payload["iss"], "app-123");
        assert!(iat <= now);
        assert!(exp - iat <= 600);
    }

    #[test]
    fn accepts_escaped_newlines() {
        let escaped = TEST_KEY_PEM.replace('\n', "\\n");
        assert!(mint_app_jwt("app-123", &escaped, None, 1_700_000_000).is_ok());
    }

    #[test]
    fn rejects_garbage_key() {
        let bogus = STANDARD.encode("not a key");
        assert!(mint_app_jwt("app-123", &bogus, None, 1_700_000_000).is_err());
    }
}
