//! HMAC-SHA256 request signing and webhook signature verification (spec §4.3).
//!
//! Two independent schemes share the same primitive:
//! - Outbound request signing: `X-Request-Signature` / `X-Request-Timestamp`
//!   / `X-Request-Nonce`, over `body || timestamp || nonce`.
//! - Inbound webhook verification: `X-Hub-Signature-256: sha256=<hex>`, over
//!   the raw request body alone.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use ::hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

const MAX_CLOCK_SKEW_SECS: i64 = 300;

pub const REQUEST_SIGNATURE_HEADER: &str = "X-Request-Signature";
pub const REQUEST_TIMESTAMP_HEADER: &str = "X-Request-Timestamp";
pub const REQUEST_NONCE_HEADER: &str = "X-Request-Nonce";
pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

fn hex_digest(secret: &[u8], message: &[u8]) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::MalformedSignature(e.to_string()))?;
    mac.update(message);
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// Decodes a hex string into bytes without pulling in a dedicated crate.
fn decode_hex(s: &str) -> Result<Vec<u8>, AuthError> {
    if s.len() % 2 != 0 {
        return Err(AuthError::MalformedSignature(format!(
            "odd-length hex string: {s}"
        )));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|e| AuthError::MalformedSignature(e.to_string()))
        })
        .collect()
}

/// Signs an outbound request body, returning the three header values to
/// attach. `nonce` is caller-supplied (expected to be a UUID or similarly
/// unique token per request).
pub fn sign_request(secret: &[u8], body: &[u8], timestamp: i64, nonce: &str) -> Result<String, AuthError> {
    let mut message = Vec::with_capacity(body.len() + 32 + nonce.len());
    message.extend_from_slice(body);
    message.extend_from_slice(timestamp.to_string().as_bytes());
    message.extend_from_slice(nonce.as_bytes());
    hex_digest(secret, &message)
}

/// Verifies an outbound-style signed request against a clock skew tolerance
/// and a nonce replay cache. Timing-safe: uses `Mac::verify_slice` rather
/// than comparing hex strings.
pub fn verify_request(
    secret: &[u8],
    body: &[u8],
    timestamp: i64,
    nonce: &str,
    signature_hex: &str,
    now: i64,
) -> Result<(), AuthError> {
    if (now - timestamp).abs() > MAX_CLOCK_SKEW_SECS {
        return Err(AuthError::ClockSkew(format!(
            "timestamp {timestamp} outside {MAX_CLOCK_SKEW_SECS}s window of now={now}"
        )));
    }

    let mut message = Vec::with_capacity(body.len() + 32 + nonce.len());
    message.extend_from_slice(body);
    message.extend_from_slice(timestamp.to_string().as_bytes());
    message.extend_from_slice(nonce.as_bytes());

    let expected_bytes = decode_hex(signature_hex)?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::MalformedSignature(e.to_string()))?;
    mac.update(&message);
    mac.verify_slice(&expected_bytes)
        .map_err(|_| AuthError::SignatureMismatch)
}

/// In-memory nonce replay cache. Good for a single process; a deployment
/// spanning multiple instances would need a shared store, which is out of
/// scope here.
pub struct NonceCache {
    seen: Mutex<HashSet<String>>,
}

impl Default for NonceCache {
    fn default() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }
}

impl NonceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `nonce` as seen, returning an error if it was already present.
    pub fn check_and_record(&self, nonce: &str) -> Result<(), AuthError> {
        let mut seen = self.seen.lock().expect("nonce cache mutex poisoned");
        if !seen.insert(nonce.to_string()) {
            return Err(AuthError::DuplicateNonce(nonce.to_string()));
        }
        Ok(())
    }
}

/// Verifies a `sha256=<hex>`-prefixed webhook signature over the raw body.
pub fn verify_webhook_signature(secret: &[u8], body: &[u8], header_value: &str) -> Result<(), AuthError> {
    let hex_sig = header_value.strip_prefix("sha256=").ok_or_else(|| {
        AuthError::MalformedSignature(format!("missing sha256= prefix: {header_value}"))
    })?;

    let expected_bytes = decode_hex(hex_sig)?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::MalformedSignature(e.to_string()))?;
    mac.update(body);
    mac.verify_slice(&expected_bytes)
        .map_err(|_| AuthError::SignatureMismatch)
}

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-webhook-secret";

    #[test]
    fn round_trips_request_signature() {
        let body = br#"{"hello":"world"}"#;
        let now = 1_700_000_000;
        let sig = sign_request(SECRET, body, now, "nonce-1").unwrap();
        assert!(verify_request(SECRET, body, now, "nonce-1", &sig, now).is_ok());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let body = b"payload";
        let sig = sign_request(SECRET, body, 1_700_000_000, "nonce-2").unwrap();
        let result = verify_request(SECRET, body, 1_700_000_000, "nonce-2", &sig, 1_700_000_000 + 301);
        assert!(matches!(result, Err(AuthError::ClockSkew(_))));
    }

    #[test]
    fn rejects_tampered_body() {
        let sig = sign_request(SECRET, b"original", 1_700_000_000, "nonce-3").unwrap();
        let result = verify_request(SECRET, b"tampered", 1_700_000_000, "nonce-3", &sig, 1_700_000_000);
        assert!(matches!(result, Err(AuthError::SignatureMismatch)));
    }

    #[test]
    fn nonce_cache_rejects_replay() {
        let cache = NonceCache::new();
        assert!(cache.check_and_record("abc").is_ok());
        assert!(matches!(
            cache.check_and_record("abc"),
            Err(AuthError::DuplicateNonce(_))
        ));
    }

    #[test]
    fn verifies_webhook_signature() {
        let body = br#"{"action":"opened"}"#;
        let digest = hex_digest(SECRET, body).unwrap();
        let header = format!("sha256={digest}");
        assert!(verify_webhook_signature(SECRET, body, &header).is_ok());
    }

    #[test]
    fn rejects_webhook_signature_missing_prefix() {
        let result = verify_webhook_signature(SECRET, b"body", "deadbeef");
        assert!(matches!(result, Err(AuthError::MalformedSignature(_))));
    }
}
