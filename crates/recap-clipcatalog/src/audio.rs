//! Audio-processor client: requests audio extraction and polls for readiness.

use std::time::Duration;

use recap_auth::{sign_request, REQUEST_NONCE_HEADER, REQUEST_SIGNATURE_HEADER, REQUEST_TIMESTAMP_HEADER};
use recap_storage::{keys, ObjectStore};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ClipCatalogConfig;
use crate::error::{ClipCatalogError, ClipCatalogResult};

#[derive(Debug, Serialize)]
struct ProcessingRequest<'a> {
    clip_ids: &'a [String],
}

pub struct AudioProcessorClient<'a> {
    http: Client,
    config: &'a ClipCatalogConfig,
    store: &'a ObjectStore,
}

impl<'a> AudioProcessorClient<'a> {
    pub fn new(http: Client, config: &'a ClipCatalogConfig, store: &'a ObjectStore) -> Self {
        Self { http, config, store }
    }

    /// Issues a single HMAC-signed request asking the external service to
    /// extract audio for `clip_ids`. Does not wait for completion.
    pub async fn request_processing(&self, clip_ids: &[String]) -> ClipCatalogResult<()> {
        if clip_ids.is_empty() {
            return Ok(());
        }

        let payload = ProcessingRequest { clip_ids };
        let body = serde_json::to_vec(&payload)?;
        let timestamp = recap_auth::hmac::now_unix();
        let nonce = Uuid::new_v4().simple().to_string();
        let signature = sign_request(self.config.hmac_secret.as_bytes(), &body, timestamp, &nonce)
            .map_err(ClipCatalogError::Auth)?;

        let url = format!("{}/process", self.config.audio_processor_base_url);
        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header(REQUEST_SIGNATURE_HEADER, signature)
            .header(REQUEST_TIMESTAMP_HEADER, timestamp.to_string())
            .header(REQUEST_NONCE_HEADER, nonce)
            .body(body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status if status.is_server_error() => Err(ClipCatalogError::upstream_temporary(format!(
                "audio processor returned {status}"
            ))),
            status => Err(ClipCatalogError::upstream_permanent(format!(
                "audio processor returned {status}: {}",
                response.text().await.unwrap_or_default()
            ))),
        }
    }

    /// Polls `head(audio/{id}.wav)` for each clip with bounded attempts,
    /// returning the ids observed ready. Partial success is expected: the
    /// remainder is re-queued by the caller on a later run.
    pub async fn poll_ready(&self, clip_ids: &[String]) -> ClipCatalogResult<Vec<String>> {
        let mut pending: Vec<String> = clip_ids.to_vec();
        let mut ready = Vec::new();

        for attempt in 0..self.config.audio_poll_attempts {
            if pending.is_empty() {
                break;
            }

            let mut still_pending = Vec::new();
            for id in pending {
                let key = keys::audio_key(&id);
                if self.store.exists(&key).await? {
                    ready.push(id);
                } else {
                    still_pending.push(id);
                }
            }
            pending = still_pending;

            if !pending.is_empty() && attempt + 1 < self.config.audio_poll_attempts {
                tokio::time::sleep(Duration::from_secs(self.config.audio_poll_interval_secs)).await;
            }
        }

        if !pending.is_empty() {
            warn!(count = pending.len(), "clips still pending audio after poll budget");
        }

        info!(ready = ready.len(), "audio polling complete");
        Ok(ready)
    }
}

#[cfg(test)]
mod tests {
    // requires a live/mock HTTP server and is exercised at the integration level.
}
