//! Clip catalog client: fetches recently-created clips in a time window.

use std::sync::Arc;

use recap_auth::{with_retry, RetryConfig, TokenCache};
use recap_models::Clip;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::warn;

use crate::config::ClipCatalogConfig;
use crate::error::{ClipCatalogError, ClipCatalogResult};

#[derive(Debug, Deserialize)]
struct ListClipsResponse {
    data: Vec<ClipDto>,
}

#[derive(Debug, Deserialize)]
struct ClipDto {
    id: String,
    title: String,
    url: String,
    embed_url: String,
    thumbnail_url: String,
    duration: f64,
    created_at: String,
    broadcaster_name: String,
    creator_name: String,
    view_count: u64,
}

pub struct ClipCatalogClient {
    http: Client,
    config: ClipCatalogConfig,
    tokens: Arc<TokenCache>,
}

impl ClipCatalogClient {
    pub fn new(http: Client, config: ClipCatalogConfig, tokens: Arc<TokenCache>) -> Self {
        Self { http, config, tokens }
    }

    /// Fetches clips created in `[since_iso, until_iso)` for `broadcaster_id`,
    /// capped at `max` (upstream default 100).
    pub async fn list_recent_clips(
        &self,
        broadcaster_id: &str,
        since_iso: &str,
        until_iso: &str,
        max: u32,
    ) -> ClipCatalogResult<Vec<Clip>> {
        let url = format!("{}/clips", self.config.api_base_url);
        let retry_config = RetryConfig::default();

        with_retry(&retry_config, "clip_catalog.list_recent_clips", || async {
            let token = self.tokens.get_token().await?;

            let response = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .header("Client-Id", &self.config.client_id)
                .query(&[
                    ("broadcaster_id", broadcaster_id),
                    ("started_at", since_iso),
                    ("ended_at", until_iso),
                    ("first", &max.to_string()),
                ])
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let body: ListClipsResponse = response.json().await?;
                    Ok(body.data.into_iter().map(clip_from_dto).collect())
                }
                status if status.is_server_error() => {
                    Err(ClipCatalogError::upstream_temporary(format!(
                        "clip catalog returned {status}"
                    )))
                }
                status => {
                    let text = response.text().await.unwrap_or_default();
                    warn!(%status, body = %text, "clip catalog rejected request");
                    Err(ClipCatalogError::upstream_permanent(format!(
                        "clip catalog returned {status}: {text}"
                    )))
                }
            }
        })
        .await
    }
}

fn clip_from_dto(dto: ClipDto) -> Clip {
    Clip {
        clip_id: dto.id,
        title: dto.title,
        url: dto.url,
        embed_url: dto.embed_url,
        thumbnail_url: dto.thumbnail_url,
        duration_seconds: dto.duration.round().clamp(0.0, u32::MAX as f64) as u32,
        view_count: dto.view_count,
        created_at: dto.created_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
        broadcaster: dto.broadcaster_name,
        creator: dto.creator_name,
    }
}
