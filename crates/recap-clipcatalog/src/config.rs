//! Clip catalog and audio-processor configuration.

#[derive(Debug, Clone)]
pub struct ClipCatalogConfig {
    pub client_id: String,
    pub client_secret: String,
    pub broadcaster_login: Option<String>,
    pub broadcaster_id: Option<String>,
    pub token_endpoint: String,
    pub validate_endpoint: String,
    pub api_base_url: String,
    pub audio_processor_base_url: String,
    pub hmac_secret: String,
    pub dedup_concurrency: usize,
    pub audio_poll_attempts: u32,
    pub audio_poll_interval_secs: u64,
    pub max_retries_audio: u32,
}

impl ClipCatalogConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: std::env::var("CLIP_CATALOG_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("CLIP_CATALOG_CLIENT_SECRET").unwrap_or_default(),
            broadcaster_login: std::env::var("CLIP_CATALOG_BROADCASTER_LOGIN").ok(),
            broadcaster_id: std::env::var("CLIP_CATALOG_BROADCASTER_ID").ok(),
            token_endpoint: std::env::var("CLIP_CATALOG_TOKEN_ENDPOINT")
                .unwrap_or_else(|_| "https://id.twitch.tv/oauth2/token".to_string()),
            validate_endpoint: std::env::var("CLIP_CATALOG_VALIDATE_ENDPOINT")
                .unwrap_or_else(|_| "https://id.twitch.tv/oauth2/validate".to_string()),
            api_base_url: std::env::var("CLIP_CATALOG_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.twitch.tv/helix".to_string()),
            audio_processor_base_url: std::env::var("AUDIO_PROCESSOR_BASE_URL").unwrap_or_default(),
            hmac_secret: std::env::var("HMAC_SHARED_SECRET").unwrap_or_default(),
            dedup_concurrency: std::env::var("DEDUP_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
            audio_poll_attempts: std::env::var("AUDIO_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6),
            audio_poll_interval_secs: std::env::var("AUDIO_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            max_retries_audio: std::env::var("MAX_RETRIES_AUDIO")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
        }
    }
}
