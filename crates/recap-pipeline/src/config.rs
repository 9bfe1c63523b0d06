//! Pipeline configuration: scheduling windows, SCM publishing targets,
//! notifier, and scoring thresholds (spec §4.2, §6).

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub broadcaster_id: Option<String>,
    pub lookback_hours: i64,
    pub max_clips_per_run: usize,
    pub temporal_window_hours: i64,

    pub judge_overall_min: f64,
    pub judge_axis_min: f64,

    pub retries_transcribe: u32,

    pub scm_app_id: String,
    pub scm_installation_id: String,
    pub scm_private_key_pem: String,
    pub scm_app_kid: Option<String>,
    pub scm_api_base_url: String,

    pub content_repo_owner: String,
    pub content_repo_name: String,
    pub content_base_branch: String,
    pub content_staging_branch: String,

    pub notifier_webhook_url: String,

    pub hourly_interval: Duration,
    pub six_hourly_interval: Duration,
    pub daily_interval: Duration,
}

impl PipelineConfig {
    /// Environment-variable-per-field with fallback defaults, in the idiom
    /// of the reference worker config.
    pub fn from_env() -> Self {
        Self {
            broadcaster_id: std::env::var("CLIP_CATALOG_BROADCASTER_ID").ok(),
            lookback_hours: env_parsed("PIPELINE_LOOKBACK_HOURS", 24),
            max_clips_per_run: env_parsed("PIPELINE_MAX_CLIPS_PER_RUN", 12),
            temporal_window_hours: env_parsed("PIPELINE_TEMPORAL_WINDOW_HOURS", 2),

            judge_overall_min: env_parsed("JUDGE_OVERALL_MIN", 80.0),
            judge_axis_min: env_parsed("JUDGE_AXIS_MIN", 60.0),

            retries_transcribe: env_parsed("RETRIES_TRANSCRIBE", 3),

            scm_app_id: std::env::var("SCM_APP_ID").unwrap_or_default(),
            scm_installation_id: std::env::var("SCM_INSTALLATION_ID").unwrap_or_default(),
            scm_private_key_pem: std::env::var("SCM_PRIVATE_KEY_PEM").unwrap_or_default(),
            scm_app_kid: std::env::var("SCM_APP_KID").ok(),
            scm_api_base_url: std::env::var("SCM_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),

            content_repo_owner: std::env::var("CONTENT_REPO_OWNER").unwrap_or_default(),
            content_repo_name: std::env::var("CONTENT_REPO_NAME").unwrap_or_default(),
            content_base_branch: std::env::var("CONTENT_BASE_BRANCH").unwrap_or_else(|_| "main".to_string()),
            content_staging_branch: std::env::var("CONTENT_STAGING_BRANCH")
                .unwrap_or_else(|_| "main".to_string()),

            notifier_webhook_url: std::env::var("NOTIFIER_WEBHOOK_URL").unwrap_or_default(),

            hourly_interval: Duration::from_secs(3600),
            six_hourly_interval: Duration::from_secs(6 * 3600),
            daily_interval: Duration::from_secs(24 * 3600),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_documented_defaults() {
        std::env::remove_var("PIPELINE_LOOKBACK_HOURS");
        std::env::remove_var("JUDGE_OVERALL_MIN");
        let config = PipelineConfig::from_env();
        assert_eq!(config.lookback_hours, 24);
        assert_eq!(config.max_clips_per_run, 12);
        assert_eq!(config.judge_overall_min, 80.0);
        assert_eq!(config.judge_axis_min, 60.0);
    }
}
