//! AI model configuration: one fallback chain of model identifiers per task.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub transcribe_models: Vec<String>,
    pub section_models: Vec<String>,
    pub judge_models: Vec<String>,
    pub request_timeout: Duration,
}

fn models_from_env(var: &str, default: &[&str]) -> Vec<String> {
    std::env::var(var)
        .ok()
        .map(|s| s.split(',').map(|m| m.trim().to_string()).filter(|m| !m.is_empty()).collect())
        .filter(|v: &Vec<String>| !v.is_empty())
        .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("AI_API_KEY").unwrap_or_default(),
            transcribe_models: models_from_env(
                "AI_TRANSCRIBE_MODELS",
                &["gemini-2.5-flash", "gemini-2.5-flash-lite"],
            ),
            section_models: models_from_env(
                "AI_SECTION_MODELS",
                &["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-2.5-pro"],
            ),
            judge_models: models_from_env(
                "AI_JUDGE_MODELS",
                &["gemini-2.5-pro", "gemini-2.5-flash"],
            ),
            request_timeout: std::env::var("AI_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(30)),
        }
    }
}
