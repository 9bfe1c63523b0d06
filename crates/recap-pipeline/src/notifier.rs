//! Chat notifier: posts a run summary (or failure) embed (spec §4.16).
//!
//! Failures here are never fatal to a run: a notification is a courtesy,
//! not a pipeline output. A single `429`/`retry_after` is honored once;
//! anything past that is logged and dropped.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{error, warn};

const MAX_EMBED_FIELDS: usize = 5;

pub struct Notifier {
    http: Client,
    webhook_url: String,
}

impl Notifier {
    pub fn new(http: Client, webhook_url: String) -> Self {
        Self { http, webhook_url }
    }

    /// Summarizes a completed run: score, clip count, status, and a link to
    /// the opened PR.
    pub async fn notify_success(&self, overall_score: f64, clip_count: usize, status_summary: &str, pr_url: &str) {
        let fields = vec![
            field("Score", &format!("{overall_score:.1}/100")),
            field("Clips", &clip_count.to_string()),
            field("Status", status_summary),
            field("Pull Request", pr_url),
        ];
        self.send(embed_payload("Daily recap published", fields, 0x2ecc71)).await;
    }

    /// Reports a run that failed outright; no PR link because none exists.
    pub async fn notify_failure(&self, stage: &str, error_message: &str) {
        let fields = vec![field("Stage", stage), field("Error", error_message)];
        self.send(embed_payload("Daily recap run failed", fields, 0xe74c3c)).await;
    }

    async fn send(&self, payload: Value) {
        if self.webhook_url.is_empty() {
            warn!("notifier webhook url not configured, skipping notification");
            return;
        }

        if let Err(e) = self.send_once(&payload).await {
            error!(error = %e, "notification delivery failed, continuing without it");
        }
    }

    async fn send_once(&self, payload: &Value) -> Result<(), String> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            return Ok(());
        }

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);

            warn!(retry_after, "notifier rate limited, retrying once");
            tokio::time::sleep(std::time::Duration::from_secs(retry_after)).await;

            let retry = self
                .http
                .post(&self.webhook_url)
                .json(payload)
                .send()
                .await
                .map_err(|e| e.to_string())?;

            return if retry.status().is_success() {
                Ok(())
            } else {
                Err(format!("notifier returned {} after retry", retry.status()))
            };
        }

        Err(format!("notifier returned {}", response.status()))
    }
}

fn field(name: &str, value: &str) -> Value {
    json!({ "name": name, "value": value, "inline": true })
}

fn embed_payload(title: &str, fields: Vec<Value>, color: u32) -> Value {
    let mut fields = fields;
    fields.truncate(MAX_EMBED_FIELDS);
    json!({
        "embeds": [{
            "title": title,
            "color": color,
            "fields": fields,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_never_exceeds_field_limit() {
        let fields = (0..10).map(|i| field(&format!("f{i}"), "v")).collect();
        let payload = embed_payload("title", fields, 0);
        let len = payload["embeds"][0]["fields"].as_array().unwrap().len();
        assert!(len <= MAX_EMBED_FIELDS);
    }

    #[test]
    fn success_embed_includes_pr_link() {
        let payload = embed_payload(
            "Daily recap published",
            vec![field("Pull Request", "https://github.com/org/repo/pull/1")],
            0x2ecc71,
        );
        let fields = payload["embeds"][0]["fields"].as_array().unwrap();
        assert!(fields.iter().any(|f| f["value"] == "https://github.com/org/repo/pull/1"));
    }
}
