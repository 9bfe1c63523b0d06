//! Builds a per-clip [`Section`] from its title, duration, and transcript
//! text. Tolerant of malformed model output: sectioning never aborts the
//! pipeline, falling back to a well-formed default section instead.

use recap_models::Section;
use serde_json::Value;
use tracing::warn;

use crate::client::InferenceClient;
use crate::error::AiResult;
use crate::parse::parse_llm_json;

pub struct Sectioner<'a> {
    inference: &'a InferenceClient,
    models: &'a [String],
}

impl<'a> Sectioner<'a> {
    pub fn new(inference: &'a InferenceClient, models: &'a [String]) -> Self {
        Self { inference, models }
    }

    pub async fn section(
        &self,
        title: &str,
        duration_seconds: u32,
        transcript_text: &str,
        clip_url: &str,
    ) -> Section {
        let prompt = build_prompt(title, duration_seconds, transcript_text);

        let raw = match self.inference.call_with_fallback(self.models, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "sectioner inference failed, using fallback section");
                return fallback_section(title, clip_url);
            }
        };

        let value: Value = match parse_llm_json(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "sectioner response unparseable, using fallback section");
                return fallback_section(title, clip_url);
            }
        };

        coerce_section(&value, title, clip_url)
    }
}

/// Applies the defensive coercion rules: slice/clamp/default every field so
/// a partially-malformed response still yields a usable section.
fn coerce_section(value: &Value, title: &str, clip_url: &str) -> Section {
    let h2 = value
        .get("h2")
        .and_then(Value::as_str)
        .map(|s| s.chars().take(Section::MAX_TITLE_LEN).collect())
        .unwrap_or_else(|| title.to_string());

    let bullets: Vec<String> = value
        .get("bullets")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|v| (2..=3).contains(&v.len()))
        .unwrap_or_else(default_bullets);

    let paragraph = value
        .get("paragraph")
        .and_then(Value::as_str)
        .filter(|s| s.len() >= 50)
        .map(str::to_string)
        .unwrap_or_else(default_paragraph);

    let repo = value
        .get("repo")
        .and_then(Value::as_str)
        .filter(|s| s.contains('/'))
        .map(str::to_string);

    Section {
        title: h2,
        bullets,
        paragraph,
        clip_url: clip_url.to_string(),
        source_deep_link: None,
        repo,
        pr_links: None,
    }
}

fn fallback_section(title: &str, clip_url: &str) -> Section {
    Section {
        title: title.chars().take(Section::MAX_TITLE_LEN).collect(),
        bullets: default_bullets(),
        paragraph: default_paragraph(),
        clip_url: clip_url.to_string(),
        source_deep_link: None,
        repo: None,
        pr_links: None,
    }
}

fn default_bullets() -> Vec<String> {
    vec!["Highlight clip".to_string(), "See clip for details".to_string()]
}

fn default_paragraph() -> String {
    "This clip captures a notable moment from the stream. Automatic summarization was unavailable for this entry.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_is_unparseable_and_falls_back_to_default_section() {
        let result: AiResult<Value> = parse_llm_json("");
        assert!(result.is_err());

        let section = fallback_section("Clutch ace in ranked queue", "https://clips.example/abc");
        assert_eq!(section.title, "Clutch ace in ranked queue");
        assert_eq!(section.bullets, default_bullets());
        assert_eq!(section.paragraph, default_paragraph());
        assert!(section.repo.is_none());
    }

    #[test]
    fn non_json_response_is_unparseable_and_falls_back_to_default_section() {
        let result: AiResult<Value> = parse_llm_json("not json");
        assert!(result.is_err());

        let section = fallback_section("Epic clutch play", "https://clips.example/xyz");
        assert_eq!(section.bullets.len(), 2);
        assert_eq!(section.paragraph, default_paragraph());
    }

    #[test]
    fn fenced_partial_object_coerces_missing_fields_to_defaults() {
        let raw = "```json\n{\"h2\": \"Quick save\"}\n```";
        let value: Value = parse_llm_json(raw).expect("fenced object with one field still parses");
        let section = coerce_section(&value, "fallback title", "https://clips.example/qs");

        assert_eq!(section.title, "Quick save");
        assert_eq!(section.bullets, default_bullets());
        assert_eq!(section.paragraph, default_paragraph());
        assert!(section.repo.is_none());
    }

    #[test]
    fn title_exceeding_max_len_is_truncated_in_fallback() {
        let long_title: String = "x".repeat(Section::MAX_TITLE_LEN + 20);
        let section = fallback_section(&long_title, "https://clips.example/long");
        assert_eq!(section.title.chars().count(), Section::MAX_TITLE_LEN);
    }

    #[test]
    fn short_bullets_array_is_rejected_in_favor_of_defaults() {
        let value: Value = serde_json::json!({
            "h2": "Too few bullets",
            "bullets": ["only one"],
            "paragraph": "x".repeat(60),
        });
        let section = coerce_section(&value, "fallback", "https://clips.example/one");
        assert_eq!(section.bullets, default_bullets());
    }
}

fn build_prompt(title: &str, duration_seconds: u32, transcript_text: &str) -> String {
    format!(
        r#"Summarize this stream clip for a developer-facing daily recap post.

Title: {title}
Duration: {duration_seconds}s
Transcript: {transcript_text}

Return ONLY a single JSON object with this schema:
{{
  "h2": "short punchy heading, <=60 chars",
  "bullets": ["2 to 3 short bullet points"],
  "paragraph": "a >=50 character paragraph describing what happened",
  "repo": "org/repo if a specific repository is clearly referenced, else omit"
}}"#
    )
}
