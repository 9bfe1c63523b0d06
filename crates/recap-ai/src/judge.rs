//! Deterministic quality evaluation of an assembled post, scored against
//! the configured overall/axis thresholds.

use recap_models::{JudgeAxes, JudgeEvaluation};
use serde::Deserialize;
use tracing::warn;

use crate::client::InferenceClient;
use crate::parse::parse_llm_json;

const MAX_CONTENT_CHARS: usize = 4000;

#[derive(Debug, Deserialize)]
struct JudgeResponse {
    overall: f64,
    per_axis: JudgeAxesResponse,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct JudgeAxesResponse {
    coherence: f64,
    correctness: f64,
    dev_signal: f64,
    narrative_flow: f64,
    #[serde(default)]
    sub_axis_a: Option<f64>,
    #[serde(default)]
    sub_axis_b: Option<f64>,
}

pub struct Judge<'a> {
    inference: &'a InferenceClient,
    models: &'a [String],
}

impl<'a> Judge<'a> {
    pub fn new(inference: &'a InferenceClient, models: &'a [String]) -> Self {
        Self { inference, models }
    }

    pub async fn evaluate(&self, title: &str, body_markdown: &str) -> JudgeEvaluation {
        let sanitized = sanitize_content(body_markdown);
        let prompt = build_prompt(title, &sanitized);

        let raw = match self.inference.call_with_fallback(self.models, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "judge inference failed, using neutral default");
                return JudgeEvaluation::neutral_default();
            }
        };

        match parse_llm_json::<JudgeResponse>(&raw) {
            Ok(parsed) => {
                let per_axis = JudgeAxes {
                    coherence: parsed.per_axis.coherence,
                    correctness: parsed.per_axis.correctness,
                    dev_signal: parsed.per_axis.dev_signal,
                    narrative_flow: parsed.per_axis.narrative_flow,
                    sub_axis_a: parsed.per_axis.sub_axis_a,
                    sub_axis_b: parsed.per_axis.sub_axis_b,
                }
                .clamped();

                JudgeEvaluation {
                    overall: parsed.overall.clamp(0.0, 100.0),
                    per_axis,
                    reasoning: parsed.reasoning,
                    recommendations: parsed.recommendations,
                    version: JudgeEvaluation::CURRENT_VERSION,
                }
            }
            Err(e) => {
                warn!(error = %e, "judge response malformed, using neutral default");
                JudgeEvaluation::neutral_default()
            }
        }
    }
}

/// Collapses runs of >2 consecutive newlines, strips backticks, and caps
/// length before the content is embedded in a prompt.
fn sanitize_content(input: &str) -> String {
    let no_backticks = input.replace('`', "");
    let collapsed = regex_lite::Regex::new(r"\n{3,}")
        .expect("static regex is valid")
        .replace_all(&no_backticks, "\n\n")
        .to_string();

    collapsed.chars().take(MAX_CONTENT_CHARS).collect()
}

fn build_prompt(title: &str, content: &str) -> String {
    format!(
        r#"Evaluate this daily developer recap post for quality.

Title: {title}

Content:
{content}

Return ONLY a single JSON object with this schema:
{{
  "overall": 0-100,
  "per_axis": {{
    "coherence": 0-100,
    "correctness": 0-100,
    "dev_signal": 0-100,
    "narrative_flow": 0-100
  }},
  "reasoning": "brief explanation of the score",
  "recommendations": ["short actionable suggestions, if any"]
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_excess_newlines_and_backticks() {
        let input = "line one\n\n\n\nline two with `code`";
        let sanitized = sanitize_content(input);
        assert!(!sanitized.contains('`'));
        assert!(!sanitized.contains("\n\n\n"));
    }

    #[test]
    fn caps_content_length() {
        let input = "a".repeat(MAX_CONTENT_CHARS + 500);
        let sanitized = sanitize_content(&input);
        assert_eq!(sanitized.chars().count(), MAX_CONTENT_CHARS);
    }
}
