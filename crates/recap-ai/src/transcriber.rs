//! Speech-to-text transcription of an audio artifact via the inference
//! model's multimodal endpoint.

use recap_models::{Transcript, TranscriptSegment};
use serde::Deserialize;

use crate::client::InferenceClient;
use crate::error::AiResult;
use crate::parse::parse_llm_json;

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    language: String,
    #[serde(default)]
    full_text: String,
    #[serde(default)]
    segments: Vec<SegmentResponse>,
}

#[derive(Debug, Deserialize)]
struct SegmentResponse {
    start_s: f64,
    end_s: f64,
    text: String,
}

pub struct Transcriber<'a> {
    inference: &'a InferenceClient,
    models: &'a [String],
}

impl<'a> Transcriber<'a> {
    pub fn new(inference: &'a InferenceClient, models: &'a [String]) -> Self {
        Self { inference, models }
    }

    /// Transcribes the clip identified by `clip_id`, given an accessible
    /// `audio_url` the model can fetch. Callers are expected to have
    /// already verified the audio artifact exists (`audio_ready`).
    pub async fn transcribe(&self, clip_id: &str, audio_url: &str) -> AiResult<Transcript> {
        let prompt = build_prompt(audio_url);
        let raw = self.inference.call_with_fallback(self.models, &prompt).await?;
        let parsed: TranscriptResponse = parse_llm_json(&raw)?;

        let full_text = if parsed.full_text.is_empty() {
            parsed
                .segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            parsed.full_text
        };

        Ok(Transcript {
            clip_id: clip_id.to_string(),
            language: if parsed.language.is_empty() {
                "en-US".to_string()
            } else {
                parsed.language
            },
            redacted: false,
            full_text,
            segments: parsed
                .segments
                .into_iter()
                .map(|s| TranscriptSegment {
                    start_s: s.start_s,
                    end_s: s.end_s,
                    text: s.text,
                })
                .collect(),
        })
    }
}

fn build_prompt(audio_url: &str) -> String {
    format!(
        r#"Transcribe the speech in the audio at {audio_url}.

Return ONLY a single JSON object with this schema:
{{
  "language": "BCP-47 language tag, e.g. en-US",
  "full_text": "the complete transcript text",
  "segments": [
    {{ "start_s": 0.0, "end_s": 2.5, "text": "segment text" }}
  ]
}}

Segments must be ordered and non-overlapping, with start_s <= end_s for every
segment and each segment's start_s >= the previous segment's end_s."#
    )
}
