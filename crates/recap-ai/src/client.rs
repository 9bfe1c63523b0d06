//! Provider-agnostic inference client with a multi-model fallback loop.
//!
//! Transcriber, Sectioner, and Judge each build a prompt and call
//! [`InferenceClient::call_with_fallback`]; the first model in the chain
//! that returns successfully wins, and exhausting the chain is itself a
//! contract-level failure the caller handles by falling back to a safe
//! default rather than aborting the pipeline.

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AiError, AiResult};

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, serde::Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, serde::Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, serde::Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, serde::Deserialize)]
struct ResponsePart {
    text: String,
}

pub struct InferenceClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl InferenceClient {
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
        }
    }

    /// Tries each model in `models` in order, returning the first raw text
    /// response that succeeds. Exhaustion yields `AiError::ModelsExhausted`.
    pub async fn call_with_fallback(&self, models: &[String], prompt: &str) -> AiResult<String> {
        let mut last_error = None;

        for model in models {
            info!(model, "invoking inference model");
            match self.call_model(model, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(model, error = %e, "model call failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(AiError::models_exhausted(
            last_error.map(|e| e.to_string()).unwrap_or_else(|| "no models configured".to_string()),
        ))
    }

    async fn call_model(&self, model: &str, prompt: &str) -> AiResult<String> {
        let url = format!("{}/{}:generateContent?key={}", self.base_url, model, self.api_key);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt.to_string() }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::request_failed(format!("{model} returned {status}: {body}")));
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AiError::request_failed(format!("{model} returned no content")))
    }
}
