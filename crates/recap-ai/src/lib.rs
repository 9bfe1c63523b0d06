//! AI-backed pipeline stages: transcription, sectioning, and quality
//! judging, all sharing one multi-model-fallback inference client and one
//! tolerant JSON-response parser.
//!
//! - `client` - provider-agnostic inference client with model fallback
//! - `parse` - `parse_llm_json`: fence-stripping + balanced-brace extraction
//! - `transcriber` - speech-to-text via the inference model
//! - `sectioner` - per-clip write-up generation with defensive coercion
//! - `judge` - deterministic quality evaluation against configured thresholds
//! - `config` - per-task model id chains
//! - `error` - error taxonomy

pub mod client;
pub mod config;
pub mod error;
pub mod judge;
pub mod parse;
pub mod sectioner;
pub mod transcriber;

pub use client::InferenceClient;
pub use config::AiConfig;
pub use error::{AiError, AiResult};
pub use judge::Judge;
pub use parse::parse_llm_json;
pub use sectioner::Sectioner;
pub use transcriber::Transcriber;
