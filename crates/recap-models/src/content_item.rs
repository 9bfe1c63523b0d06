use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// The status lattice a `ContentItem` progresses through. Ordered so that
/// `status(t+1) >= status(t)` can be checked with plain `<`/`>` comparisons
/// (derives `PartialOrd`/`Ord` from declaration order).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    AudioReady,
    Transcribed,
    Enhanced,
    ReadyForContent,
}

impl ProcessingStatus {
    /// True if `next` is `self` or a forward step in the lattice.
    pub fn can_transition_to(self, next: ProcessingStatus) -> bool {
        next >= self
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::AudioReady => "audio_ready",
            ProcessingStatus::Transcribed => "transcribed",
            ProcessingStatus::Enhanced => "enhanced",
            ProcessingStatus::ReadyForContent => "ready_for_content",
        }
    }
}

/// A reference to an artifact owned by another stage: never an embedded
/// copy, so the artifact's lifetime stays independent of `ContentItem`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactRef {
    pub url: String,
    pub size: u64,
    pub summary: String,
}

/// The canonical, status-tracked record for one clip. The central table of
/// the system; the orchestrator is the only writer of `processing_status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub schema_version: u32,
    pub clip_id: String,
    pub clip_title: String,
    pub clip_url: String,
    pub clip_duration: u32,
    pub clip_created_at: DateTime<Utc>,
    pub processing_status: ProcessingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_ref: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_context_ref: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_category: Option<String>,
    pub stored_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_ready_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    pub fn new_pending(clip_id: impl Into<String>, clip_title: impl Into<String>, clip_url: impl Into<String>, clip_duration: u32, clip_created_at: DateTime<Utc>, stored_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            clip_id: clip_id.into(),
            clip_title: clip_title.into(),
            clip_url: clip_url.into(),
            clip_duration,
            clip_created_at,
            processing_status: ProcessingStatus::Pending,
            audio_file_url: None,
            transcript_ref: None,
            github_context_ref: None,
            content_score: None,
            content_tags: None,
            content_category: None,
            stored_at,
            enhanced_at: None,
            content_ready_at: None,
        }
    }

    /// `content_ready_at` is set iff status = ready_for_content (invariant).
    pub fn invariants_hold(&self) -> bool {
        let ready_at_matches_status = match self.processing_status {
            ProcessingStatus::ReadyForContent => self.content_ready_at.is_some(),
            _ => self.content_ready_at.is_none(),
        };
        ready_at_matches_status
    }
}
