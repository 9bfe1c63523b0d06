//! Shared data models for the content-recap pipeline.
//!
//! This crate provides serde-serializable types for every entity in the
//! data model: clips, audio artifacts, transcripts, source-control events
//! and their temporal-match results, the central `ContentItem` record, and
//! the per-run manifest/section/judge-evaluation/run-status shapes.

pub mod audio_artifact;
pub mod clip;
pub mod content_item;
pub mod cursor;
pub mod error;
pub mod github_event;
pub mod judge_evaluation;
pub mod linked_refs;
pub mod manifest;
pub mod run_status;
pub mod transcript;

pub use audio_artifact::AudioArtifact;
pub use clip::{is_valid_clip_id, Clip, ClipValidationError};
pub use content_item::{ArtifactRef, ContentItem, ProcessingStatus, SCHEMA_VERSION};
pub use cursor::Cursor;
pub use error::PipelineError;
pub use github_event::{GitHubEvent, GitHubEventType};
pub use judge_evaluation::{JudgeAxes, JudgeEvaluation};
pub use linked_refs::{
    Confidence, GitHubContext, LinkedCommit, LinkedIssue, LinkedPr, LinkedRefs, MatchReason,
};
pub use manifest::{Manifest, Section};
pub use run_status::{RunProgress, RunState, RunStatus};
pub use transcript::{Transcript, TranscriptSegment, TranscriptValidationError};
