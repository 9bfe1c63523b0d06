//! Scheduled orchestrator: ingestion through publish for the content-recap
//! pipeline.
//!
//! This crate provides:
//! - The Stage 1-6 state machine that advances `ContentItem`s end to end
//! - The Markdown + YAML front-matter blog renderer
//! - The source-control (branch/commit/PR/check-run) publisher
//! - The chat notifier
//! - The hourly/6-hourly/daily trigger scheduler

pub mod blog;
pub mod config;
pub mod logging;
pub mod notifier;
pub mod orchestrator;
pub mod scheduler;
pub mod scm;

pub use config::PipelineConfig;
pub use logging::StageLogger;
pub use notifier::Notifier;
pub use orchestrator::{Orchestrator, PipelineResult};
pub use scheduler::Scheduler;
pub use scm::ScmPublisher;
