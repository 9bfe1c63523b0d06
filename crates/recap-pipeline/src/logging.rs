//! Structured, stage-scoped logging utilities.
//!
//! Provides consistent, structured logging for orchestrator stages with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

/// Stage logger for structured logging with consistent formatting.
///
/// Provides a simple interface for logging stage lifecycle events with
/// automatic contextual information (run ID, stage name).
#[derive(Debug, Clone)]
pub struct StageLogger {
    run_id: String,
    stage: String,
}

impl StageLogger {
    pub fn new(run_id: &str, stage: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            stage: stage.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(run_id = %self.run_id, stage = %self.stage, "stage started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(run_id = %self.run_id, stage = %self.stage, "stage progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, stage = %self.stage, "stage warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(run_id = %self.run_id, stage = %self.stage, "stage error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(run_id = %self.run_id, stage = %self.stage, "stage completed: {}", message);
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Create a tracing span for this stage, for nesting the finer-grained
    /// spans an individual stage implementation emits.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("stage", run_id = %self.run_id, stage = %self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_run_id_and_stage() {
        let logger = StageLogger::new("run-20250829-1", "ingest");
        assert_eq!(logger.run_id(), "run-20250829-1");
        assert_eq!(logger.stage(), "ingest");
    }
}
