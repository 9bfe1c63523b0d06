use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Queued,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunProgress {
    pub step: String,
    pub current: u32,
    pub total: u32,
}

/// One execution of the orchestrator, from ingestion to publish. `run_id`
/// is a lexicographically sortable time-prefixed identifier so that listing
/// `runs/` in key order is also listing runs in start order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunStatus {
    pub run_id: String,
    pub status: RunState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub progress: RunProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunStatus {
    pub fn new_queued(run_id: impl Into<String>, now: DateTime<Utc>, total_steps: u32) -> Self {
        Self {
            run_id: run_id.into(),
            status: RunState::Queued,
            created_at: now,
            updated_at: now,
            progress: RunProgress {
                step: "queued".to_string(),
                current: 0,
                total: total_steps,
            },
            error: None,
        }
    }

    pub fn advance(&mut self, step: impl Into<String>, current: u32, now: DateTime<Utc>) {
        self.status = RunState::Running;
        self.progress.step = step.into();
        self.progress.current = current;
        self.updated_at = now;
    }

    pub fn succeed(&mut self, now: DateTime<Utc>) {
        self.status = RunState::Succeeded;
        self.updated_at = now;
    }

    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.status = RunState::Failed;
        self.error = Some(error.into());
        self.updated_at = now;
    }
}
