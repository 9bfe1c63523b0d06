use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source-control webhook event type, as delivered in the `X-GitHub-Event`
/// header (or equivalent). Unknown event types are retained verbatim so the
/// event store never drops a delivery it didn't recognize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GitHubEventType {
    PullRequest,
    Push,
    Issues,
    Ping,
    #[serde(other)]
    Other,
}

/// A received and persisted source-control event. Identity is the pair
/// `(delivery_id, event_type)`; GitHub's redelivery is idempotent on
/// `delivery_id` alone, but the pair is kept as identity so a single
/// delivery carrying multiple logical event types (not expected in
/// practice) can't collide.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitHubEvent {
    pub delivery_id: String,
    pub event_type: GitHubEventType,
    pub timestamp: DateTime<Utc>,
    pub repository: String,
    pub payload: serde_json::Value,
}
