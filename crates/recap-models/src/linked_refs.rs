use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    TemporalProximity,
    ExactTimestamp,
    NoMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedPr {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub confidence: Confidence,
    pub match_reason: MatchReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedCommit {
    pub sha: String,
    pub url: String,
    pub message: String,
    pub confidence: Confidence,
    pub match_reason: MatchReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedIssue {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub confidence: Confidence,
    pub match_reason: MatchReason,
}

/// Optional, independently-absent arrays of matched source-control
/// references. `None` means "not computed"; `Some(vec![])` means "computed,
/// nothing matched" -- the distinction the temporal matcher must preserve
/// (see `GitHubContext`, which always fills all three with `Some`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkedRefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_prs: Option<Vec<LinkedPr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_commits: Option<Vec<LinkedCommit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_issues: Option<Vec<LinkedIssue>>,
}

/// Output of the temporal matcher: `LinkedRefs` plus an overall confidence
/// score and the dominant reason behind it. Stored as its own artifact and
/// referenced (not embedded) by `ContentItem`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitHubContext {
    pub clip_id: String,
    #[serde(flatten)]
    pub linked_refs: LinkedRefs,
    pub confidence_score: f64,
    pub match_reason: MatchReason,
}

impl GitHubContext {
    pub fn empty(clip_id: impl Into<String>) -> Self {
        Self {
            clip_id: clip_id.into(),
            linked_refs: LinkedRefs {
                linked_prs: Some(Vec::new()),
                linked_commits: Some(Vec::new()),
                linked_issues: Some(Vec::new()),
            },
            confidence_score: 0.0,
            match_reason: MatchReason::NoMatch,
        }
    }
}
