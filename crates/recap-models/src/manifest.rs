use serde::{Deserialize, Serialize};

/// One selected-clip write-up inside a day's manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub title: String,
    pub bullets: Vec<String>,
    pub paragraph: String,
    pub clip_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_deep_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_links: Option<Vec<String>>,
}

impl Section {
    pub const MAX_TITLE_LEN: usize = 60;
}

/// The per-day in-memory assembly of sections prior to rendering. Built
/// fresh per run; persistence is optional and only for auditability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub post_id: String,
    pub tz: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_axes: Option<crate::judge_evaluation::JudgeEvaluation>,
    pub ai_generation_metadata: serde_json::Value,
}
