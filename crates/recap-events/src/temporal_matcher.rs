//! Correlates a clip's creation time against nearby source-control events.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use recap_models::{
    Confidence, GitHubContext, GitHubEvent, GitHubEventType, LinkedCommit, LinkedIssue, LinkedPr, LinkedRefs,
    MatchReason,
};

use crate::error::EventsResult;
use crate::event_store::EventStore;

pub struct TemporalMatcher<'a> {
    events: EventStore<'a>,
    window: ChronoDuration,
}

impl<'a> TemporalMatcher<'a> {
    pub fn new(events: EventStore<'a>, window: ChronoDuration) -> Self {
        Self { events, window }
    }

    /// Range-scans events within `+-window` of `clip_time`, classifies
    /// matches by event type, and scores overall confidence as
    /// `max(0, 1 - min_delta_t / window)`.
    pub async fn match_clip(
        &self,
        clip_id: &str,
        clip_time: DateTime<Utc>,
        repo: Option<&str>,
    ) -> EventsResult<GitHubContext> {
        let start = clip_time - self.window;
        let end = clip_time + self.window;
        let events = self.events.get_events(start, end, repo).await?;

        if events.is_empty() {
            return Ok(GitHubContext::empty(clip_id));
        }

        let mut linked_prs = Vec::new();
        let mut linked_commits = Vec::new();
        let mut linked_issues = Vec::new();
        let mut min_delta = self.window;

        let upgrade_threshold = self.window / 4;

        for event in &events {
            let delta = (clip_time - event.timestamp).abs();
            if delta < min_delta {
                min_delta = delta;
            }

            let confidence = if delta <= upgrade_threshold {
                Confidence::High
            } else {
                Confidence::Medium
            };

            classify_event(event, confidence, &mut linked_prs, &mut linked_commits, &mut linked_issues);
        }

        let window_secs = self.window.num_milliseconds().max(1) as f64;
        let min_delta_secs = min_delta.num_milliseconds() as f64;
        let confidence_score = (1.0 - min_delta_secs / window_secs).max(0.0);

        let match_reason = if min_delta == ChronoDuration::zero() {
            MatchReason::ExactTimestamp
        } else {
            MatchReason::TemporalProximity
        };

        Ok(GitHubContext {
            clip_id: clip_id.to_string(),
            linked_refs: LinkedRefs {
                linked_prs: Some(linked_prs),
                linked_commits: Some(linked_commits),
                linked_issues: Some(linked_issues),
            },
            confidence_score,
            match_reason,
        })
    }
}

fn classify_event(
    event: &GitHubEvent,
    confidence: Confidence,
    linked_prs: &mut Vec<LinkedPr>,
    linked_commits: &mut Vec<LinkedCommit>,
    linked_issues: &mut Vec<LinkedIssue>,
) {
    match event.event_type {
        GitHubEventType::PullRequest => {
            if let Some(pr) = extract_pr(event) {
                linked_prs.push(LinkedPr {
                    confidence,
                    match_reason: MatchReason::TemporalProximity,
                    ..pr
                });
            }
        }
        GitHubEventType::Push => {
            for commit in extract_commits(event) {
                linked_commits.push(LinkedCommit {
                    confidence,
                    match_reason: MatchReason::TemporalProximity,
                    ..commit
                });
            }
        }
        GitHubEventType::Issues => {
            if let Some(issue) = extract_issue(event) {
                linked_issues.push(LinkedIssue {
                    confidence,
                    match_reason: MatchReason::TemporalProximity,
                    ..issue
                });
            }
        }
        GitHubEventType::Ping | GitHubEventType::Other => {}
    }
}

fn extract_pr(event: &GitHubEvent) -> Option<LinkedPr> {
    let pr = event.payload.get("pull_request")?;
    let url = pr.get("html_url")?.as_str()?.to_string();
    Some(LinkedPr {
        number: pr.get("number")?.as_u64()?,
        url,
        title: pr.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        confidence: Confidence::Medium,
        match_reason: MatchReason::TemporalProximity,
    })
}

fn extract_commits(event: &GitHubEvent) -> Vec<LinkedCommit> {
    event
        .payload
        .get("commits")
        .and_then(|v| v.as_array())
        .map(|commits| {
            commits
                .iter()
                .filter_map(|c| {
                    let url = c.get("url")?.as_str()?.to_string();
                    Some(LinkedCommit {
                        sha: c.get("id")?.as_str()?.to_string(),
                        url,
                        message: c.get("message").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                        confidence: Confidence::Medium,
                        match_reason: MatchReason::TemporalProximity,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn extract_issue(event: &GitHubEvent) -> Option<LinkedIssue> {
    let issue = event.payload.get("issue")?;
    let url = issue.get("html_url")?.as_str()?.to_string();
    Some(LinkedIssue {
        number: issue.get("number")?.as_u64()?,
        url,
        title: issue.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        confidence: Confidence::Medium,
        match_reason: MatchReason::TemporalProximity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_pr_with_required_fields() {
        let event = GitHubEvent {
            delivery_id: "d1".to_string(),
            event_type: GitHubEventType::PullRequest,
            timestamp: Utc::now(),
            repository: "org/repo".to_string(),
            payload: serde_json::json!({
                "pull_request": {"number": 42, "html_url": "https://github.com/org/repo/pull/42", "title": "Fix bug"}
            }),
        };
        let pr = extract_pr(&event).unwrap();
        assert_eq!(pr.number, 42);
        assert_eq!(pr.title, "Fix bug");
    }

    #[test]
    fn drops_commits_missing_canonical_url() {
        let event = GitHubEvent {
            delivery_id: "d2".to_string(),
            event_type: GitHubEventType::Push,
            timestamp: Utc::now(),
            repository: "org/repo".to_string(),
            payload: serde_json::json!({
                "commits": [{"id": "abc123", "message": "fix"}]
            }),
        };
        assert!(extract_commits(&event).is_empty());
    }
}
