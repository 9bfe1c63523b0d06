//! Persisted source-control events, queryable by time range and filtered by
//! `customMetadata` before any body is fetched.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use recap_models::GitHubEvent;
use recap_storage::{keys, ListQuery, ObjectStore, PutOptions};

use crate::error::EventsResult;

pub struct EventStore<'a> {
    store: &'a ObjectStore,
}

impl<'a> EventStore<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Persists `event` under its time-partitioned key with
    /// `customMetadata` `{event_type, repo}` for cheap prefix-filtering.
    pub async fn store_event(&self, event: &GitHubEvent) -> EventsResult<()> {
        let epoch_ms = event.timestamp.timestamp_millis();
        let key = keys::github_event_key(event.timestamp, epoch_ms, &event.delivery_id);
        let body = serde_json::to_vec(event)?;

        let event_type = serde_json::to_value(&event.event_type)?
            .as_str()
            .unwrap_or("other")
            .to_string();

        let mut metadata = std::collections::HashMap::new();
        metadata.insert("event_type".to_string(), event_type);
        metadata.insert("repo".to_string(), event.repository.clone());

        self.store
            .put(
                &key,
                body,
                PutOptions {
                    content_type: Some("application/json".to_string()),
                    custom_metadata: metadata,
                },
            )
            .await?;
        Ok(())
    }

    /// Range-scans `github-events/YYYY/MM/DD/` prefixes intersecting
    /// `[start, end]`, filters on `customMetadata` (optionally by `repo`),
    /// and fetches bodies only for the surviving hits.
    pub async fn get_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        repo: Option<&str>,
    ) -> EventsResult<Vec<GitHubEvent>> {
        let mut events = Vec::new();
        let mut day = start.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end_day = end.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();

        while day <= end_day {
            let prefix = keys::github_event_prefix_for_day(day);
            let mut cursor = None;

            loop {
                let page = self
                    .store
                    .list(ListQuery {
                        prefix: prefix.clone(),
                        cursor: cursor.clone(),
                        limit: None,
                        include_metadata: true,
                    })
                    .await?;

                for summary in &page.objects {
                    if let Some(repo_filter) = repo {
                        if summary.custom_metadata.get("repo").map(String::as_str) != Some(repo_filter) {
                            continue;
                        }
                    }

                    if let Some(object) = self.store.get(&summary.key).await? {
                        if let Ok(event) = serde_json::from_slice::<GitHubEvent>(&object.body) {
                            if event.timestamp >= start && event.timestamp <= end {
                                events.push(event);
                            }
                        }
                    }
                }

                if !page.truncated {
                    break;
                }
                cursor = page.cursor;
            }

            day += ChronoDuration::days(1);
        }

        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }
}
