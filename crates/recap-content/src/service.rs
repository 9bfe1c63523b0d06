//! ContentItem CRUD: validates, sanitizes, enforces forbidden fields,
//! recomputes `stored_at`, and partitions reads/writes by UTC year/month.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use recap_models::{ContentItem, Cursor, ProcessingStatus};
use recap_storage::{keys, ListQuery, ObjectStore, PutOptions};

use crate::error::{ContentError, ContentResult};
use crate::sanitize::{sanitize_field, FORBIDDEN_FIELDS};

pub struct ContentItemService<'a> {
    store: &'a ObjectStore,
}

#[derive(Debug, Clone, Default)]
pub struct ContentListQuery {
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub processing_status: Option<ProcessingStatus>,
    pub content_category: Option<String>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContentListPage {
    pub items: Vec<ContentItem>,
    pub cursor: Option<String>,
}

impl<'a> ContentItemService<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Rejects a raw caller-supplied JSON body that sets any forbidden
    /// top-level field, before the body is deserialized into a typed item.
    pub fn reject_forbidden_fields(raw: &serde_json::Value) -> ContentResult<()> {
        if let Some(obj) = raw.as_object() {
            for key in FORBIDDEN_FIELDS {
                if obj.contains_key(*key) {
                    return Err(ContentError::ForbiddenField((*key).to_string()));
                }
            }
        }
        Ok(())
    }

    fn sanitize(item: &mut ContentItem) {
        item.clip_title = sanitize_field(&item.clip_title);
        item.clip_url = sanitize_field(&item.clip_url);
        if let Some(category) = &item.content_category {
            item.content_category = Some(sanitize_field(category));
        }
        if let Some(tags) = &item.content_tags {
            item.content_tags = Some(tags.iter().map(|t| sanitize_field(t)).collect());
        }
        if let Some(transcript_ref) = &mut item.transcript_ref {
            transcript_ref.summary = sanitize_field(&transcript_ref.summary);
        }
        if let Some(github_ref) = &mut item.github_context_ref {
            github_ref.summary = sanitize_field(&github_ref.summary);
        }
    }

    fn validate(item: &ContentItem) -> ContentResult<()> {
        if item.clip_id.trim().is_empty() {
            return Err(ContentError::validation("clip_id must not be empty"));
        }
        if item.clip_title.trim().is_empty() {
            return Err(ContentError::validation("clip_title must not be empty"));
        }
        if !item.invariants_hold() {
            return Err(ContentError::validation(
                "content_ready_at must be set iff processing_status is ready_for_content",
            ));
        }
        Ok(())
    }

    /// Writes a `ContentItem`. Sanitizes strings, recomputes `stored_at`
    /// server-side, and writes to the month-partitioned key with
    /// `customMetadata` `{schema-version, clip-id, created-at, processing-status}`.
    pub async fn put(&self, mut item: ContentItem) -> ContentResult<ContentItem> {
        Self::sanitize(&mut item);
        Self::validate(&item)?;
        item.stored_at = Utc::now();

        let key = keys::content_item_key(item.clip_created_at, &item.clip_id);
        let body = serde_json::to_vec(&item)?;

        let mut metadata = HashMap::new();
        metadata.insert("schema-version".to_string(), item.schema_version.to_string());
        metadata.insert("clip-id".to_string(), item.clip_id.clone());
        metadata.insert("created-at".to_string(), item.clip_created_at.to_rfc3339());
        metadata.insert(
            "processing-status".to_string(),
            item.processing_status.as_str().to_string(),
        );

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
        Ok(item)
    }

    /// Reads a `ContentItem` by `clip_id`/`created_at`, re-sanitizing on read
    /// for defense-in-depth.
    pub async fn get(&self, clip_id: &str, created_at: DateTime<Utc>) -> ContentResult<Option<ContentItem>> {
        let key = keys::content_item_key(created_at, clip_id);
        let Some(object) = self.store.get(&key).await? else {
            return Ok(None);
        };
        let mut item: ContentItem = serde_json::from_slice(&object.body)?;
        Self::sanitize(&mut item);
        Ok(Some(item))
    }

    /// Read-modify-write guarded by `expected_stored_at`: if the persisted
    /// `stored_at` has moved since the caller last read it, the write is
    /// rejected as a precondition failure rather than silently clobbering a
    /// concurrent writer. `mutate` may only move `processing_status` forward.
    pub async fn update<F>(
        &self,
        clip_id: &str,
        created_at: DateTime<Utc>,
        expected_stored_at: DateTime<Utc>,
        mutate: F,
    ) -> ContentResult<ContentItem>
    where
        F: FnOnce(&mut ContentItem),
    {
        let current = self
            .get(clip_id, created_at)
            .await?
            .ok_or_else(|| ContentError::NotFound(clip_id.to_string()))?;

        if current.stored_at != expected_stored_at {
            return Err(ContentError::PreconditionFailed(format!(
                "expected stored_at {expected_stored_at}, found {}",
                current.stored_at
            )));
        }

        let previous_status = current.processing_status;
        let mut updated = current;
        mutate(&mut updated);

        if !previous_status.can_transition_to(updated.processing_status) {
            return Err(ContentError::InvalidTransition(format!(
                "{} -> {}",
                previous_status.as_str(),
                updated.processing_status.as_str()
            )));
        }

        self.put(updated).await
    }

    /// Lists `ContentItem`s. For a `date_range` query, iterates month
    /// partitions in UTC order; `processing_status` filters on
    /// `customMetadata` before any body fetch, while `content_category`
    /// needs the body since it isn't part of the stored metadata.
    pub async fn list(&self, query: ContentListQuery) -> ContentResult<ContentListPage> {
        let cursor = query
            .cursor
            .as_deref()
            .and_then(Cursor::decode)
            .or_else(|| {
                query
                    .date_range
                    .map(|(start, _)| Cursor::new(start.year(), start.month()))
            })
            .unwrap_or_else(|| {
                let now = Utc::now();
                Cursor::new(now.year(), now.month())
            });

        let end_ym = query
            .date_range
            .map(|(_, end)| (end.year(), end.month()))
            .unwrap_or((cursor.y, cursor.m));

        let mut items = Vec::new();
        let mut year = cursor.y;
        let mut month = cursor.m;
        let mut continuation = cursor.c.clone();
        let limit = query.limit.unwrap_or(50).max(1);

        'months: loop {
            let prefix = keys::content_item_month_prefix(year, month);
            loop {
                let page = self
                    .store
                    .list(ListQuery {
                        prefix: prefix.clone(),
                        cursor: continuation.clone(),
                        limit: Some((limit - items.len()).max(1) as i32),
                        include_metadata: true,
                    })
                    .await?;

                for summary in &page.objects {
                    if let Some(status) = query.processing_status {
                        if summary.custom_metadata.get("processing-status").map(String::as_str)
                            != Some(status.as_str())
                        {
                            continue;
                        }
                    }

                    let Some(object) = self.store.get(&summary.key).await? else {
                        continue;
                    };
                    let mut item: ContentItem = serde_json::from_slice(&object.body)?;
                    Self::sanitize(&mut item);

                    if let Some(category) = &query.content_category {
                        if item.content_category.as_deref() != Some(category.as_str()) {
                            continue;
                        }
                    }

                    items.push(item);
                    if items.len() >= limit {
                        let next = Cursor::new(year, month)
                            .with_continuation(page.cursor.clone().unwrap_or_default());
                        return Ok(ContentListPage {
                            items,
                            cursor: Some(next.encode()),
                        });
                    }
                }

                if !page.truncated {
                    continuation = None;
                    break;
                }
                continuation = page.cursor;
            }

            if (year, month) >= end_ym {
                break 'months;
            }
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }

        Ok(ContentListPage { items, cursor: None })
    }

    /// Counts `ContentItem`s per `processing_status` within a month
    /// partition, reading `customMetadata` only.
    pub async fn counts_by_status(&self, year: i32, month: u32) -> ContentResult<HashMap<String, u64>> {
        let prefix = keys::content_item_month_prefix(year, month);
        let mut counts: HashMap<String, u64> = HashMap::new();
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
                let status = summary
                    .custom_metadata
                    .get("processing-status")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                *counts.entry(status).or_insert(0) += 1;
            }

            if !page.truncated {
                break;
            }
            cursor = page.cursor;
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_forbidden_owner_field() {
        let raw = serde_json::json!({"clip_id": "abc", "owner": "someone"});
        assert!(matches!(
            ContentItemService::reject_forbidden_fields(&raw),
            Err(ContentError::ForbiddenField(_))
        ));
    }

    #[test]
    fn accepts_body_without_forbidden_fields() {
        let raw = serde_json::json!({"clip_id": "abc", "clip_title": "hi"});
        assert!(ContentItemService::reject_forbidden_fields(&raw).is_ok());
    }
}
