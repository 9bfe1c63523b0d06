//! Converts legacy `clips/{id}.json` objects into `ContentItem` records,
//! deriving `processing_status` from whatever artifacts already exist.
//! Idempotent: re-running overwrites a record only when the freshly-derived
//! one is strictly more complete than what's already stored.

use chrono::Utc;
use recap_models::{ArtifactRef, Clip, ContentItem, GitHubContext, ProcessingStatus, Transcript};
use recap_storage::{keys, ListQuery, ObjectStore, StorageError};

use crate::error::{ContentError, ContentResult};
use crate::service::ContentItemService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationErrorCode {
    JsonParseFailed,
    ClipValidationFailed,
    StorageFailed,
}

#[derive(Debug, Clone)]
pub struct MigrationFailure {
    pub clip_id: String,
    pub code: MigrationErrorCode,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub migrated: u64,
    pub skipped_already_complete: u64,
    pub failures: Vec<MigrationFailure>,
}

pub struct Migrator<'a> {
    store: &'a ObjectStore,
}

impl<'a> Migrator<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Scans all legacy clip records under `clips/` via paginated prefix
    /// listing and migrates each to a `ContentItem`.
    pub async fn migrate_all(&self) -> ContentResult<MigrationReport> {
        let service = ContentItemService::new(self.store);
        let mut report = MigrationReport::default();
        let mut cursor = None;

        loop {
            let page = self
                .store
                .list(ListQuery {
                    prefix: "clips/".to_string(),
                    cursor: cursor.clone(),
                    limit: None,
                    include_metadata: false,
                })
                .await?;

            for summary in &page.objects {
                // Both the durable flat layout (`clips/{id}.json`) and the
                // read-only legacy nested layout (`clips/{id}/meta.json`)
                // are scanned; new writes only ever produce the flat form.
                if !summary.key.ends_with(".json") {
                    continue;
                }
                let clip_id = legacy_clip_id_from_key(&summary.key);
                match self.migrate_one(&service, &clip_id, &summary.key).await {
                    Ok(true) => report.migrated += 1,
                    Ok(false) => report.skipped_already_complete += 1,
                    Err(failure) => report.failures.push(failure),
                }
            }

            if !page.truncated {
                break;
            }
            cursor = page.cursor;
        }

        Ok(report)
    }

    async fn migrate_one(
        &self,
        service: &ContentItemService<'a>,
        clip_id: &str,
        clip_key: &str,
    ) -> Result<bool, MigrationFailure> {
        let clip = self.load_clip(clip_key).await?;
        clip.validate().map_err(|e| MigrationFailure {
            clip_id: clip_id.to_string(),
            code: MigrationErrorCode::ClipValidationFailed,
            detail: e.to_string(),
        })?;

        let audio_key = keys::audio_key(clip_id);
        let audio_present = self
            .store
            .head(&audio_key)
            .await
            .map_err(|e| storage_failure(clip_id, e))?
            .is_some();

        let transcript_ref = self.load_transcript_ref(clip_id).await?;
        let github_context_ref = self.load_github_context_ref(clip_id).await?;

        let processing_status = if transcript_ref.is_some() {
            ProcessingStatus::Transcribed
        } else if audio_present {
            ProcessingStatus::AudioReady
        } else {
            ProcessingStatus::Pending
        };

        let mut item = ContentItem::new_pending(
            clip.clip_id.clone(),
            clip.title.clone(),
            clip.url.clone(),
            clip.duration_seconds,
            clip.created_at,
            Utc::now(),
        );
        item.processing_status = processing_status;
        item.audio_file_url = audio_present.then_some(audio_key);
        item.transcript_ref = transcript_ref;
        item.github_context_ref = github_context_ref;

        if let Some(existing) = service
            .get(clip_id, clip.created_at)
            .await
            .map_err(|e| content_failure(clip_id, e))?
        {
            if existing.processing_status >= item.processing_status {
                return Ok(false);
            }
        }

        service.put(item).await.map_err(|e| content_failure(clip_id, e))?;
        Ok(true)
    }

    async fn load_clip(&self, clip_key: &str) -> Result<Clip, MigrationFailure> {
        let clip_id = legacy_clip_id_from_key(clip_key);
        let object = self
            .store
            .get(clip_key)
            .await
            .map_err(|e| storage_failure(&clip_id, e))?
            .ok_or_else(|| MigrationFailure {
                clip_id: clip_id.clone(),
                code: MigrationErrorCode::StorageFailed,
                detail: "legacy clip object vanished mid-scan".to_string(),
            })?;

        serde_json::from_slice(&object.body).map_err(|e| json_failure(&clip_id, e))
    }

    async fn load_transcript_ref(&self, clip_id: &str) -> Result<Option<ArtifactRef>, MigrationFailure> {
        let key = keys::transcript_key(clip_id);
        let Some(object) = self.store.get(&key).await.map_err(|e| storage_failure(clip_id, e))? else {
            return Ok(None);
        };
        let transcript: Transcript = serde_json::from_slice(&object.body).map_err(|e| json_failure(clip_id, e))?;
        Ok(Some(ArtifactRef {
            url: key,
            size: object.body.len() as u64,
            summary: transcript.full_text.chars().take(200).collect(),
        }))
    }

    async fn load_github_context_ref(&self, clip_id: &str) -> Result<Option<ArtifactRef>, MigrationFailure> {
        let key = keys::github_context_key(clip_id);
        let Some(object) = self.store.get(&key).await.map_err(|e| storage_failure(clip_id, e))? else {
            return Ok(None);
        };
        let context: GitHubContext = serde_json::from_slice(&object.body).map_err(|e| json_failure(clip_id, e))?;
        Ok(Some(ArtifactRef {
            url: key,
            size: object.body.len() as u64,
            summary: format!("confidence {:.2}", context.confidence_score),
        }))
    }
}

fn storage_failure(clip_id: &str, e: StorageError) -> MigrationFailure {
    MigrationFailure {
        clip_id: clip_id.to_string(),
        code: MigrationErrorCode::StorageFailed,
        detail: e.to_string(),
    }
}

fn json_failure(clip_id: &str, e: serde_json::Error) -> MigrationFailure {
    MigrationFailure {
        clip_id: clip_id.to_string(),
        code: MigrationErrorCode::JsonParseFailed,
        detail: e.to_string(),
    }
}

fn content_failure(clip_id: &str, e: ContentError) -> MigrationFailure {
    let code = match e {
        ContentError::Storage(_) => MigrationErrorCode::StorageFailed,
        ContentError::Json(_) => MigrationErrorCode::JsonParseFailed,
        _ => MigrationErrorCode::StorageFailed,
    };
    MigrationFailure {
        clip_id: clip_id.to_string(),
        code,
        detail: e.to_string(),
    }
}

/// Extracts a clip id from either the flat (`clips/{id}.json`) or the
/// read-only legacy nested (`clips/{id}/meta.json`) layout.
fn legacy_clip_id_from_key(key: &str) -> String {
    let segments: Vec<&str> = key.split('/').collect();
    match segments.as_slice() {
        [.., id, "meta.json"] => id.to_string(),
        [.., file] => file.trim_end_matches(".json").to_string(),
        [] => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_clip_id_from_flat_key() {
        assert_eq!(legacy_clip_id_from_key("clips/abcDEF_12.json"), "abcDEF_12");
    }

    #[test]
    fn extracts_clip_id_from_nested_legacy_key() {
        assert_eq!(legacy_clip_id_from_key("clips/abcDEF_12/meta.json"), "abcDEF_12");
    }
}
