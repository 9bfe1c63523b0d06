//! `/clips` CRUD: bulk ingestion writes from the catalog sync job, point
//! lookups and patches from operators, and a rolling 24h listing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use recap_storage::keys;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::security::{is_valid_clip_id, sanitize_title, MAX_TITLE_LENGTH};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StoredClipQuery {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClipRequest {
    pub clip_id: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct BulkStoreResponse {
    pub stored: usize,
}

/// Lists clips created within the last 24 hours. `clips/` keys are not
/// time-partitioned (the catalog clip id is the only stable identity), so
/// this fetches every stored clip and filters on `created_at` in memory.
pub async fn list_clips(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cutoff = Utc::now() - Duration::hours(24);
    let mut clips = Vec::new();
    let mut cursor = None;

    loop {
        let page = state
            .store
            .list(recap_storage::ListQuery {
                prefix: "clips/".to_string(),
                cursor: cursor.clone(),
                limit: None,
                include_metadata: false,
            })
            .await
            .map_err(|e| ApiError::from(recap_models::PipelineError::upstream_temporary(e.to_string())))?;

        for summary in &page.objects {
            let Some(object) = state.store.get(&summary.key).await.map_err(|e| {
                ApiError::from(recap_models::PipelineError::upstream_temporary(e.to_string()))
            })?
            else {
                continue;
            };
            if let Ok(clip) = serde_json::from_slice::<recap_models::Clip>(&object.body) {
                if clip.created_at >= cutoff {
                    clips.push(clip);
                }
            }
        }

        if !page.truncated {
            break;
        }
        cursor = page.cursor;
    }

    clips.sort_by_key(|c| std::cmp::Reverse(c.created_at));
    Ok(Json(clips))
}

/// Bulk-stores up to `max_bulk_clips` clips per call. Each clip is
/// structurally validated before any write; the whole batch is rejected on
/// the first invalid entry rather than partially applied.
pub async fn store_clips(
    State(state): State<AppState>,
    Json(clips): Json<Vec<recap_models::Clip>>,
) -> Result<impl IntoResponse, ApiError> {
    if clips.len() > state.config.max_bulk_clips {
        return Err(ApiError::bad_request(format!(
            "batch of {} clips exceeds the {} limit",
            clips.len(),
            state.config.max_bulk_clips
        )));
    }

    for clip in &clips {
        clip.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;
    }

    let stored = clips.len();
    for mut clip in clips {
        clip.title = sanitize_title(&clip.title);
        let key = keys::clip_key(&clip.clip_id);
        let body = serde_json::to_vec(&clip).map_err(|e| ApiError::bad_request(e.to_string()))?;
        state
            .store
            .put(&key, body, recap_storage::PutOptions { content_type: Some("application/json".to_string()), ..Default::default() })
            .await
            .map_err(|e| ApiError::from(recap_models::PipelineError::upstream_temporary(e.to_string())))?;
    }

    Ok((StatusCode::OK, Json(BulkStoreResponse { stored })))
}

/// Patches a clip's editable display fields. The catalog clip itself is
/// immutable upstream; the only field an operator can override locally is
/// `title`, capped the same as any other caller-supplied text field.
pub async fn update_clip(
    State(state): State<AppState>,
    Json(req): Json<UpdateClipRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_valid_clip_id(&req.clip_id) {
        return Err(ApiError::bad_request(format!("invalid clip_id: {}", req.clip_id)));
    }
    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }
    if req.title.len() > MAX_TITLE_LENGTH {
        return Err(ApiError::bad_request(format!("title exceeds {MAX_TITLE_LENGTH} chars")));
    }

    let key = keys::clip_key(&req.clip_id);
    let object = state
        .store
        .get(&key)
        .await
        .map_err(|e| ApiError::from(recap_models::PipelineError::upstream_temporary(e.to_string())))?
        .ok_or_else(|| ApiError::not_found(format!("no stored clip {}", req.clip_id)))?;

    let mut clip: recap_models::Clip =
        serde_json::from_slice(&object.body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    clip.title = sanitize_title(&req.title);

    let body = serde_json::to_vec(&clip).map_err(|e| ApiError::bad_request(e.to_string()))?;
    state
        .store
        .put(&key, body, recap_storage::PutOptions { content_type: Some("application/json".to_string()), ..Default::default() })
        .await
        .map_err(|e| ApiError::from(recap_models::PipelineError::upstream_temporary(e.to_string())))?;

    Ok(Json(clip))
}

/// Fetches a single stored clip by id.
pub async fn get_stored_clip(
    State(state): State<AppState>,
    Query(query): Query<StoredClipQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_valid_clip_id(&query.id) {
        return Err(ApiError::bad_request(format!("invalid clip id: {}", query.id)));
    }

    let key = keys::clip_key(&query.id);
    let object = state
        .store
        .get(&key)
        .await
        .map_err(|e| ApiError::from(recap_models::PipelineError::upstream_temporary(e.to_string())))?
        .ok_or_else(|| ApiError::not_found(format!("no stored clip {}", query.id)))?;

    let clip: recap_models::Clip =
        serde_json::from_slice(&object.body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(Json(clip))
}
