//! Content-generation trigger, run status, item listing, and legacy
//! migration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use recap_content::service::{ContentItemService, ContentListQuery};
use recap_content::migration::Migrator;
use recap_models::{ProcessingStatus, RunStatus};
use recap_storage::keys;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::metrics::record_run_started;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub run_id: String,
}

/// Triggers a full Stage 1-6 run in the background and returns its id
/// immediately, per the async-job contract (202 + `run_id`).
pub async fn generate_content(State(state): State<AppState>) -> impl IntoResponse {
    let run_id = state.orchestrator.spawn_daily_pipeline();
    record_run_started("daily");
    (StatusCode::ACCEPTED, Json(GenerateResponse { run_id }))
}

pub async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let key = keys::run_status_key(&run_id);
    let object = state
        .store
        .get(&key)
        .await
        .map_err(|e| ApiError::from(recap_models::PipelineError::upstream_temporary(e.to_string())))?
        .ok_or_else(|| ApiError::not_found(format!("no run {run_id}")))?;

    let status: RunStatus =
        serde_json::from_slice(&object.body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

fn parse_status(raw: &str) -> Result<ProcessingStatus, ApiError> {
    match raw {
        "pending" => Ok(ProcessingStatus::Pending),
        "audio_ready" => Ok(ProcessingStatus::AudioReady),
        "transcribed" => Ok(ProcessingStatus::Transcribed),
        "enhanced" => Ok(ProcessingStatus::Enhanced),
        "ready_for_content" => Ok(ProcessingStatus::ReadyForContent),
        other => Err(ApiError::bad_request(format!("unknown processing_status: {other}"))),
    }
}

pub async fn list_content_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let processing_status = query.status.as_deref().map(parse_status).transpose()?;

    let service = ContentItemService::new(&state.store);
    let page = service
        .list(ContentListQuery {
            date_range: match (query.start, query.end) {
                (Some(s), Some(e)) => Some((s, e)),
                _ => None,
            },
            processing_status,
            content_category: query.category,
            limit: query.limit,
            cursor: query.cursor,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ContentListPageView {
        items: page.items,
        cursor: page.cursor,
    }))
}

/// `ContentListPage` doesn't derive `Serialize` in the content crate (it's
/// an internal pagination handle, not a wire type); this mirrors its shape
/// for the JSON response.
#[derive(Debug, Serialize)]
struct ContentListPageView {
    items: Vec<recap_models::ContentItem>,
    cursor: Option<String>,
}

/// Runs the legacy `clips/` -> `ContentItem` migration. Idempotent.
pub async fn migrate_content(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let migrator = Migrator::new(&state.store);
    let report = migrator.migrate_all().await.map_err(ApiError::from)?;
    Ok(Json(MigrationReportView {
        migrated: report.migrated,
        skipped_already_complete: report.skipped_already_complete,
        failed: report.failures.len() as u64,
    }))
}

#[derive(Debug, Serialize)]
struct MigrationReportView {
    migrated: u64,
    skipped_already_complete: u64,
    failed: u64,
}
