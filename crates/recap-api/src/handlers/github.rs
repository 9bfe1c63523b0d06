//! Source-control activity aggregation and the inbound webhook receiver.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use recap_events::event_store::EventStore;
use serde::Deserialize;

use crate::error::ApiError;
use crate::metrics::record_webhook_event;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub repo: Option<String>,
    /// Lookback window in hours; defaults to 24.
    pub hours: Option<i64>,
}

/// Aggregates source-control activity across the lookback window, optionally
/// filtered to one repository.
pub async fn github_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let hours = query.hours.unwrap_or(24).clamp(1, 24 * 30);
    let end = Utc::now();
    let start = end - Duration::hours(hours);

    let store = EventStore::new(&state.store);
    let events = store
        .get_events(start, end, query.repo.as_deref())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(events))
}

/// Receives a source-control webhook delivery. Verifies the raw-body
/// signature, responds promptly, and detaches the persistence write so a
/// slow object store write never holds up the delivery's response.
pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(recap_auth::WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing webhook signature header"))?;

    recap_events::webhook::verify_signature(state.config.github_webhook_secret.as_bytes(), &body, signature)
        .map_err(ApiError::from)?;

    let delivery_id = headers
        .get("X-GitHub-Delivery")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("missing X-GitHub-Delivery header"))?;

    let event_type = recap_events::webhook::parse_event_type(
        headers.get("X-GitHub-Event").and_then(|v| v.to_str().ok()),
    )
    .map_err(ApiError::from)?;

    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json");

    let payload = recap_events::webhook::parse_payload(content_type, &body).map_err(ApiError::from)?;
    let event = recap_events::webhook::build_event(delivery_id, event_type.clone(), payload);

    record_webhook_event(event_type_label(&event_type));

    let store = state.store.clone();
    tokio::spawn(async move {
        let events = EventStore::new(&store);
        if let Err(e) = events.store_event(&event).await {
            tracing::error!(error = %e, delivery_id = %event.delivery_id, "failed to persist webhook event");
        }
    });

    Ok(StatusCode::OK)
}

fn event_type_label(event_type: &recap_models::GitHubEventType) -> &'static str {
    match event_type {
        recap_models::GitHubEventType::PullRequest => "pull_request",
        recap_models::GitHubEventType::Push => "push",
        recap_models::GitHubEventType::Issues => "issues",
        recap_models::GitHubEventType::Ping => "ping",
        recap_models::GitHubEventType::Other => "other",
    }
}
