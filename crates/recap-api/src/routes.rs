//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::clips::{get_stored_clip, list_clips, store_clips, update_clip};
use crate::handlers::content::{generate_content, get_run, list_content_items, migrate_content};
use crate::handlers::github::{github_activity, github_webhook};
use crate::handlers::health::health;
use crate::handlers::validate::{validate_github, validate_twitch};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, hmac_auth, rate_limit_middleware, request_id, request_logging, security_headers, RateLimiterCache,
};
use crate::state::AppState;

/// Assembles the full route table (spec §6): unauthenticated health/metrics,
/// HMAC-signed API routes, and the separately-signed source-control webhook.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let clip_routes = Router::new()
        .route("/clips", get(list_clips).post(store_clips).put(update_clip))
        .route("/clips/stored", get(get_stored_clip))
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let api_routes = Router::new()
        .route("/validate-twitch", get(validate_twitch))
        .route("/validate-github", get(validate_github))
        .route("/api/github/activity", get(github_activity))
        .route("/api/content/generate", post(generate_content))
        .route("/api/runs/:run_id", get(get_run))
        .route("/api/content/items", get(list_content_items))
        .route("/api/content/migrate", post(migrate_content))
        .merge(clip_routes)
        .layer(axum_middleware::from_fn_with_state(rate_limiter, rate_limit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), hmac_auth));

    let webhook_routes = Router::new().route("/webhook/github", post(github_webhook));

    let unauthenticated_routes = Router::new().route("/health", get(health));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(api_routes)
        .merge(webhook_routes)
        .merge(unauthenticated_routes)
        .merge(metrics_routes)
        .layer(axum_middleware::from_fn(metrics_middleware))
        .layer(axum_middleware::from_fn(security_headers))
        .layer(axum_middleware::from_fn(request_id))
        .layer(axum_middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
