//! Application state.

use std::sync::Arc;

use recap_ai::AiConfig;
use recap_auth::NonceCache;
use recap_clipcatalog::ClipCatalogConfig;
use recap_pipeline::{Orchestrator, PipelineConfig};
use recap_storage::ObjectStore;

use crate::config::ApiConfig;

/// Shared application state: one `ObjectStore` connection for the API's own
/// clip/content/event reads and writes, and one `Orchestrator` (with its own
/// internal store connection) as the shared backend for both the scheduled
/// triggers and the HTTP-triggered validation/generate endpoints.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<ObjectStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub nonce_cache: Arc<NonceCache>,
}

impl AppState {
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let pipeline_config = PipelineConfig::from_env();
        let clip_catalog_config = ClipCatalogConfig::from_env();
        let ai_config = AiConfig::from_env();

        let store = ObjectStore::from_env().await?;
        let orchestrator_store = ObjectStore::from_env().await?;

        let http = reqwest::Client::builder().timeout(config.request_timeout).build()?;

        let orchestrator = Orchestrator::new(orchestrator_store, http, pipeline_config, clip_catalog_config, ai_config);

        Ok(Self {
            config,
            store: Arc::new(store),
            orchestrator: Arc::new(orchestrator),
            nonce_cache: Arc::new(NonceCache::new()),
        })
    }
}
