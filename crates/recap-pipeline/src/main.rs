//! Content-recap pipeline binary.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use recap_ai::AiConfig;
use recap_clipcatalog::ClipCatalogConfig;
use recap_pipeline::{Orchestrator, PipelineConfig, Scheduler};
use recap_storage::ObjectStore;

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("recap=info".parse().unwrap()))
        .init();

    info!("starting recap-pipeline");

    let config = PipelineConfig::from_env();
    let clip_catalog_config = ClipCatalogConfig::from_env();
    let ai_config = AiConfig::from_env();

    let store = match ObjectStore::from_env().await {
        Ok(store) => store,
        Err(e) => {
            error!("failed to connect to object store: {e}");
            std::process::exit(1);
        }
    };

    let http = reqwest::Client::builder()
        .timeout(ai_config.request_timeout)
        .build()
        .expect("failed to build http client");

    let orchestrator = Arc::new(Orchestrator::new(store, http, config.clone(), clip_catalog_config, ai_config));
    let scheduler = Scheduler::new(orchestrator, config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_handle = tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
        shutdown_tx.send(true).ok();
    });

    scheduler.run(shutdown_rx).await;
    shutdown_handle.await.ok();

    info!("recap-pipeline shutdown complete");
}
