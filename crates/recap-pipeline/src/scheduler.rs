//! Trigger loop: hourly token validation, a 6-hourly transcription sweep,
//! and the daily full pipeline run (spec §4.17). Each trigger runs on its
//! own `tokio::time::interval` and shuts down cleanly on the shared signal.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::config::PipelineConfig;
use crate::orchestrator::Orchestrator;

pub struct Scheduler {
    orchestrator: Arc<Orchestrator>,
    config: PipelineConfig,
}

impl Scheduler {
    pub fn new(orchestrator: Arc<Orchestrator>, config: PipelineConfig) -> Self {
        Self { orchestrator, config }
    }

    /// Runs all three trigger loops concurrently until `shutdown` fires.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut hourly = tokio::time::interval(self.config.hourly_interval);
        let mut six_hourly = tokio::time::interval(self.config.six_hourly_interval);
        let mut daily = tokio::time::interval(self.config.daily_interval);

        // The first tick fires immediately; skip it so a freshly-started
        // scheduler doesn't run all three triggers back to back on boot.
        hourly.tick().await;
        six_hourly.tick().await;
        daily.tick().await;

        loop {
            tokio::select! {
                _ = hourly.tick() => {
                    info!("hourly trigger fired");
                    if let Err(e) = self.orchestrator.validate_tokens().await {
                        tracing::error!(error = %e, "token validation run failed");
                    }
                }
                _ = six_hourly.tick() => {
                    info!("six-hourly trigger fired");
                    if let Err(e) = self.orchestrator.run_transcription_sweep().await {
                        tracing::error!(error = %e, "transcription sweep failed");
                    }
                }
                _ = daily.tick() => {
                    info!("daily trigger fired");
                    if let Err(e) = self.orchestrator.run_daily_pipeline().await {
                        tracing::error!(error = %e, "daily pipeline run failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_match_configured_durations() {
        let config = PipelineConfig::from_env();
        assert_eq!(config.hourly_interval.as_secs(), 3600);
        assert_eq!(config.six_hourly_interval.as_secs(), 6 * 3600);
        assert_eq!(config.daily_interval.as_secs(), 24 * 3600);
    }
}
