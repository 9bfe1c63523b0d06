//! The Stage 1-6 pipeline: ingest, dedup/audio, transcribe, enhance, score
//! and promote, assemble and publish (spec §4.17). This is the only
//! component allowed to advance a `ContentItem`'s `processing_status`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use recap_ai::{parse_llm_json, AiConfig, InferenceClient, Judge, Sectioner, Transcriber};
use recap_auth::{with_retry, OAuthTokenProvider, RetryConfig, TokenCache};
use recap_clipcatalog::{AudioProcessorClient, ClipCatalogClient, ClipCatalogConfig, ClipCatalogOAuthProvider, Deduplicator};
use recap_content::{ContentItemService, ContentListQuery, ScoreInput, ScoreWeights, ScoredCandidate, Scorer};
use recap_events::{EventStore, TemporalMatcher};
use recap_models::{ArtifactRef, Clip, ContentItem, GitHubContext, JudgeEvaluation, Manifest, PipelineError, ProcessingStatus, RunStatus, Transcript};
use recap_storage::{keys, ObjectStore, PutOptions};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::blog;
use crate::config::PipelineConfig;
use crate::logging::StageLogger;
use crate::notifier::Notifier;
use crate::scm::ScmPublisher;

pub type PipelineResult<T> = Result<T, PipelineError>;

const TOKEN_REFRESH_SKEW: Duration = Duration::from_secs(300);

/// Whether a run completed every stage or stopped early after an
/// ingestion-stage transient failure exhausted its retries.
enum StageOutcome {
    Completed,
    Skipped(String),
}

pub struct Orchestrator {
    store: ObjectStore,
    http: Client,
    config: PipelineConfig,
    clip_catalog_config: ClipCatalogConfig,
    ai_config: AiConfig,
    clip_catalog_tokens: Arc<TokenCache>,
    clip_catalog: ClipCatalogClient,
    inference: InferenceClient,
    scm: ScmPublisher,
    notifier: Notifier,
}

impl Orchestrator {
    pub fn new(
        store: ObjectStore,
        http: Client,
        config: PipelineConfig,
        clip_catalog_config: ClipCatalogConfig,
        ai_config: AiConfig,
    ) -> Self {
        let oauth_provider: Arc<dyn OAuthTokenProvider> =
            Arc::new(ClipCatalogOAuthProvider::new(http.clone(), &clip_catalog_config));
        let clip_catalog_tokens = Arc::new(TokenCache::new(oauth_provider, TOKEN_REFRESH_SKEW));
        let clip_catalog = ClipCatalogClient::new(http.clone(), clip_catalog_config.clone(), clip_catalog_tokens.clone());
        let inference = InferenceClient::new(http.clone(), ai_config.api_key.clone());
        let scm = ScmPublisher::new(http.clone(), config.clone());
        let notifier = Notifier::new(http.clone(), config.notifier_webhook_url.clone());

        Self {
            store,
            http,
            config,
            clip_catalog_config,
            ai_config,
            clip_catalog_tokens,
            clip_catalog,
            inference,
            scm,
            notifier,
        }
    }

    /// Hourly trigger: confirms both upstream token caches can still mint a
    /// token, surfacing auth rot before a scheduled run hits it.
    pub async fn validate_tokens(&self) -> PipelineResult<()> {
        let logger = StageLogger::new("hourly", "validate_tokens");
        logger.log_start("validating cached upstream tokens");

        if let Err(e) = self.clip_catalog_tokens.get_token().await {
            logger.log_warning(&format!("clip catalog token check failed: {e}"));
        }
        if let Err(e) = self.scm.validate_token().await {
            logger.log_warning(&format!("source-control token check failed: {e}"));
        }

        logger.log_completion("token validation complete");
        Ok(())
    }

    /// Confirms the clip-catalog token cache can still mint a token,
    /// surfacing a distinct 200/400 for the upstream-credential-check
    /// endpoint rather than `validate_tokens`'s best-effort logging of both.
    pub async fn validate_twitch(&self) -> PipelineResult<()> {
        self.clip_catalog_tokens.get_token().await.map(|_| ()).map_err(PipelineError::from)
    }

    /// Confirms the source-control app credentials can mint an installation
    /// token. See `validate_twitch`.
    pub async fn validate_github(&self) -> PipelineResult<()> {
        self.scm.validate_token().await
    }

    /// Every-6-hours trigger: runs the transcription stage alone, so clips
    /// that have had audio ready for a while don't wait for the next daily
    /// run to get picked up.
    pub async fn run_transcription_sweep(&self) -> PipelineResult<()> {
        let run_id = new_run_id("sweep");
        let mut run_status = RunStatus::new_queued(&run_id, Utc::now(), 1);
        self.persist_run_status(&run_status).await?;

        let logger = StageLogger::new(&run_id, "transcribe");
        run_status.advance("transcribe", 1, Utc::now());
        self.persist_run_status(&run_status).await?;

        match self.stage3_transcribe(&logger).await {
            Ok(()) => {
                run_status.succeed(Utc::now());
                logger.log_completion("transcription sweep complete");
            }
            Err(e) => {
                run_status.fail(e.to_string(), Utc::now());
                logger.log_error(&format!("transcription sweep failed: {e}"));
            }
        }
        self.persist_run_status(&run_status).await?;
        Ok(())
    }

    /// Daily trigger: the full Stage 1-6 run.
    pub async fn run_daily_pipeline(&self) -> PipelineResult<()> {
        let run_id = new_run_id("daily");
        self.run_daily_pipeline_with_id(&run_id).await
    }

    /// Runs the full Stage 1-6 pipeline under a caller-supplied run id, so an
    /// HTTP trigger can hand the id back before the run finishes.
    pub async fn run_daily_pipeline_with_id(&self, run_id: &str) -> PipelineResult<()> {
        let mut run_status = RunStatus::new_queued(run_id, Utc::now(), 6);
        self.persist_run_status(&run_status).await?;

        let logger = StageLogger::new(run_id, "orchestrator");
        logger.log_start("daily pipeline run starting");

        match self.run_stages(run_id, &mut run_status).await {
            Ok(StageOutcome::Completed) => {
                run_status.succeed(Utc::now());
                logger.log_completion("daily pipeline run succeeded");
                self.persist_run_status(&run_status).await?;
                Ok(())
            }
            Ok(StageOutcome::Skipped(reason)) => {
                logger.log_warning(&format!("daily pipeline run skipped: {reason}"));
                self.persist_run_status(&run_status).await?;
                Ok(())
            }
            Err(e) => {
                run_status.fail(e.to_string(), Utc::now());
                logger.log_error(&format!("daily pipeline run failed: {e}"));
                self.persist_run_status(&run_status).await?;
                self.notifier.notify_failure(&run_status.progress.step, &e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Starts a daily pipeline run in the background and returns its run id
    /// immediately, for the HTTP trigger endpoint that can't wait on the
    /// whole run before responding.
    pub fn spawn_daily_pipeline(self: &Arc<Self>) -> String {
        let run_id = new_run_id("daily");
        let orchestrator = Arc::clone(self);
        let owned_run_id = run_id.clone();
        tokio::spawn(async move {
            if let Err(e) = orchestrator.run_daily_pipeline_with_id(&owned_run_id).await {
                tracing::error!(error = %e, run_id = %owned_run_id, "daily pipeline run failed");
            }
        });
        run_id
    }

    async fn run_stages(&self, run_id: &str, run_status: &mut RunStatus) -> PipelineResult<StageOutcome> {
        run_status.advance("ingest", 1, Utc::now());
        self.persist_run_status(run_status).await?;
        if let StageOutcome::Skipped(reason) = self.stage1_ingest(&StageLogger::new(run_id, "ingest")).await? {
            return Ok(StageOutcome::Skipped(reason));
        }

        run_status.advance("dedup_audio", 2, Utc::now());
        self.persist_run_status(run_status).await?;
        self.stage2_dedup_audio(&StageLogger::new(run_id, "dedup_audio")).await?;

        run_status.advance("transcribe", 3, Utc::now());
        self.persist_run_status(run_status).await?;
        self.stage3_transcribe(&StageLogger::new(run_id, "transcribe")).await?;

        run_status.advance("enhance", 4, Utc::now());
        self.persist_run_status(run_status).await?;
        self.stage4_enhance(&StageLogger::new(run_id, "enhance")).await?;

        run_status.advance("score_promote", 5, Utc::now());
        self.persist_run_status(run_status).await?;
        let promoted = self.stage5_score_promote(&StageLogger::new(run_id, "score_promote")).await?;

        run_status.advance("assemble_publish", 6, Utc::now());
        self.persist_run_status(run_status).await?;
        self.stage6_assemble_publish(&StageLogger::new(run_id, "assemble_publish"), &promoted).await?;

        Ok(StageOutcome::Completed)
    }

    async fn persist_run_status(&self, run_status: &RunStatus) -> PipelineResult<()> {
        let key = keys::run_status_key(&run_status.run_id);
        let body = serde_json::to_vec(run_status).map_err(|e| PipelineError::contract(e.to_string()))?;
        self.store
            .put(&key, body, PutOptions { content_type: Some("application/json".to_string()), custom_metadata: Default::default() })
            .await
            .map_err(|e| PipelineError::upstream_temporary(e.to_string()))
    }

    /// Fetches clips created since `lookback_hours` ago, writes the legacy
    /// `clips/{id}.json` record, and opens a pending `ContentItem` for any
    /// clip not already tracked.
    async fn stage1_ingest(&self, logger: &StageLogger) -> PipelineResult<StageOutcome> {
        let broadcaster_id = self
            .config
            .broadcaster_id
            .clone()
            .ok_or_else(|| PipelineError::fatal_config("CLIP_CATALOG_BROADCASTER_ID not set"))?;

        let now = Utc::now();
        let since = now - ChronoDuration::hours(self.config.lookback_hours);

        let clips = match self
            .clip_catalog
            .list_recent_clips(&broadcaster_id, &since.to_rfc3339(), &now.to_rfc3339(), self.config.max_clips_per_run as u32)
            .await
        {
            Ok(clips) => clips,
            Err(e) => {
                let pipeline_err: PipelineError = e.into();
                if pipeline_err.is_retryable() {
                    return Ok(StageOutcome::Skipped(pipeline_err.to_string()));
                }
                return Err(pipeline_err);
            }
        };

        let service = ContentItemService::new(&self.store);
        for clip in &clips {
            let key = keys::clip_key(&clip.clip_id);
            let body = serde_json::to_vec(clip).map_err(|e| PipelineError::contract(e.to_string()))?;
            self.store
                .put(&key, body, PutOptions { content_type: Some("application/json".to_string()), custom_metadata: Default::default() })
                .await
                .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

            let existing = service.get(&clip.clip_id, clip.created_at).await.map_err(PipelineError::from)?;
            if existing.is_none() {
                let pending = ContentItem::new_pending(
                    clip.clip_id.clone(),
                    clip.title.clone(),
                    clip.url.clone(),
                    clip.duration_seconds,
                    clip.created_at,
                    Utc::now(),
                );
                service.put(pending).await.map_err(PipelineError::from)?;
            }
        }

        logger.log_progress(&format!("ingested {} clips", clips.len()));
        Ok(StageOutcome::Completed)
    }

    /// Partitions pending clips by audio-artifact presence, requests
    /// extraction for the rest, and advances whatever becomes ready within
    /// the poll budget. Partial success is expected and handled by leaving
    /// the remainder at `pending` for a later run.
    async fn stage2_dedup_audio(&self, logger: &StageLogger) -> PipelineResult<()> {
        let service = ContentItemService::new(&self.store);
        let pending = self.list_items_with_status(&service, ProcessingStatus::Pending).await?;
        if pending.is_empty() {
            return Ok(());
        }

        let clip_ids: Vec<String> = pending.iter().map(|i| i.clip_id.clone()).collect();

        let dedup = Deduplicator::new(&self.store, self.clip_catalog_config.dedup_concurrency);
        let classify = dedup.classify(&clip_ids).await.map_err(PipelineError::from)?;

        let audio = AudioProcessorClient::new(self.http.clone(), &self.clip_catalog_config, &self.store);
        if !classify.need_download.is_empty() {
            if let Err(e) = audio.request_processing(&classify.need_download).await {
                logger.log_warning(&format!("audio processing request failed: {e}"));
            }
        }
        let newly_ready = audio.poll_ready(&classify.need_download).await.map_err(PipelineError::from)?;

        let mut ready_ids = classify.have_audio;
        ready_ids.extend(newly_ready);

        let mut advanced = 0;
        for item in pending.iter().filter(|i| ready_ids.contains(&i.clip_id)) {
            let audio_key = keys::audio_key(&item.clip_id);
            self.advance_item(&service, item, ProcessingStatus::AudioReady, |i| {
                i.audio_file_url = Some(audio_key.clone());
            })
            .await?;
            advanced += 1;
        }

        logger.log_progress(&format!("{advanced} of {} pending clips now audio-ready", clip_ids.len()));
        Ok(())
    }

    /// Transcribes every audio-ready item still missing a transcript.
    /// Failures (per-clip, after a single retry) leave the item at
    /// `audio_ready` for the next sweep rather than aborting the run.
    async fn stage3_transcribe(&self, logger: &StageLogger) -> PipelineResult<()> {
        let service = ContentItemService::new(&self.store);
        let items = self.list_items_with_status(&service, ProcessingStatus::AudioReady).await?;
        let transcriber = Transcriber::new(&self.inference, &self.ai_config.transcribe_models);

        let mut transcribed = 0;
        for item in &items {
            if item.transcript_ref.is_some() {
                continue;
            }
            let Some(audio_key) = &item.audio_file_url else {
                logger.log_warning(&format!("{} is audio_ready with no audio_file_url", item.clip_id));
                continue;
            };

            let audio_url = match self.store.presign_get(audio_key, Duration::from_secs(3600)).await {
                Ok(url) => url,
                Err(e) => {
                    logger.log_warning(&format!("presign failed for {}: {e}", item.clip_id));
                    continue;
                }
            };

            let transcript = match transcribe_with_retry(&transcriber, &item.clip_id, &audio_url, self.config.retries_transcribe).await {
                Ok(t) => t,
                Err(e) => {
                    logger.log_warning(&format!("transcription failed for {}: {e}, leaving at audio_ready", item.clip_id));
                    continue;
                }
            };

            if let Err(e) = transcript.validate() {
                logger.log_warning(&format!("transcript for {} failed validation: {e}, leaving at audio_ready", item.clip_id));
                continue;
            }

            let key = keys::transcript_key(&item.clip_id);
            let body = serde_json::to_vec(&transcript).map_err(|e| PipelineError::contract(e.to_string()))?;
            self.store
                .put(&key, body, PutOptions { content_type: Some("application/json".to_string()), custom_metadata: Default::default() })
                .await
                .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

            let artifact = ArtifactRef {
                url: key,
                size: transcript.full_text.len() as u64,
                summary: transcript.full_text.chars().take(200).collect(),
            };
            self.advance_item(&service, item, ProcessingStatus::Transcribed, |i| {
                i.transcript_ref = Some(artifact.clone());
            })
            .await?;
            transcribed += 1;
        }

        logger.log_progress(&format!("transcribed {transcribed} of {} audio-ready clips", items.len()));
        Ok(())
    }

    /// Correlates every transcribed item with nearby source-control
    /// activity. A matcher failure still advances the item to `enhanced`,
    /// with an empty context, rather than stalling it indefinitely.
    async fn stage4_enhance(&self, logger: &StageLogger) -> PipelineResult<()> {
        let service = ContentItemService::new(&self.store);
        let items = self.list_items_with_status(&service, ProcessingStatus::Transcribed).await?;
        let window = ChronoDuration::hours(self.config.temporal_window_hours);
        let matcher = TemporalMatcher::new(EventStore::new(&self.store), window);

        for item in &items {
            if item.github_context_ref.is_some() {
                continue;
            }

            let context = match matcher.match_clip(&item.clip_id, item.clip_created_at, None).await {
                Ok(ctx) => ctx,
                Err(e) => {
                    logger.log_warning(&format!("temporal match failed for {}: {e}, using empty context", item.clip_id));
                    GitHubContext::empty(item.clip_id.clone())
                }
            };

            let key = keys::github_context_key(&item.clip_id);
            let body = serde_json::to_vec(&context).map_err(|e| PipelineError::contract(e.to_string()))?;
            self.store
                .put(&key, body.clone(), PutOptions { content_type: Some("application/json".to_string()), custom_metadata: Default::default() })
                .await
                .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

            let artifact = ArtifactRef {
                url: key,
                size: body.len() as u64,
                summary: summarize_github_context(&context),
            };
            self.advance_item(&service, item, ProcessingStatus::Enhanced, |i| {
                i.github_context_ref = Some(artifact.clone());
                i.enhanced_at = Some(Utc::now());
            })
            .await?;
        }

        logger.log_progress(&format!("enhanced {} clips", items.len()));
        Ok(())
    }

    /// Deterministic weighted scoring over every enhanced item, promoting
    /// the top `clamp(|candidates|, 5, 12)` to `ready_for_content`. A
    /// failure here is treated as a bug, not a transient condition.
    async fn stage5_score_promote(&self, logger: &StageLogger) -> PipelineResult<Vec<ContentItem>> {
        let service = ContentItemService::new(&self.store);
        let items = self.list_items_with_status(&service, ProcessingStatus::Enhanced).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let scorer = Scorer::new(ScoreWeights::default()).map_err(PipelineError::state)?;
        let mut candidates = Vec::new();

        for item in &items {
            let transcript_text = self.fetch_transcript_text(item).await?;
            let transcript_words = transcript_text.split_whitespace().count();

            let github_confidence = match &item.github_context_ref {
                Some(gref) => self.fetch_github_confidence(gref).await?,
                None => 0.0,
            };

            let views = self.fetch_clip_view_count(&item.clip_id).await?;
            let ai_content_score = self.ai_content_score(&transcript_text).await;

            let input = ScoreInput {
                content_score: ai_content_score,
                github_confidence,
                views,
                transcript_words,
                duration_seconds: item.clip_duration,
                transcript_sample: Some(transcript_text.as_str()),
            };
            let score = scorer.score(&input);
            candidates.push(ScoredCandidate { item: item.clone(), score });
        }

        let selected = recap_content::scorer::select_top(candidates, |item| item.clip_created_at);

        let mut promoted = Vec::with_capacity(selected.len());
        for candidate in selected {
            let score = candidate.score;
            let updated = self
                .advance_item(&service, &candidate.item, ProcessingStatus::ReadyForContent, |i| {
                    i.content_score = Some(score);
                    i.content_ready_at = Some(Utc::now());
                })
                .await?;
            promoted.push(updated);
        }

        logger.log_progress(&format!("promoted {} of {} enhanced clips", promoted.len(), items.len()));
        Ok(promoted)
    }

    /// Builds the day's manifest, renders it, publishes it via the
    /// source-control branch/commit/PR/check-run flow, and notifies. Every
    /// sub-step is individually idempotent, so a retried run never
    /// duplicates a branch, file, or PR.
    async fn stage6_assemble_publish(&self, logger: &StageLogger, promoted: &[ContentItem]) -> PipelineResult<()> {
        if promoted.is_empty() {
            logger.log_progress("no items promoted this run, nothing to publish");
            return Ok(());
        }

        let sectioner = Sectioner::new(&self.inference, &self.ai_config.section_models);
        let mut sections = Vec::with_capacity(promoted.len());
        for item in promoted {
            let transcript_text = self.fetch_transcript_text(item).await?;
            let section = sectioner.section(&item.clip_title, item.clip_duration, &transcript_text, &item.clip_url).await;
            sections.push(section);
        }

        let now = Utc::now();
        let date = now.date_naive();
        let title = format!("Daily Dev Recap - {date}");

        let mut manifest = Manifest {
            post_id: date.to_string(),
            tz: "UTC".to_string(),
            title: title.clone(),
            summary: format!(
                "{} clips from today's stream, correlated with recent development activity.",
                sections.len()
            ),
            tags: vec!["devlog".to_string(), "twitch".to_string()],
            sections,
            judge_axes: None,
            ai_generation_metadata: json!({ "run_id": logger.run_id() }),
        };

        let draft_body = blog::render(&manifest, date, None, false);
        let evaluation = Judge::new(&self.inference, &self.ai_config.judge_models).evaluate(&title, &draft_body).await;
        manifest.judge_axes = Some(evaluation.clone());
        let body = blog::render(&manifest, date, None, false);

        let branch = blog::branch_name(date);
        let path = blog::blog_path(date);

        self.scm.ensure_branch(&branch).await?;
        self.scm.upsert_file(&branch, &path, &body, &format!("Daily dev recap for {date}")).await?;
        let pr = self.scm.open_pr(&branch, &title, &pr_body(&evaluation)).await?;

        let (approved, reasons) = evaluation.meets_threshold(self.config.judge_overall_min, self.config.judge_axis_min);
        let axis_breakdown = format_axis_breakdown(&evaluation, &reasons);
        self.scm
            .post_check_run(&pr.head.sha, evaluation.overall, self.config.judge_overall_min, &axis_breakdown, &evaluation.recommendations)
            .await?;

        let status_summary = if approved { "approved".to_string() } else { format!("needs review: {}", reasons.join(", ")) };
        self.notifier.notify_success(evaluation.overall, promoted.len(), &status_summary, &pr.html_url).await;

        logger.log_completion(&format!("published PR #{} for {date}", pr.number));
        Ok(())
    }

    async fn list_items_with_status(&self, service: &ContentItemService<'_>, status: ProcessingStatus) -> PipelineResult<Vec<ContentItem>> {
        let page = service
            .list(ContentListQuery {
                processing_status: Some(status),
                limit: Some(self.config.max_clips_per_run.max(50)),
                ..Default::default()
            })
            .await
            .map_err(PipelineError::from)?;
        Ok(page.items)
    }

    async fn advance_item<F>(&self, service: &ContentItemService<'_>, item: &ContentItem, next_status: ProcessingStatus, mutate: F) -> PipelineResult<ContentItem>
    where
        F: FnOnce(&mut ContentItem),
    {
        service
            .update(&item.clip_id, item.clip_created_at, item.stored_at, |i| {
                mutate(i);
                i.processing_status = next_status;
            })
            .await
            .map_err(PipelineError::from)
    }

    async fn fetch_transcript_text(&self, item: &ContentItem) -> PipelineResult<String> {
        let Some(transcript_ref) = &item.transcript_ref else {
            return Ok(String::new());
        };
        let object = self
            .store
            .get(&transcript_ref.url)
            .await
            .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;
        let Some(object) = object else {
            return Ok(String::new());
        };
        let transcript: Transcript = serde_json::from_slice(&object.body).map_err(|e| PipelineError::contract(e.to_string()))?;
        Ok(transcript.full_text)
    }

    async fn fetch_github_confidence(&self, github_ref: &ArtifactRef) -> PipelineResult<f64> {
        let object = self
            .store
            .get(&github_ref.url)
            .await
            .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;
        let Some(object) = object else {
            return Ok(0.0);
        };
        let context: GitHubContext = serde_json::from_slice(&object.body).map_err(|e| PipelineError::contract(e.to_string()))?;
        Ok(context.confidence_score)
    }

    async fn fetch_clip_view_count(&self, clip_id: &str) -> PipelineResult<u64> {
        let object = self
            .store
            .get(&keys::clip_key(clip_id))
            .await
            .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;
        let Some(object) = object else {
            return Ok(0);
        };
        let clip: Clip = serde_json::from_slice(&object.body).map_err(|e| PipelineError::contract(e.to_string()))?;
        Ok(clip.view_count)
    }

    /// Asks the inference model to rate how recap-worthy a clip's
    /// transcript is, falling back to a neutral 0.5 on any failure -- the
    /// same defensive idiom the sectioner and judge use.
    async fn ai_content_score(&self, transcript_text: &str) -> f64 {
        if transcript_text.trim().is_empty() {
            return 0.5;
        }

        let prompt = format!(
            r#"Rate how suitable this stream clip is for a developer-facing daily recap, based on its transcript.

Transcript: {transcript_text}

Return ONLY a single JSON object: {{ "content_score": 0.0-1.0 }}"#
        );

        match self.inference.call_with_fallback(&self.ai_config.section_models, &prompt).await {
            Ok(raw) => match parse_llm_json::<ContentScoreResponse>(&raw) {
                Ok(parsed) => parsed.content_score.clamp(0.0, 1.0),
                Err(_) => 0.5,
            },
            Err(_) => 0.5,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentScoreResponse {
    content_score: f64,
}

fn new_run_id(kind: &str) -> String {
    format!("{}-{kind}-{}", Utc::now().format("%Y%m%dT%H%M%SZ"), uuid::Uuid::new_v4().simple())
}

/// Exponential backoff (1s, 2s, 4s, … capped at 10s) over `max_retries`
/// attempts, per the transcription stage's retry budget.
async fn transcribe_with_retry(
    transcriber: &Transcriber<'_>,
    clip_id: &str,
    audio_url: &str,
    max_retries: u32,
) -> Result<Transcript, recap_ai::AiError> {
    let retry_config = RetryConfig::default().with_max_retries(max_retries);
    with_retry(&retry_config, "pipeline.transcribe", || async {
        transcriber.transcribe(clip_id, audio_url).await
    })
    .await
}

fn summarize_github_context(context: &GitHubContext) -> String {
    let prs = context.linked_refs.linked_prs.as_ref().map(Vec::len).unwrap_or(0);
    let commits = context.linked_refs.linked_commits.as_ref().map(Vec::len).unwrap_or(0);
    let issues = context.linked_refs.linked_issues.as_ref().map(Vec::len).unwrap_or(0);
    format!(
        "{prs} PR(s), {commits} commit(s), {issues} issue(s); confidence {:.2}",
        context.confidence_score
    )
}

fn pr_body(evaluation: &JudgeEvaluation) -> String {
    format!(
        "Automated daily dev recap.\n\nQuality judge overall score: {:.1}/100\n\n{}",
        evaluation.overall, evaluation.reasoning
    )
}

fn format_axis_breakdown(evaluation: &JudgeEvaluation, failing_reasons: &[String]) -> String {
    let axes = &evaluation.per_axis;
    let mut out = format!(
        "coherence: {:.1}, correctness: {:.1}, dev_signal: {:.1}, narrative_flow: {:.1}",
        axes.coherence, axes.correctness, axes.dev_signal, axes.narrative_flow
    );
    if !failing_reasons.is_empty() {
        out.push_str(&format!("\n\nBelow threshold: {}", failing_reasons.join("; ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_models::{Confidence, LinkedPr, LinkedRefs, MatchReason};

    #[test]
    fn summarizes_counts_and_confidence() {
        let context = GitHubContext {
            clip_id: "abc".to_string(),
            linked_refs: LinkedRefs {
                linked_prs: Some(vec![LinkedPr {
                    number: 1,
                    url: "https://github.com/org/repo/pull/1".to_string(),
                    title: "Fix".to_string(),
                    confidence: Confidence::High,
                    match_reason: MatchReason::TemporalProximity,
                }]),
                linked_commits: Some(Vec::new()),
                linked_issues: Some(Vec::new()),
            },
            confidence_score: 0.82,
            match_reason: MatchReason::TemporalProximity,
        };
        let summary = summarize_github_context(&context);
        assert!(summary.contains("1 PR(s)"));
        assert!(summary.contains("0.82"));
    }

    #[test]
    fn run_ids_are_unique_and_sortable_by_kind() {
        let a = new_run_id("daily");
        let b = new_run_id("daily");
        assert_ne!(a, b);
        assert!(a.contains("-daily-"));
    }

    #[test]
    fn pr_body_includes_overall_score() {
        let body = pr_body(&JudgeEvaluation::neutral_default());
        assert!(body.contains("50.0/100"));
    }
}
