//! Source-control publisher: branch, commit, PR, and check-run (spec §4.15).
//!
//! Authenticates as a GitHub App installation via [`InstallationTokenCache`]
//! and talks to the REST API directly; every write is idempotent so a
//! retried publish never duplicates state.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use recap_auth::jwt::{InstallationTokenCache, InstallationTokenExchanger};
use recap_auth::{with_retry, AuthError, AuthResult, RetryConfig};
use recap_models::PipelineError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::config::PipelineConfig;

pub type ScmResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    pub head: PullRequestHead,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestHead {
    pub sha: String,
}

#[derive(Debug, Clone)]
pub struct CheckRunResult {
    pub conclusion: &'static str,
}

struct GithubInstallationExchanger {
    http: Client,
    api_base_url: String,
    installation_id: String,
}

#[async_trait::async_trait]
impl InstallationTokenExchanger for GithubInstallationExchanger {
    async fn exchange(&self, app_jwt: &str) -> AuthResult<String> {
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_base_url, self.installation_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(app_jwt)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(AuthError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::token_acquisition_error(format!(
                "installation token exchange returned {status}: {body}"
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            token: String,
        }
        let body: TokenResponse = response.json().await.map_err(AuthError::Json)?;
        Ok(body.token)
    }
}

pub struct ScmPublisher {
    http: Client,
    config: PipelineConfig,
    tokens: InstallationTokenCache,
}

impl ScmPublisher {
    pub fn new(http: Client, config: PipelineConfig) -> Self {
        let exchanger: Arc<dyn InstallationTokenExchanger> = Arc::new(GithubInstallationExchanger {
            http: http.clone(),
            api_base_url: config.scm_api_base_url.clone(),
            installation_id: config.scm_installation_id.clone(),
        });
        let tokens = InstallationTokenCache::new(
            config.scm_app_id.clone(),
            config.scm_private_key_pem.clone(),
            config.scm_app_kid.clone(),
            exchanger,
        );
        Self { http, config, tokens }
    }

    fn repo_path(&self) -> String {
        format!("{}/{}", self.config.content_repo_owner, self.config.content_repo_name)
    }

    async fn token(&self) -> ScmResult<String> {
        self.tokens.get_token().await.map_err(PipelineError::from)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/repos/{}{}", self.config.scm_api_base_url, self.repo_path(), path)
    }

    /// Creates `branch` at the tip of the configured base branch. Treats
    /// "Reference already exists" as success, so a retried publish never
    /// fails on the branch-creation step.
    pub async fn ensure_branch(&self, branch: &str) -> ScmResult<()> {
        let retry_config = RetryConfig::default();

        with_retry(&retry_config, "scm.ensure_branch", || async {
            let token = self.token().await?;

            let base_ref_url = self.api_url(&format!("/git/ref/heads/{}", self.config.content_base_branch));
            let response = self
                .http
                .get(&base_ref_url)
                .bearer_auth(&token)
                .header("Accept", "application/vnd.github+json")
                .send()
                .await
                .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

            if !response.status().is_success() {
                return Err(permanent_or_temporary(response.status(), "fetch base ref"));
            }

            #[derive(Deserialize)]
            struct RefObject {
                sha: String,
            }
            #[derive(Deserialize)]
            struct RefResponse {
                object: RefObject,
            }
            let base_ref: RefResponse = response
                .json()
                .await
                .map_err(|e| PipelineError::contract(e.to_string()))?;

            let create_url = self.api_url("/git/refs");
            let response = self
                .http
                .post(&create_url)
                .bearer_auth(&token)
                .header("Accept", "application/vnd.github+json")
                .json(&json!({
                    "ref": format!("refs/heads/{branch}"),
                    "sha": base_ref.object.sha,
                }))
                .send()
                .await
                .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

            if response.status().is_success() {
                return Ok(());
            }

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNPROCESSABLE_ENTITY && body.contains("Reference already exists") {
                return Ok(());
            }

            Err(permanent_or_temporary_with_body(status, &body))
        })
        .await
    }

    /// Creates or updates `path` on `branch` with `content`. A 422 on the
    /// initial PUT means the file already exists, so the blob's current
    /// `sha` is fetched and the PUT is retried as an update.
    pub async fn upsert_file(&self, branch: &str, path: &str, content: &str, message: &str) -> ScmResult<()> {
        let retry_config = RetryConfig::default();

        with_retry(&retry_config, "scm.upsert_file", || async {
            let token = self.token().await?;
            let encoded = STANDARD.encode(content.as_bytes());

            let existing_sha = self.file_sha(branch, path, &token).await?;

            let mut body = json!({
                "message": message,
                "content": encoded,
                "branch": branch,
            });
            if let Some(sha) = existing_sha {
                body["sha"] = json!(sha);
            }

            let url = self.api_url(&format!("/contents/{path}"));
            let response = self
                .http
                .put(&url)
                .bearer_auth(&token)
                .header("Accept", "application/vnd.github+json")
                .json(&body)
                .send()
                .await
                .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

            if response.status().is_success() {
                return Ok(());
            }

            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(permanent_or_temporary_with_body(status, &text))
        })
        .await
    }

    async fn file_sha(&self, branch: &str, path: &str, token: &str) -> ScmResult<Option<String>> {
        let url = self.api_url(&format!("/contents/{path}"));
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .query(&[("ref", branch)])
            .send()
            .await
            .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                #[derive(Deserialize)]
                struct ContentsResponse {
                    sha: String,
                }
                let body: ContentsResponse = response
                    .json()
                    .await
                    .map_err(|e| PipelineError::contract(e.to_string()))?;
                Ok(Some(body.sha))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(permanent_or_temporary_with_body(status, &text))
            }
        }
    }

    /// Opens a non-draft PR from `branch` onto the configured base branch.
    pub async fn open_pr(&self, branch: &str, title: &str, body: &str) -> ScmResult<PullRequest> {
        let retry_config = RetryConfig::default();

        with_retry(&retry_config, "scm.open_pr", || async {
            let token = self.token().await?;
            let url = self.api_url("/pulls");

            let response = self
                .http
                .post(&url)
                .bearer_auth(&token)
                .header("Accept", "application/vnd.github+json")
                .json(&json!({
                    "title": title,
                    "head": branch,
                    "base": self.config.content_base_branch,
                    "body": body,
                    "draft": false,
                }))
                .send()
                .await
                .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

            if response.status().is_success() {
                return response
                    .json()
                    .await
                    .map_err(|e| PipelineError::contract(e.to_string()));
            }

            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status == StatusCode::UNPROCESSABLE_ENTITY && text.contains("already exists") {
                return self.find_open_pr(branch, &token).await;
            }
            Err(permanent_or_temporary_with_body(status, &text))
        })
        .await
    }

    async fn find_open_pr(&self, branch: &str, token: &str) -> ScmResult<PullRequest> {
        let url = self.api_url("/pulls");
        let head = format!("{}:{branch}", self.config.content_repo_owner);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .query(&[("head", head.as_str()), ("state", "open")])
            .send()
            .await
            .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

        if !response.status().is_success() {
            return Err(permanent_or_temporary(response.status(), "find existing pr"));
        }

        let prs: Vec<PullRequest> = response
            .json()
            .await
            .map_err(|e| PipelineError::contract(e.to_string()))?;

        prs.into_iter()
            .next()
            .ok_or_else(|| PipelineError::upstream_permanent("pr already exists but could not be located".to_string()))
    }

    /// Confirms the installation token can be acquired, for the hourly
    /// validation trigger.
    pub async fn validate_token(&self) -> ScmResult<()> {
        self.token().await.map(|_| ())
    }

    /// Posts the quality-judge check run against `sha`. Conclusion is
    /// `success` iff the overall score clears `overall_min`, else `neutral`.
    pub async fn post_check_run(
        &self,
        sha: &str,
        overall_score: f64,
        overall_min: f64,
        axis_breakdown: &str,
        recommendations: &[String],
    ) -> ScmResult<CheckRunResult> {
        let retry_config = RetryConfig::default();
        let conclusion = check_conclusion(overall_score, overall_min);
        let text = if recommendations.is_empty() {
            axis_breakdown.to_string()
        } else {
            format!("{axis_breakdown}\n\nRecommendations:\n{}", recommendations.join("\n"))
        };

        with_retry(&retry_config, "scm.post_check_run", || async {
            let token = self.token().await?;
            let url = self.api_url("/check-runs");

            let response = self
                .http
                .post(&url)
                .bearer_auth(&token)
                .header("Accept", "application/vnd.github+json")
                .json(&json!({
                    "name": "Content Quality Judge",
                    "head_sha": sha,
                    "status": "completed",
                    "completed_at": Utc::now().to_rfc3339(),
                    "conclusion": conclusion,
                    "output": {
                        "title": format!("Content Quality Score: {}/100", overall_score.round() as i64),
                        "text": text,
                    },
                }))
                .send()
                .await
                .map_err(|e| PipelineError::upstream_temporary(e.to_string()))?;

            if response.status().is_success() {
                return Ok(CheckRunResult { conclusion });
            }

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(permanent_or_temporary_with_body(status, &body))
        })
        .await
    }
}

fn permanent_or_temporary(status: StatusCode, op: &str) -> PipelineError {
    permanent_or_temporary_with_body(status, &format!("{op} failed"))
}

/// 429 and 5xx are transient; every other non-2xx is treated as permanent.
fn permanent_or_temporary_with_body(status: StatusCode, body: &str) -> PipelineError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        PipelineError::upstream_temporary(format!("github returned {status}: {body}"))
    } else {
        warn!(%status, %body, "github rejected request");
        PipelineError::upstream_permanent(format!("github returned {status}: {body}"))
    }
}

fn check_conclusion(overall_score: f64, overall_min: f64) -> &'static str {
    if overall_score >= overall_min {
        "success"
    } else {
        "neutral"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_server_errors_are_transient() {
        assert!(permanent_or_temporary_with_body(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
        assert!(permanent_or_temporary_with_body(StatusCode::SERVICE_UNAVAILABLE, "").is_retryable());
    }

    #[test]
    fn other_client_errors_are_permanent() {
        let err = permanent_or_temporary_with_body(StatusCode::NOT_FOUND, "missing");
        assert!(!err.is_retryable());
        assert!(matches!(err, PipelineError::UpstreamPermanent(_)));
    }

    #[test]
    fn existing_reference_on_branch_create_is_not_special_cased_here() {
        // ensure_branch handles the 422 "Reference already exists" body itself;
        // the generic classifier treats any other 422 as permanent.
        let err = permanent_or_temporary_with_body(StatusCode::UNPROCESSABLE_ENTITY, "some other reason");
        assert!(!err.is_retryable());
    }

    #[test]
    fn check_conclusion_is_success_only_at_or_above_threshold() {
        assert_eq!(check_conclusion(80.0, 80.0), "success");
        assert_eq!(check_conclusion(79.9, 80.0), "neutral");
        assert_eq!(check_conclusion(95.0, 80.0), "success");
    }

    #[test]
    fn check_run_body_carries_completed_at_and_output_text() {
        let body = json!({
            "name": "Content Quality Judge",
            "head_sha": "deadbeef",
            "status": "completed",
            "completed_at": Utc::now().to_rfc3339(),
            "conclusion": check_conclusion(85.0, 80.0),
            "output": {
                "title": "Content Quality Score: 85/100",
                "text": "axis breakdown here",
            },
        });

        assert!(body["completed_at"].is_string());
        assert_eq!(body["output"]["text"], "axis breakdown here");
        assert!(body["output"].get("summary").is_none());
    }
}
