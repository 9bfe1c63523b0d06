//! Client-credentials OAuth provider for the clip-catalog upstream.

use std::time::Duration;

use recap_auth::{AuthError, AuthResult, OAuthTokenProvider};
use reqwest::Client;
use serde::Deserialize;

use crate::config::ClipCatalogConfig;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

pub struct ClipCatalogOAuthProvider {
    http: Client,
    client_id: String,
    client_secret: String,
    token_endpoint: String,
    validate_endpoint: String,
}

impl ClipCatalogOAuthProvider {
    pub fn new(http: Client, config: &ClipCatalogConfig) -> Self {
        Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_endpoint: config.token_endpoint.clone(),
            validate_endpoint: config.validate_endpoint.clone(),
        }
    }
}

#[async_trait::async_trait]
impl OAuthTokenProvider for ClipCatalogOAuthProvider {
    async fn acquire(&self) -> AuthResult<(String, Option<Duration>)> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::token_acquisition_error(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response.json().await?;
        Ok((body.access_token, body.expires_in.map(Duration::from_secs)))
    }

    async fn validate(&self, token: &str) -> AuthResult<bool> {
        let response = self
            .http
            .get(&self.validate_endpoint)
            .header("Authorization", format!("OAuth {token}"))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
