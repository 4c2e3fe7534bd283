//! GithubDispatcher -- concrete [`WorkflowDispatcher`] for the GitHub Actions
//! `workflow_dispatch` API.
//!
//! Sends `POST {api_base}/repos/{owner}/{repo}/actions/workflows/{workflow}/dispatches`
//! with `{ref, inputs}`. GitHub answers `204 No Content` on success; anything
//! else is surfaced as [`DispatchError::Rejected`] with a truncated copy of
//! the response body. No retries.
//!
//! The token is wrapped in [`secrecy::SecretString`] and is only exposed when
//! building the `Authorization` header.

use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use automater_core::dispatch::{truncate_body, DispatchRequest, WorkflowDispatcher};
use automater_types::config::DispatchConfig;
use automater_types::error::DispatchError;

pub struct GithubDispatcher {
    client: reqwest::Client,
    token: SecretString,
    api_base: String,
    api_version: String,
}

impl GithubDispatcher {
    pub fn new(token: SecretString, timeout: Duration) -> anyhow::Result<Self> {
        // No idle pooling: requests share only the client handle.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            token,
            api_base: "https://api.github.com".to_string(),
            api_version: "2022-11-28".to_string(),
        })
    }

    /// Build from configuration. `Ok(None)` when no credential token is set.
    pub fn from_config(config: &DispatchConfig) -> anyhow::Result<Option<Self>> {
        let Some(token) = &config.token else {
            return Ok(None);
        };
        let dispatcher = Self::new(
            SecretString::from(token.expose().to_string()),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_base_url(config.api_base.clone())
        .with_api_version(config.api_version.clone());
        Ok(Some(dispatcher))
    }

    /// Override the base URL (tests, GitHub Enterprise).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.api_base = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, api_version: String) -> Self {
        self.api_version = api_version;
        self
    }

    fn url(&self, request: &DispatchRequest) -> String {
        let target = request.target();
        format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base, target.owner, target.repo, target.workflow
        )
    }
}

impl WorkflowDispatcher for GithubDispatcher {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        let url = self.url(request);
        let user_agent = format!("automater-{}-trigger", request.target().repo);

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", &self.api_version)
            .header("User-Agent", user_agent)
            .bearer_auth(self.token.expose_secret())
            .json(&request.body())
            .send()
            .await
            .map_err(|e| DispatchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "workflow dispatch rejected");
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            body: truncate_body(&body),
        })
    }
}
