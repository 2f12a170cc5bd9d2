use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::ExternalConfig;

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid GitHub URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Public repository as shown on the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Lists a user's public repositories through the GitHub REST API.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    username: String,
    token: Option<String>,
}

impl GitHubClient {
    /// `None` when no GitHub account is configured.
    pub fn from_config(config: &ExternalConfig, timeout: Duration) -> Result<Option<Self>, ExternalError> {
        let Some(username) = config.github_username.clone() else {
            return Ok(None);
        };
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portfolio-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Some(Self {
            http,
            api_base: config.github_api.trim_end_matches('/').to_string(),
            username,
            token: config.github_token.clone(),
        }))
    }

    /// Most recently pushed public repositories, forks excluded.
    pub async fn repos(&self) -> Result<Vec<RepoSummary>, ExternalError> {
        let url = url::Url::parse_with_params(
            &format!("{}/users/{}/repos", self.api_base, self.username),
            &[("sort", "pushed"), ("per_page", "100")],
        )?;

        let mut request = self.http.get(url).header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalError::Status {
                status: status.as_u16(),
                body: body.chars().take(256).collect(),
            });
        }

        let repos: Vec<RepoSummary> = response.json().await?;
        debug!(username = %self.username, count = repos.len(), "github repositories fetched");
        Ok(repos.into_iter().filter(|r| !r.fork).collect())
    }
}
