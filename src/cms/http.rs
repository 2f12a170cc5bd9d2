use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{CmsClient, CmsError, GroqQuery, Mutation, MutationOutcome};
use crate::config::CmsConfig;

/// Sanity HTTP API client (`/data/query` and `/data/mutate`).
#[derive(Clone)]
pub struct SanityClient {
    http: reqwest::Client,
    base: String,
    write_base: String,
    dataset: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct QueryEnvelope {
    #[serde(default)]
    result: Value,
}

impl SanityClient {
    pub fn new(config: &CmsConfig, timeout: Duration) -> Result<Self, CmsError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portfolio-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(config, http))
    }

    pub fn with_http(config: &CmsConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base: format!("{}/v{}", config.host(), config.api_version),
            write_base: format!("{}/v{}", config.write_host(), config.api_version),
            dataset: config.dataset.clone(),
            token: config.token.clone(),
        }
    }

    fn query_url(&self, query: &GroqQuery) -> Result<url::Url, CmsError> {
        let raw = format!("{}/data/query/{}", self.base, self.dataset);
        url::Url::parse_with_params(&raw, query.url_pairs())
            .map_err(|e| CmsError::InvalidRequest(format!("bad query url {}: {}", raw, e)))
    }

    fn mutate_url(&self) -> String {
        format!("{}/data/mutate/{}?returnIds=true", self.write_base, self.dataset)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, CmsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CmsError::Status {
            status: status.as_u16(),
            body: body.chars().take(512).collect(),
        })
    }
}

#[async_trait]
impl CmsClient for SanityClient {
    async fn fetch(&self, query: &GroqQuery) -> Result<Value, CmsError> {
        let url = self.query_url(query)?;
        let started = Instant::now();

        let response = self.authorize(self.http.get(url)).send().await?;
        let response = Self::error_for_status(response).await?;
        let envelope: QueryEnvelope = response
            .json()
            .await
            .map_err(|e| CmsError::Decode(e.to_string()))?;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            params = query.params.len(),
            "cms query completed"
        );
        Ok(envelope.result)
    }

    async fn mutate(&self, mutations: &[Mutation]) -> Result<MutationOutcome, CmsError> {
        if self.token.is_none() {
            return Err(CmsError::InvalidRequest(
                "mutations require SANITY_API_TOKEN".to_string(),
            ));
        }

        let url = self.mutate_url();
        let response = self
            .authorize(self.http.post(url))
            .json(&json!({ "mutations": mutations }))
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::Mutation(body.chars().take(512).collect()));
        }
        let response = Self::error_for_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| CmsError::Decode(e.to_string()))
    }
}
