#![allow(dead_code)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use portfolio_api::auth::SessionVerifier;
use portfolio_api::{app, AppConfig, AppState};
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path_regex};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const SESSION_SECRET: &str = "integration-secret";

/// Matches CMS queries whose GROQ text contains a fragment.
pub struct QueryContains(pub String);

impl Match for QueryContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .any(|(name, value)| name == "query" && value.contains(self.0.as_str()))
    }
}

pub fn groq(fragment: &str) -> QueryContains {
    QueryContains(fragment.to_string())
}

/// The application served in-process on a free port, talking to a mock CMS.
pub struct TestServer {
    pub base_url: String,
    pub cms: MockServer,
    pub config: AppConfig,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(&[]).await
    }

    pub async fn start_with(vars: &[(&str, &str)]) -> Result<Self> {
        let cms = MockServer::start().await;

        // Anything not explicitly mocked is "no such document".
        Mock::given(method("GET"))
            .and(path_regex(r"/data/query/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null })))
            .with_priority(10)
            .mount(&cms)
            .await;

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut env: HashMap<String, String> = HashMap::new();
        env.insert("SANITY_PROJECT_ID".into(), "itest".into());
        env.insert("SANITY_API_HOST".into(), cms.uri());
        env.insert("SESSION_SECRET".into(), SESSION_SECRET.into());
        env.insert("BASE_URL".into(), base_url.clone());
        env.insert("PORT".into(), port.to_string());
        for (key, value) in vars {
            env.insert(key.to_string(), value.to_string());
        }
        let config = AppConfig::from_lookup(|key| env.get(key).cloned()).context("test config")?;

        let state = AppState::from_config(config.clone()).context("test state")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self { base_url, cms, config };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Client that reports redirects instead of following them.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("reqwest client")
    }

    /// Session token for `role`, signed like the auth provider would.
    pub fn session(&self, role: &str) -> String {
        SessionVerifier::new(&self.config.security)
            .issue("itest-user", Some("itest@example.dev".to_string()), role)
            .expect("sign session")
    }

    /// Answer CMS queries containing `fragment` with `result`.
    pub async fn respond(&self, fragment: &str, result: Value) {
        Mock::given(method("GET"))
            .and(groq(fragment))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
            .mount(&self.cms)
            .await;
    }

    /// Number of queries the CMS has received so far.
    pub async fn cms_queries(&self) -> usize {
        self.cms
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
