use std::sync::Arc;
use std::time::Duration;

use crate::auth::SessionVerifier;
use crate::cache::RenderCache;
use crate::cms::{CmsClient, CmsError, SanityClient};
use crate::config::AppConfig;
use crate::content::{ContentSource, DirectSource};
use crate::external::{ExternalError, GitHubClient};
use crate::render::{RenderContext, SectionRegistry};

/// Shared, read-only request state. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub content: Arc<dyn ContentSource>,
    pub cache: RenderCache,
    pub registry: Arc<SectionRegistry>,
    pub sessions: Arc<SessionVerifier>,
    pub github: Option<Arc<GitHubClient>>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Cms(#[from] CmsError),

    #[error(transparent)]
    External(#[from] ExternalError),
}

impl AppState {
    /// Wire the state around an explicit content source.
    pub fn new(config: AppConfig, content: Arc<dyn ContentSource>) -> Self {
        let cache = RenderCache::new(
            config.render.cache_capacity,
            Duration::from_secs(config.render.cache_ttl_secs),
        );
        let sessions = SessionVerifier::new(&config.security);
        Self {
            config: Arc::new(config),
            content,
            cache,
            registry: Arc::new(SectionRegistry::builtin()),
            sessions: Arc::new(sessions),
            github: None,
        }
    }

    pub fn with_github(mut self, github: Option<GitHubClient>) -> Self {
        self.github = github.map(Arc::new);
        self
    }

    /// Production wiring: Sanity client, direct content source, optional GitHub.
    pub fn from_config(config: AppConfig) -> Result<Self, StateError> {
        let timeout = config.http_timeout();
        let cms: Arc<dyn CmsClient> = Arc::new(SanityClient::new(&config.cms, timeout)?);
        let github = GitHubClient::from_config(&config.external, timeout)?;
        Ok(Self::new(config, Arc::new(DirectSource::new(cms))).with_github(github))
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext::from_config(&self.config)
    }
}
