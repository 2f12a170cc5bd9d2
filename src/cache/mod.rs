//! Rendered-page cache and revalidation targets.
//!
//! Pages are cached by request path. Revalidation maps a document
//! discriminator to the paths whose output depends on it.

use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A cached page body with its entity tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub body: Arc<str>,
    pub etag: String,
}

impl CachedPage {
    pub fn new(body: String) -> Self {
        let etag = format!("\"{:x}\"", Sha256::digest(body.as_bytes()));
        Self {
            body: Arc::from(body),
            etag,
        }
    }
}

/// Path set invalidated by one revalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheTarget {
    Path(&'static str),
    Prefix(&'static str),
    Everything,
}

/// Cache targets for a document discriminator.
pub fn targets_for(doc_type: &str) -> Vec<CacheTarget> {
    use CacheTarget::*;
    match doc_type {
        "user" => vec![Path("/")],
        "about" => vec![Path("/"), Path("/about")],
        "pageMeta" => vec![Path("/"), Prefix("/pages/")],
        "projectMeta" => vec![Path("/"), Path("/projects"), Prefix("/projects/")],
        "icon" | "logo" | "asset" => vec![Everything],
        _ => vec![Path("/")],
    }
}

#[derive(Clone)]
pub struct RenderCache {
    pages: Cache<String, CachedPage>,
}

impl RenderCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let pages = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        Self { pages }
    }

    pub async fn get(&self, path: &str) -> Option<CachedPage> {
        let hit = self.pages.get(path).await;
        debug!(path = %path, hit = hit.is_some(), "render cache lookup");
        hit
    }

    pub async fn insert(&self, path: &str, body: String) -> CachedPage {
        let page = CachedPage::new(body);
        self.pages.insert(path.to_string(), page.clone()).await;
        page
    }

    /// Invalidate one target. Idempotent: invalidating an absent path is a no-op.
    pub async fn invalidate(&self, target: &CacheTarget) {
        match target {
            CacheTarget::Path(path) => self.pages.invalidate(*path).await,
            CacheTarget::Prefix(prefix) => {
                let prefix = prefix.to_string();
                if let Err(e) = self
                    .pages
                    .invalidate_entries_if(move |path, _| path.starts_with(prefix.as_str()))
                {
                    tracing::warn!(error = %e, "prefix invalidation unavailable, clearing cache");
                    self.pages.invalidate_all();
                }
            }
            CacheTarget::Everything => self.pages.invalidate_all(),
        }
    }

    /// Invalidate everything that depends on documents of `doc_type`.
    pub async fn revalidate(&self, doc_type: &str) -> Vec<CacheTarget> {
        let targets = targets_for(doc_type);
        for target in &targets {
            self.invalidate(target).await;
        }
        // Settle pending invalidations so the next lookup observes them.
        self.pages.run_pending_tasks().await;
        targets
    }
}
