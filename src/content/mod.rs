//! Content data access.
//!
//! `ContentSource` is the single interface the HTTP handlers, the page renderer
//! and the CLI fetch through. `DirectSource` queries the CMS itself; `ProxySource`
//! goes through this server's JSON read endpoints, for callers running outside
//! the server process.
//!
//! Not-found is `Ok(None)` for single documents and `Ok(Some([]))` for lists.
//! Rendering code settles each fetch with [`or_empty`], which logs failures and
//! hands back a definite (possibly empty) value.

pub mod direct;
pub mod proxy;
pub mod queries;
pub mod resolve;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

use crate::cms::CmsError;

pub use direct::DirectSource;
pub use proxy::ProxySource;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Cms(#[from] CmsError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} responded with status {status}")]
    Status { status: u16, url: String },

    #[error("Invalid content request: {0}")]
    InvalidRequest(String),
}

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRequest {
    User,
    About,
    Asset { id: String },
    Page { slug: String },
    Project { slug: String },
    Projects,
    Documents { doc_type: String },
}

impl ContentRequest {
    /// List requests yield arrays; everything else a single document.
    pub fn is_collection(&self) -> bool {
        matches!(self, ContentRequest::Projects | ContentRequest::Documents { .. })
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        let (field, value) = match self {
            ContentRequest::Asset { id } => ("id", id),
            ContentRequest::Page { slug } | ContentRequest::Project { slug } => ("slug", slug),
            ContentRequest::Documents { doc_type } => ("type", doc_type),
            _ => return Ok(()),
        };
        if value.trim().is_empty() {
            return Err(ContentError::InvalidRequest(format!("{} must not be empty", field)));
        }
        Ok(())
    }

    /// The empty result for this request kind.
    pub fn empty(&self) -> Value {
        if self.is_collection() {
            Value::Array(Vec::new())
        } else {
            Value::Null
        }
    }
}

impl fmt::Display for ContentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRequest::User => write!(f, "user"),
            ContentRequest::About => write!(f, "about"),
            ContentRequest::Asset { id } => write!(f, "asset {}", id),
            ContentRequest::Page { slug } => write!(f, "page {}", slug),
            ContentRequest::Project { slug } => write!(f, "project {}", slug),
            ContentRequest::Projects => write!(f, "projects"),
            ContentRequest::Documents { doc_type } => write!(f, "documents of type {}", doc_type),
        }
    }
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, request: &ContentRequest) -> Result<Option<Value>, ContentError>;
}

/// The value to render for a settled fetch: failures and absence both become
/// the empty value.
pub fn or_empty(request: &ContentRequest, result: Result<Option<Value>, ContentError>) -> Value {
    match result {
        Ok(Some(value)) => value,
        Ok(None) => {
            warn!(request = %request, "content not found");
            request.empty()
        }
        Err(e) => {
            error!(request = %request, error = %e, "content fetch failed");
            request.empty()
        }
    }
}
