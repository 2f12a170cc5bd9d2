use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{ContentError, ContentRequest, ContentSource};

/// Content fetched through a running server's JSON read endpoints.
#[derive(Clone)]
pub struct ProxySource {
    http: reqwest::Client,
    base: Url,
}

impl ProxySource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ContentError> {
        let base = Url::parse(base_url)
            .map_err(|e| ContentError::InvalidRequest(format!("invalid base url {}: {}", base_url, e)))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn url_for(&self, request: &ContentRequest) -> Result<Url, ContentError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ContentError::InvalidRequest("base url cannot carry a path".to_string()))?;
            segments.clear().push("api");
            match request {
                ContentRequest::User => {
                    segments.push("user");
                }
                ContentRequest::About => {
                    segments.push("about");
                }
                ContentRequest::Asset { .. } => {
                    segments.push("asset");
                }
                ContentRequest::Page { slug } => {
                    segments.extend(["pages", slug.as_str()]);
                }
                ContentRequest::Project { slug } => {
                    segments.extend(["projects", slug.as_str()]);
                }
                ContentRequest::Projects => {
                    segments.push("projects");
                }
                ContentRequest::Documents { .. } => {
                    segments.push("documents");
                }
            }
        }

        match request {
            ContentRequest::Asset { id } => {
                url.query_pairs_mut().append_pair("id", id);
            }
            ContentRequest::Documents { doc_type } => {
                url.query_pairs_mut().append_pair("type", doc_type);
            }
            _ => {}
        }
        Ok(url)
    }
}

#[async_trait]
impl ContentSource for ProxySource {
    async fn fetch(&self, request: &ContentRequest) -> Result<Option<Value>, ContentError> {
        request.validate()?;
        let url = self.url_for(request)?;

        let response = self.http.get(url.clone()).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND if request.is_collection() => Ok(Some(request.empty())),
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(ContentError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}
