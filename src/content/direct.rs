use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{queries, resolve, ContentError, ContentRequest, ContentSource};
use crate::cms::CmsClient;
use crate::sanitize::sanitize;

/// Content fetched straight from the CMS, sanitized, with leftover asset
/// references resolved.
#[derive(Clone)]
pub struct DirectSource {
    client: Arc<dyn CmsClient>,
}

impl DirectSource {
    pub fn new(client: Arc<dyn CmsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentSource for DirectSource {
    async fn fetch(&self, request: &ContentRequest) -> Result<Option<Value>, ContentError> {
        request.validate()?;

        let query = queries::for_request(request);
        let raw = self.client.fetch(&query).await?;

        let value = match raw {
            Value::Null if request.is_collection() => Value::Array(Vec::new()),
            Value::Null => {
                debug!(request = %request, "no matching document");
                return Ok(None);
            }
            other => sanitize(&other),
        };

        let resolved = resolve::resolve_assets(self.client.as_ref(), value).await;
        Ok(Some(resolved))
    }
}
