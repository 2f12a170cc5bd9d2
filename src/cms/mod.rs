//! Headless CMS access: parameterized GROQ queries and document mutations.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use http::SanityClient;

/// Errors from the CMS client
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("CMS request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("CMS responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("CMS response could not be decoded: {0}")]
    Decode(String),

    #[error("CMS mutation rejected: {0}")]
    Mutation(String),

    #[error("Invalid CMS request: {0}")]
    InvalidRequest(String),
}

/// A GROQ query and its named parameters (`$name` inside the query text).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroqQuery {
    pub query: String,
    pub params: Map<String, Value>,
}

impl GroqQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Map::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// URL query pairs in the shape the HTTP query API expects: the query text
    /// under `query`, each parameter JSON-encoded under `$name`.
    pub fn url_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.params.len() + 1);
        pairs.push(("query".to_string(), self.query.clone()));
        for (name, value) in &self.params {
            pairs.push((format!("${}", name), value.to_string()));
        }
        pairs
    }
}

/// Document mutation, serialized as `{ "create": {...} }` or `{ "delete": { "id": .. } }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    Create(Value),
    Delete { id: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub results: Vec<MutationResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MutationResult {
    pub id: String,
}

/// Query/mutate contract of the CMS. `Ok(Value::Null)` means "nothing matched".
#[async_trait]
pub trait CmsClient: Send + Sync {
    async fn fetch(&self, query: &GroqQuery) -> Result<Value, CmsError>;

    /// Apply mutations as a single transaction.
    async fn mutate(&self, mutations: &[Mutation]) -> Result<MutationOutcome, CmsError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_are_json_encoded_with_dollar_prefix() {
        let q = GroqQuery::new("*[slug.current == $slug][0]").param("slug", "my-project");
        let pairs = q.url_pairs();
        assert_eq!(pairs[0], ("query".to_string(), "*[slug.current == $slug][0]".to_string()));
        assert_eq!(pairs[1], ("$slug".to_string(), "\"my-project\"".to_string()));
    }

    #[test]
    fn mutations_serialize_in_wire_shape() {
        let create = serde_json::to_value(Mutation::Create(json!({ "_id": "a", "_type": "projectMeta" }))).unwrap();
        assert_eq!(create, json!({ "create": { "_id": "a", "_type": "projectMeta" } }));

        let delete = serde_json::to_value(Mutation::Delete { id: "a".to_string() }).unwrap();
        assert_eq!(delete, json!({ "delete": { "id": "a" } }));
    }
}
