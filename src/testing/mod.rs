//! In-memory CMS double and state builders for unit tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cms::{CmsClient, CmsError, GroqQuery, Mutation, MutationOutcome, MutationResult};
use crate::config::AppConfig;
use crate::content::DirectSource;
use crate::state::AppState;

pub const TEST_SECRET: &str = "unit-test-secret";

/// Development config with the required variables filled in, plus `vars`.
pub fn config(vars: &[(&str, &str)]) -> AppConfig {
    let mut env: HashMap<String, String> = HashMap::new();
    env.insert("SANITY_PROJECT_ID".to_string(), "test-project".to_string());
    env.insert("SESSION_SECRET".to_string(), TEST_SECRET.to_string());
    for (key, value) in vars {
        env.insert(key.to_string(), value.to_string());
    }
    AppConfig::from_lookup(|key| env.get(key).cloned()).expect("test config")
}

/// State over a direct source backed by `cms`. The mock is returned for
/// call inspection.
pub fn state(cms: MockCms, vars: &[(&str, &str)]) -> (AppState, Arc<MockCms>) {
    let cms = Arc::new(cms);
    let client: Arc<dyn CmsClient> = cms.clone();
    let state = AppState::new(config(vars), Arc::new(DirectSource::new(client)));
    (state, cms)
}

type Responder = Box<dyn Fn(&GroqQuery) -> Result<Value, CmsError> + Send + Sync>;

/// Answers queries from canned responses keyed by a fragment of the query text.
/// Unmatched queries return `null`. Every query and mutation is recorded.
pub struct MockCms {
    canned: Vec<(String, Value)>,
    responder: Option<Responder>,
    failing: bool,
    reject_ids: Vec<String>,
    queries: Mutex<Vec<GroqQuery>>,
    mutations: Mutex<Vec<Vec<Mutation>>>,
}

impl MockCms {
    pub fn new() -> Self {
        Self {
            canned: Vec::new(),
            responder: None,
            failing: false,
            reject_ids: Vec::new(),
            queries: Mutex::new(Vec::new()),
            mutations: Mutex::new(Vec::new()),
        }
    }

    /// Every query fails as if the CMS were unreachable.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub fn respond(mut self, fragment: &str, value: Value) -> Self {
        self.canned.push((fragment.to_string(), value));
        self
    }

    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: Fn(&GroqQuery) -> Result<Value, CmsError> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Reject any transaction that touches `id`.
    pub fn reject_mutations_for(mut self, id: &str) -> Self {
        self.reject_ids.push(id.to_string());
        self
    }

    pub fn queries(&self) -> Vec<GroqQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn transactions(&self) -> Vec<Vec<Mutation>> {
        self.mutations.lock().unwrap().clone()
    }
}

impl Default for MockCms {
    fn default() -> Self {
        Self::new()
    }
}

fn mutation_id(mutation: &Mutation) -> Option<&str> {
    match mutation {
        Mutation::Create(doc) => doc.get("_id").and_then(Value::as_str),
        Mutation::Delete { id } => Some(id),
    }
}

#[async_trait]
impl CmsClient for MockCms {
    async fn fetch(&self, query: &GroqQuery) -> Result<Value, CmsError> {
        self.queries.lock().unwrap().push(query.clone());

        if self.failing {
            return Err(CmsError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        if let Some(responder) = &self.responder {
            return responder(query);
        }
        Ok(self
            .canned
            .iter()
            .find(|(fragment, _)| query.query.contains(fragment.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Null))
    }

    async fn mutate(&self, mutations: &[Mutation]) -> Result<MutationOutcome, CmsError> {
        if let Some(id) = mutations
            .iter()
            .filter_map(mutation_id)
            .find(|id| self.reject_ids.iter().any(|r| r == id))
        {
            return Err(CmsError::Mutation(format!("document {} is locked", id)));
        }

        self.mutations.lock().unwrap().push(mutations.to_vec());
        Ok(MutationOutcome {
            transaction_id: format!("tx-{}", self.mutations.lock().unwrap().len()),
            results: mutations
                .iter()
                .filter_map(mutation_id)
                .map(|id| MutationResult { id: id.to_string() })
                .collect(),
        })
    }
}
