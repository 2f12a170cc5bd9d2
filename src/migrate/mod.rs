//! Discriminator migration.
//!
//! Rewrites every document of a legacy type under its new type. Each document
//! moves in its own CMS transaction (delete the old document, create the new
//! one with the same id and content), so a document is either fully migrated
//! or untouched. Failures are logged and reported, never rolled back; running
//! the migration again picks up whatever is still under a legacy type.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cms::{CmsClient, CmsError, Mutation};
use crate::content::queries;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Invalid type mapping '{0}': expected legacy=new")]
    InvalidMapping(String),

    #[error("Failed to list documents of type {doc_type}: {source}")]
    Query {
        doc_type: String,
        #[source]
        source: CmsError,
    },
}

/// `legacy=new` discriminator rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMapping {
    pub from: String,
    pub to: String,
}

impl TypeMapping {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl FromStr for TypeMapping {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once('=')
            .map(|(f, t)| (f.trim(), t.trim()))
            .filter(|(f, t)| !f.is_empty() && !t.is_empty() && f != t)
            .ok_or_else(|| MigrateError::InvalidMapping(s.to_string()))?;
        Ok(Self::new(from, to))
    }
}

impl fmt::Display for TypeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

pub fn default_mappings() -> Vec<TypeMapping> {
    vec![
        TypeMapping::new("project", "projectMeta"),
        TypeMapping::new("page", "pageMeta"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedDocument {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    pub dry_run: bool,
    /// Migrated ids, or with `dry_run` the ids that would be.
    pub migrated: Vec<String>,
    pub failed: Vec<FailedDocument>,
    /// Documents without a usable `_id`.
    pub skipped: usize,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The document as it will exist under the new type.
pub fn retyped(document: &Value, new_type: &str) -> Option<Value> {
    let mut document = document.as_object()?.clone();
    document.insert("_type".to_string(), Value::String(new_type.to_string()));
    document.remove("_rev");
    document.remove("_updatedAt");
    Some(Value::Object(document))
}

pub async fn run(client: &dyn CmsClient, mappings: &[TypeMapping], dry_run: bool) -> Result<MigrationReport, MigrateError> {
    let mut report = MigrationReport {
        dry_run,
        ..MigrationReport::default()
    };

    for mapping in mappings {
        let documents = client
            .fetch(&queries::documents(&mapping.from))
            .await
            .map_err(|source| MigrateError::Query {
                doc_type: mapping.from.clone(),
                source,
            })?;
        let documents = match documents {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        info!(mapping = %mapping, count = documents.len(), dry_run, "migrating documents");

        for document in &documents {
            let id = document.get("_id").and_then(Value::as_str).filter(|id| !id.is_empty());
            let (Some(id), Some(replacement)) = (id, retyped(document, &mapping.to)) else {
                warn!(mapping = %mapping, "skipping document without an id");
                report.skipped += 1;
                continue;
            };

            if dry_run {
                info!(id = %id, mapping = %mapping, "would migrate");
                report.migrated.push(id.to_string());
                continue;
            }

            let transaction = [Mutation::Delete { id: id.to_string() }, Mutation::Create(replacement)];
            match client.mutate(&transaction).await {
                Ok(outcome) => {
                    let touched: Vec<&str> = outcome.results.iter().map(|r| r.id.as_str()).collect();
                    info!(id = %id, mapping = %mapping, transaction = %outcome.transaction_id, touched = ?touched, "migrated");
                    report.migrated.push(id.to_string());
                }
                Err(e) => {
                    error!(id = %id, mapping = %mapping, error = %e, "migration failed");
                    report.failed.push(FailedDocument {
                        id: id.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCms;
    use serde_json::json;

    fn legacy_cms() -> MockCms {
        MockCms::new().respond_with(|query| {
            Ok(match query.params.get("type").and_then(Value::as_str) {
                Some("project") => json!([
                    { "_id": "p1", "_type": "project", "_rev": "r1", "title": "Tracer" },
                    { "_id": "p2", "_type": "project", "title": "Sampler" },
                    { "_type": "project", "title": "orphan" }
                ]),
                Some("page") => json!([{ "_id": "uses", "_type": "page" }]),
                _ => Value::Null,
            })
        })
    }

    #[test]
    fn mappings_parse_from_cli_form() {
        assert_eq!("project=projectMeta".parse::<TypeMapping>().unwrap(), TypeMapping::new("project", "projectMeta"));
        assert!("project".parse::<TypeMapping>().is_err());
        assert!("a=a".parse::<TypeMapping>().is_err());
        assert!("=b".parse::<TypeMapping>().is_err());
    }

    #[test]
    fn retyped_keeps_id_and_content() {
        let doc = json!({ "_id": "p1", "_type": "project", "_rev": "abc", "title": "Tracer" });
        let new = retyped(&doc, "projectMeta").unwrap();
        assert_eq!(new, json!({ "_id": "p1", "_type": "projectMeta", "title": "Tracer" }));
    }

    #[tokio::test]
    async fn each_document_is_its_own_transaction() {
        let cms = legacy_cms();
        let report = run(&cms, &default_mappings(), false).await.unwrap();

        assert_eq!(report.migrated, vec!["p1", "p2", "uses"]);
        assert_eq!(report.skipped, 1);
        assert!(report.is_clean());

        let transactions = cms.transactions();
        assert_eq!(transactions.len(), 3);
        assert_eq!(
            transactions[0],
            vec![
                Mutation::Delete { id: "p1".to_string() },
                Mutation::Create(json!({ "_id": "p1", "_type": "projectMeta", "title": "Tracer" })),
            ]
        );
    }

    #[tokio::test]
    async fn failures_are_reported_and_do_not_stop_the_run() {
        let cms = legacy_cms().reject_mutations_for("p1");
        let report = run(&cms, &default_mappings(), false).await.unwrap();

        assert_eq!(report.migrated, vec!["p2", "uses"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, "p1");
        assert_eq!(cms.transactions().len(), 2);
    }

    #[tokio::test]
    async fn dry_run_mutates_nothing() {
        let cms = legacy_cms();
        let report = run(&cms, &default_mappings(), true).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.migrated.len(), 3);
        assert!(cms.transactions().is_empty());
    }

    #[tokio::test]
    async fn listing_failure_aborts() {
        let cms = MockCms::failing();
        let err = run(&cms, &default_mappings(), false).await.unwrap_err();
        assert!(matches!(err, MigrateError::Query { ref doc_type, .. } if doc_type == "project"));
    }
}
