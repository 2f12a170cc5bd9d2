//! Follow-up resolution of asset references that the main query left raw.

use futures::future::join_all;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use super::queries;
use crate::cms::CmsClient;
use crate::model::unresolved_ref;
use crate::sanitize::sanitize;

/// Field names whose values are asset references.
pub const ASSET_FIELDS: &[&str] = &["icon", "logo", "thumbnail", "image", "avatar"];

/// Collect ids of unresolved asset references anywhere in `value`.
pub fn collect_asset_refs(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if ASSET_FIELDS.contains(&key.as_str()) {
                    if let Some(id) = unresolved_ref(child) {
                        out.insert(id.to_string());
                        continue;
                    }
                }
                collect_asset_refs(child, out);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_asset_refs(item, out)),
        _ => {}
    }
}

/// Replace resolved references in place. References with no entry are left
/// as-is so renderers can show a placeholder.
pub fn substitute(value: &mut Value, resolved: &HashMap<String, Value>) {
    match value {
        Value::Object(map) => substitute_object(map, resolved),
        Value::Array(items) => items.iter_mut().for_each(|item| substitute(item, resolved)),
        _ => {}
    }
}

fn substitute_object(map: &mut Map<String, Value>, resolved: &HashMap<String, Value>) {
    for (key, child) in map.iter_mut() {
        if ASSET_FIELDS.contains(&key.as_str()) {
            let replacement = unresolved_ref(child).and_then(|id| resolved.get(id)).cloned();
            if let Some(asset) = replacement {
                *child = asset;
                continue;
            }
        }
        substitute(child, resolved);
    }
}

/// Resolve every leftover asset reference in `value` with concurrent lookups.
/// Lookup failures are logged and leave the reference unresolved.
pub async fn resolve_assets(client: &dyn CmsClient, mut value: Value) -> Value {
    let mut ids = BTreeSet::new();
    collect_asset_refs(&value, &mut ids);
    if ids.is_empty() {
        return value;
    }

    debug!(count = ids.len(), "resolving asset references");
    let lookups = ids.into_iter().map(|id| async move {
        let result = client.fetch(&queries::asset(&id)).await;
        (id, result)
    });

    let mut resolved = HashMap::new();
    for (id, result) in join_all(lookups).await {
        match result {
            Ok(Value::Null) => warn!(asset = %id, "referenced asset does not exist"),
            Ok(asset) => {
                resolved.insert(id, sanitize(&asset));
            }
            Err(e) => warn!(asset = %id, error = %e, "asset lookup failed"),
        }
    }

    substitute(&mut value, &resolved);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCms;
    use serde_json::json;

    fn project() -> Value {
        json!({
            "_id": "p1",
            "thumbnail": { "_id": "logo-main", "url": "https://cdn/x.png" },
            "related": [
                { "_id": "p2", "thumbnail": { "_ref": "logo-a", "_type": "reference" } },
                { "_id": "p3", "thumbnail": { "_ref": "logo-b", "_type": "reference" } },
                { "_id": "p4", "thumbnail": { "_ref": "logo-a", "_type": "reference" } }
            ]
        })
    }

    #[test]
    fn collects_only_unresolved_asset_refs() {
        let mut ids = BTreeSet::new();
        collect_asset_refs(&project(), &mut ids);
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["logo-a", "logo-b"]);
    }

    #[test]
    fn non_asset_references_are_ignored() {
        let mut ids = BTreeSet::new();
        collect_asset_refs(&json!({ "author": { "_ref": "person-1" } }), &mut ids);
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn resolves_each_distinct_reference_once() {
        let cms = MockCms::new()
            .respond_with(|q| match q.params.get("id").and_then(Value::as_str) {
                Some("logo-a") => Ok(json!({ "_id": "logo-a", "color": "#ff0000" })),
                _ => Ok(Value::Null),
            });
        let resolved = resolve_assets(&cms, project()).await;

        assert_eq!(resolved["related"][0]["thumbnail"]["color"], "#ff0000");
        assert_eq!(resolved["related"][2]["thumbnail"]["_id"], "logo-a");
        // logo-b does not exist: the raw reference stays for the renderer
        assert_eq!(resolved["related"][1]["thumbnail"]["_ref"], "logo-b");
        assert_eq!(cms.queries().len(), 2);
    }

    #[tokio::test]
    async fn lookup_failures_leave_references_in_place() {
        let cms = MockCms::failing();
        let resolved = resolve_assets(&cms, project()).await;
        assert_eq!(resolved["related"][0]["thumbnail"]["_ref"], "logo-a");
        assert_eq!(resolved["thumbnail"]["_id"], "logo-main");
    }
}
