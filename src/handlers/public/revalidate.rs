// handlers/public/revalidate.rs - POST /api/revalidate
//
// Called by the CMS webhook after a publish. Body `{ "_type": "<discriminator>" }`.
// Invalidation is best-effort and idempotent; repeating a call is harmless.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::state::AppState;

pub const SECRET_HEADER: &str = "x-revalidate-secret";

#[derive(Debug, Default, Deserialize)]
pub struct RevalidateQuery {
    pub secret: Option<String>,
}

fn provided_secret<'a>(query: &'a RevalidateQuery, headers: &'a HeaderMap) -> Option<&'a str> {
    query
        .secret
        .as_deref()
        .or_else(|| headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok()))
}

/// Discriminator carried by a webhook body.
pub fn document_type(body: &[u8]) -> Result<String, String> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {}", e))?;
    payload
        .get("_type")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| "missing _type".to_string())
}

pub async fn revalidate(
    State(state): State<AppState>,
    Query(query): Query<RevalidateQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(expected) = state.config.security.revalidate_secret.as_deref() {
        if provided_secret(&query, &headers) != Some(expected) {
            warn!("revalidation rejected: invalid secret");
            return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid secret" }))).into_response();
        }
    }

    let doc_type = match document_type(&body) {
        Ok(doc_type) => doc_type,
        Err(detail) => {
            error!(error = %detail, "revalidation failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Error revalidating", "error": detail })),
            )
                .into_response();
        }
    };

    let targets = state.cache.revalidate(&doc_type).await;
    info!(doc_type = %doc_type, targets = ?targets, "revalidated");

    Json(json!({
        "revalidated": true,
        "now": chrono::Utc::now().timestamp_millis(),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, MockCms};
    use axum::http::HeaderValue;

    async fn call(state: AppState, query: RevalidateQuery, headers: HeaderMap, body: &'static str) -> (StatusCode, Value) {
        let response = revalidate(State(state), Query(query), headers, Bytes::from_static(body.as_bytes())).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn document_type_requires_a_string() {
        assert_eq!(document_type(br#"{"_type":"projectMeta"}"#).unwrap(), "projectMeta");
        assert!(document_type(br#"{"_type":""}"#).is_err());
        assert!(document_type(br#"{"_id":"x"}"#).is_err());
        assert!(document_type(b"not json").is_err());
    }

    #[tokio::test]
    async fn revalidates_and_reports_timestamp() {
        let (state, _) = testing::state(MockCms::new(), &[]);
        state.cache.insert("/projects", "cached".to_string()).await;

        let (status, body) = call(state.clone(), RevalidateQuery::default(), HeaderMap::new(), r#"{"_type":"projectMeta"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["revalidated"], true);
        assert!(body["now"].as_i64().unwrap() > 0);
        assert!(state.cache.get("/projects").await.is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_500_with_detail() {
        let (state, _) = testing::state(MockCms::new(), &[]);
        let (status, body) = call(state, RevalidateQuery::default(), HeaderMap::new(), "{}").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error revalidating");
        assert_eq!(body["error"], "missing _type");
    }

    #[tokio::test]
    async fn configured_secret_is_enforced() {
        let (state, _) = testing::state(MockCms::new(), &[("REVALIDATE_SECRET", "hook")]);

        let (status, body) = call(state.clone(), RevalidateQuery::default(), HeaderMap::new(), r#"{"_type":"about"}"#).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "Invalid secret" }));

        let query = RevalidateQuery { secret: Some("hook".to_string()) };
        let (status, _) = call(state.clone(), query, HeaderMap::new(), r#"{"_type":"about"}"#).await;
        assert_eq!(status, StatusCode::OK);

        let mut headers = HeaderMap::new();
        headers.insert(SECRET_HEADER, HeaderValue::from_static("hook"));
        let (status, _) = call(state, RevalidateQuery::default(), headers, r#"{"_type":"about"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }
}
