// handlers/public/content.rs - JSON read endpoints under /api
//
// Every endpoint resolves through the state's `ContentSource`. Absence maps to
// 404 with a descriptive message; upstream failures are logged and answered
// with a generic 500.

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::content::{ContentError, ContentRequest};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentsQuery {
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
}

async fn load(state: &AppState, request: ContentRequest, not_found: String, failure: &str) -> ApiResult<Value> {
    match state.content.fetch(&request).await {
        Ok(Some(value)) => Ok(ApiResponse::success(value)),
        Ok(None) => {
            warn!(request = %request, "content not found");
            Err(ApiError::not_found(not_found))
        }
        Err(ContentError::InvalidRequest(message)) => Err(ApiError::bad_request(message)),
        Err(e) => Err(ApiError::upstream("content fetch failed", &e, failure)),
    }
}

/// GET /api/user
pub async fn user(State(state): State<AppState>) -> ApiResult<Value> {
    load(&state, ContentRequest::User, "User data not found".to_string(), "Error fetching user data").await
}

/// GET /api/about
pub async fn about(State(state): State<AppState>) -> ApiResult<Value> {
    load(&state, ContentRequest::About, "About data not found".to_string(), "Error fetching about data").await
}

/// GET /api/asset?id=
pub async fn asset(State(state): State<AppState>, Query(query): Query<AssetQuery>) -> ApiResult<Value> {
    let id = query
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing asset id"))?;

    let not_found = format!("Asset not found: {}", id);
    load(&state, ContentRequest::Asset { id }, not_found, "Error fetching asset").await
}

/// GET /api/pages/:slug
pub async fn page(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Value> {
    let not_found = format!("Page not found: {}", slug);
    load(&state, ContentRequest::Page { slug }, not_found, "Error fetching page").await
}

/// GET /api/projects/:slug
pub async fn project(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Value> {
    let not_found = format!("Project not found: {}", slug);
    load(&state, ContentRequest::Project { slug }, not_found, "Error fetching project").await
}

/// GET /api/projects
pub async fn projects(State(state): State<AppState>) -> ApiResult<Value> {
    load(&state, ContentRequest::Projects, "Projects not found".to_string(), "Error fetching projects").await
}

/// GET /api/documents?type=
pub async fn documents(State(state): State<AppState>, Query(query): Query<DocumentsQuery>) -> ApiResult<Value> {
    let doc_type = query
        .doc_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing document type"))?;

    let not_found = format!("No documents of type {}", doc_type);
    load(&state, ContentRequest::Documents { doc_type }, not_found, "Error fetching documents").await
}
