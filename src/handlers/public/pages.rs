// handlers/public/pages.rs - server-rendered HTML pages
//
// Rendered output is cached per path; revalidation drops the affected paths.
// Not-found documents render the 404 page, upstream failures the generic 500
// page. Neither is cached, and neither is a home page rendered from a
// failed fetch.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::content::{or_empty, ContentError, ContentRequest};
use crate::middleware::HtmlPage;
use crate::render::{page, RenderContext, SectionRegistry};
use crate::state::AppState;

type DocumentRenderer = fn(&Value, &SectionRegistry, &RenderContext) -> Option<String>;

/// GET /
pub async fn home_page(State(state): State<AppState>, headers: HeaderMap) -> HtmlPage {
    if let Some(cached) = state.cache.get("/").await {
        return HtmlPage::cached(cached, &headers);
    }

    let ctx = state.render_context();
    let source = state.content.as_ref();
    let (user, about, projects) = futures::join!(
        source.fetch(&ContentRequest::User),
        source.fetch(&ContentRequest::About),
        source.fetch(&ContentRequest::Projects),
    );
    let complete = user.is_ok() && about.is_ok() && projects.is_ok();
    let user = or_empty(&ContentRequest::User, user);
    let about = or_empty(&ContentRequest::About, about);
    let projects = or_empty(&ContentRequest::Projects, projects);

    let body = page::home(&user, &about, &projects, &state.registry, &ctx);
    if !complete {
        warn!("serving uncached home page after a failed fetch");
        return HtmlPage::uncached(body);
    }
    HtmlPage::cached(state.cache.insert("/", body).await, &headers)
}

/// GET /about
pub async fn about_page(State(state): State<AppState>, headers: HeaderMap) -> HtmlPage {
    document_page(&state, &headers, "/about".to_string(), ContentRequest::About, page::about).await
}

/// GET /projects
pub async fn project_index_page(State(state): State<AppState>, headers: HeaderMap) -> HtmlPage {
    if let Some(cached) = state.cache.get("/projects").await {
        return HtmlPage::cached(cached, &headers);
    }

    let ctx = state.render_context();
    let projects = match state.content.fetch(&ContentRequest::Projects).await {
        Ok(projects) => projects.unwrap_or_else(|| json!([])),
        Err(e) => {
            error!(error = %e, "project index fetch failed");
            return HtmlPage::server_error(page::server_error(&ctx));
        }
    };

    let body = page::project_index(&projects, &ctx);
    HtmlPage::cached(state.cache.insert("/projects", body).await, &headers)
}

/// GET /projects/:slug
pub async fn project_page(State(state): State<AppState>, Path(slug): Path<String>, headers: HeaderMap) -> HtmlPage {
    let path = format!("/projects/{}", slug);
    document_page(&state, &headers, path, ContentRequest::Project { slug }, page::project).await
}

/// GET /pages/:slug
pub async fn content_page(State(state): State<AppState>, Path(slug): Path<String>, headers: HeaderMap) -> HtmlPage {
    let path = format!("/pages/{}", slug);
    document_page(&state, &headers, path, ContentRequest::Page { slug }, page::content_page).await
}

async fn document_page(
    state: &AppState,
    headers: &HeaderMap,
    path: String,
    request: ContentRequest,
    render: DocumentRenderer,
) -> HtmlPage {
    if let Some(cached) = state.cache.get(&path).await {
        return HtmlPage::cached(cached, headers);
    }

    let ctx = state.render_context();
    let document = match state.content.fetch(&request).await {
        Ok(Some(document)) => document,
        Ok(None) | Err(ContentError::InvalidRequest(_)) => {
            warn!(path = %path, request = %request, "page content not found");
            return HtmlPage::not_found(page::not_found(&ctx));
        }
        Err(e) => {
            error!(path = %path, error = %e, "page content fetch failed");
            return HtmlPage::server_error(page::server_error(&ctx));
        }
    };

    match render(&document, &state.registry, &ctx) {
        Some(body) => HtmlPage::cached(state.cache.insert(&path, body).await, headers),
        None => {
            error!(path = %path, "document did not match the expected shape");
            HtmlPage::server_error(page::server_error(&ctx))
        }
    }
}

/// Unmatched routes: JSON under /api, the 404 page elsewhere.
pub async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    if uri.path() == "/api" || uri.path().starts_with("/api/") {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": format!("No route for {}", uri.path()) }))).into_response();
    }
    HtmlPage::not_found(page::not_found(&state.render_context())).into_response()
}
