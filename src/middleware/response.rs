use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::cache::CachedPage;

/// JSON API response. The payload is the document itself, no envelope, so the
/// read endpoints return exactly what the CMS holds.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.data) {
            Ok(value) => (StatusCode::OK, Json(value)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response data");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to serialize response data" })),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

/// Rendered HTML page. Cached pages carry their entity tag and answer a
/// matching `If-None-Match` with 304.
#[derive(Debug)]
pub enum HtmlPage {
    Cached { page: CachedPage, not_modified: bool },
    Status { status: StatusCode, body: String },
}

impl HtmlPage {
    pub fn cached(page: CachedPage, request_headers: &HeaderMap) -> Self {
        let not_modified = etag_matches(request_headers, &page.etag);
        HtmlPage::Cached { page, not_modified }
    }

    /// A rendered page kept out of the render cache.
    pub fn uncached(body: String) -> Self {
        HtmlPage::Status {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn not_found(body: String) -> Self {
        HtmlPage::Status {
            status: StatusCode::NOT_FOUND,
            body,
        }
    }

    pub fn server_error(body: String) -> Self {
        HtmlPage::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body,
        }
    }
}

/// `If-None-Match` check, honouring lists and `*`.
pub fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|candidate| candidate.trim().trim_start_matches("W/"))
        .any(|candidate| candidate == "*" || candidate == etag)
}

impl IntoResponse for HtmlPage {
    fn into_response(self) -> Response {
        match self {
            HtmlPage::Cached { page, not_modified } => {
                let etag = match HeaderValue::from_str(&page.etag) {
                    Ok(v) => v,
                    Err(_) => return Html(page.body.to_string()).into_response(),
                };
                if not_modified {
                    return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
                }
                (
                    StatusCode::OK,
                    [
                        (header::ETAG, etag),
                        (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                    ],
                    Html(page.body.to_string()),
                )
                    .into_response()
            }
            HtmlPage::Status { status, body } => (status, Html(body)).into_response(),
        }
    }
}
