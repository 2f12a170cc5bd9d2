// handlers/public/login.rs - GET /login
//
// Sign-in page. Sessions are issued by the external auth provider; this page
// only carries the callback target through to it.

use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::render::page;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Only same-origin absolute paths are accepted as callbacks.
pub fn safe_callback<'a>(requested: Option<&'a str>, default: &'a str) -> &'a str {
    match requested {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => default,
    }
}

pub async fn login(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Html<String> {
    let default = state
        .config
        .security
        .protected_prefixes
        .first()
        .map(String::as_str)
        .unwrap_or("/");
    let callback = safe_callback(query.callback_url.as_deref(), default);
    Html(page::login(callback, &state.render_context()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, MockCms};

    #[test]
    fn callbacks_stay_on_site() {
        assert_eq!(safe_callback(Some("/studio/desk"), "/studio"), "/studio/desk");
        assert_eq!(safe_callback(Some("//evil.example"), "/studio"), "/studio");
        assert_eq!(safe_callback(Some("https://evil.example"), "/studio"), "/studio");
        assert_eq!(safe_callback(None, "/studio"), "/studio");
    }

    #[tokio::test]
    async fn login_page_carries_callback() {
        let (state, _) = testing::state(MockCms::new(), &[]);
        let query = LoginQuery { callback_url: Some("/studio/desk".to_string()) };
        let Html(body) = login(State(state), Query(query)).await;
        assert!(body.contains(r#"name="callbackUrl" value="/studio/desk""#));
    }
}
